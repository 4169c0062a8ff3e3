//! Integration tests that run the CLI binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn bin(config_dir: &std::path::Path) -> Command {
    // CARGO_BIN_EXE_<name> uses the binary target name; hyphens require concat! for env!()
    let bin = env!(concat!("CARGO_BIN_EXE_page", "-", "chat"));
    let mut cmd = Command::new(bin);
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG")
        .env("PAGE_CHAT_CONFIG_DIR", config_dir)
        // Run from the temp dir so dotenv() won't load .env from project root
        .current_dir(config_dir);
    cmd
}

fn run_with_stdin(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary not found - run cargo build first");
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for binary")
}

#[test]
fn cli_help_succeeds_and_outputs_usage() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path())
        .arg("--help")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--page"), "expected usage text in output");
    assert!(stdout.contains("/copy N"));
}

#[test]
fn cli_version_succeeds() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path())
        .arg("--version")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("page-chat"));
}

#[test]
fn cli_render_reads_stdin() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let mut cmd = bin(tmp.path());
    cmd.arg("render");
    let output = run_with_stdin(cmd, "**a** and `<b>`\n```js\nif (a < b) {}\n```");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<strong>a</strong> and <code>&lt;b&gt;</code><br>"));
    assert!(stdout.contains(
        "<pre><code class=\"language-js\">if (a &lt; b) {}\n</code></pre>"
    ));
}

#[test]
fn cli_prompt_without_api_key_exits_with_error() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let mut cmd = bin(tmp.path());
    cmd.args(["--page", "-", "-p", "what is this?", "--no-search"]);
    let output = run_with_stdin(cmd, "<html><body><p>Hello</p></body></html>");

    assert!(
        !output.status.success(),
        "expected failure when no API key is configured"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("No Gemini API key found"),
        "expected API key error message, got: {}",
        stderr
    );
}

#[test]
fn cli_failed_prompt_still_writes_view() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let out = tmp.path().join("view.html");
    let mut cmd = bin(tmp.path());
    cmd.args(["--page", "-", "-p", "hi", "--no-search", "--out"])
        .arg(&out);
    let output = run_with_stdin(cmd, "plain page");

    assert!(!output.status.success());
    let html = std::fs::read_to_string(&out).expect("view written");
    assert!(html.contains("<div class=\"message user\""));
    assert!(html.contains("⚠️ Error: No Gemini API key found"));
}

#[test]
fn cli_config_set_api_key_is_reported() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path())
        .args(["config", "set-api-key", "test-key"])
        .output()
        .expect("binary not found - run cargo build first");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(tmp.path().join("credentials.json").exists());

    let output = bin(tmp.path())
        .arg("config")
        .output()
        .expect("binary not found - run cargo build first");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("set ✓ (from credentials file)"),
        "got: {}",
        stdout
    );
}

#[test]
fn cli_completions_bash() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path())
        .args(["completions", "bash"])
        .output()
        .expect("binary not found - run cargo build first");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("page-chat"));
}
