//! Application run modes: logger init, single prompt, render, interactive session.

use std::error::Error;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cli::Args;
use crate::core;
use crate::core::api_key::FileCredentialStore;
use crate::core::clipboard::SystemClipboard;
use crate::core::commands::{self, Command};
use crate::core::config::Config;
use crate::core::llm::GeminiGenerator;
use crate::core::page::{PageInput, PageLoader};
use crate::core::search::DuckDuckGo;
use crate::core::transcript::{COPIED_LABEL, Transcript, render_view, save_view};
use crate::core::turn::{TurnContext, TurnOutcome, run_turn};

/// Initialize env_logger. In interactive mode, writes to file to keep the terminal clean.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    if args.is_interactive() {
        let log_path = core::paths::cache_dir().and_then(|d| {
            std::fs::create_dir_all(&d).ok()?;
            Some(d.join(format!("{}.log", core::app::NAME)))
        });
        if let Some(path) = log_path
            && let Ok(file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
        {
            logger.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    let _ = logger.try_init();
}

/// Collaborators of one session, shared by all its turns.
struct Session {
    page: PageLoader,
    search: Option<DuckDuckGo>,
    generator: GeminiGenerator,
    credentials: FileCredentialStore,
    timeout: Duration,
}

impl Session {
    fn new(args: &Args, config: &Config, page: Option<PageInput>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let model = args.model.as_deref().unwrap_or(&config.model_id);
        Ok(Self {
            page: PageLoader::new(page, http.clone(), config.page_chars),
            search: (!args.no_search).then(|| DuckDuckGo::new(http, config.search_url.clone())),
            generator: GeminiGenerator::new(config.api_base.clone(), model),
            credentials: FileCredentialStore::from_default_location(),
            timeout: config.timeout,
        })
    }

    /// Run a turn; Ctrl-C cancels it instead of killing the process.
    async fn turn(&self, transcript: &mut Transcript, query: &str) -> Option<TurnOutcome> {
        let ctx = TurnContext {
            page: &self.page,
            search: &self.search,
            generator: &self.generator,
            credentials: &self.credentials,
            timeout: self.timeout,
        };
        let cancel = CancellationToken::new();
        let turn = run_turn(transcript, &ctx, query, &cancel);
        tokio::pin!(turn);

        let mut watch_interrupts = true;
        loop {
            tokio::select! {
                outcome = &mut turn => return outcome,
                signal = tokio::signal::ctrl_c(), if watch_interrupts => match signal {
                    Ok(()) => {
                        log::info!("turn cancelled by user");
                        cancel.cancel();
                    }
                    Err(e) => {
                        log::warn!("cannot listen for Ctrl-C: {}", e);
                        watch_interrupts = false;
                    }
                },
            }
        }
    }
}

/// Run single prompt mode: one turn, rendered answer to stdout.
pub async fn run_single_prompt(args: &Args, config: &Config) -> Result<(), Box<dyn Error>> {
    let prompt_arg = args.prompt.as_deref().unwrap_or_default();
    if prompt_arg == "-" && args.page.as_deref() == Some("-") {
        eprintln!("Error: --page - and -p - cannot both read stdin");
        std::process::exit(1);
    }
    let prompt = if prompt_arg == "-" {
        io::read_to_string(io::stdin())?
    } else {
        prompt_arg.to_string()
    };
    let prompt = prompt.trim();
    if prompt.is_empty() {
        eprintln!("Error: empty prompt");
        std::process::exit(1);
    }

    let page = page_input(args.page.as_deref())?;
    let session = Session::new(args, config, page)?;
    let mut transcript = Transcript::new();
    let Some(outcome) = session.turn(&mut transcript, prompt).await else {
        return Ok(());
    };

    if let Some(out) = &args.out {
        write_view(&transcript, out);
    }
    if args.open {
        open_view(&transcript, args.out.as_deref());
    }

    match outcome {
        TurnOutcome::Answered { handle } => {
            if let Some(reply) = transcript.get(handle) {
                println!("{}", reply.content);
            }
            Ok(())
        }
        TurnOutcome::Failed { error, .. } => {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
    }
}

/// Run the `render` command: markdown from a file or stdin, HTML to stdout.
pub fn run_render(file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let raw = match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    println!("{}", core::markdown::render(&raw));
    Ok(())
}

/// Interactive session: questions from stdin, transcript view kept up to date on disk.
pub async fn run_interactive(args: &Args, config: &Config) -> Result<(), Box<dyn Error>> {
    if args.page.as_deref() == Some("-") {
        eprintln!("Error: --page - needs stdin, which the interactive session reads questions from. Use it with -p.");
        std::process::exit(1);
    }
    let page = page_input(args.page.as_deref())?;
    if page.is_none() {
        eprintln!("Warning: no --page given; questions will fail until one is provided.");
    }
    let session = Session::new(args, config, page)?;
    let session_id = uuid::Uuid::new_v4().to_string();
    let view_path = args
        .out
        .clone()
        .unwrap_or_else(|| core::paths::default_view_path(&session_id));
    log::info!("session {} view at {}", session_id, view_path.display());

    let mut transcript = Transcript::new();
    let mut clipboard = SystemClipboard::new();
    let mut lines = stdin_lines();

    println!(
        "{} {} ({}). Ask about the page, or /help.",
        core::app::NAME,
        core::app::VERSION,
        session.generator.model()
    );

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = loop {
            let revert = transcript.next_revert();
            tokio::select! {
                line = lines.recv() => break line.transpose()?,
                _ = revert_due(revert) => {
                    if transcript.tick(Instant::now()) {
                        write_view(&transcript, &view_path);
                    }
                }
                _ = tokio::signal::ctrl_c() => break None,
            }
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match commands::parse(&line) {
            None => {
                if let Some(outcome) = session.turn(&mut transcript, &line).await {
                    print_reply(&transcript, &outcome);
                    write_view(&transcript, &view_path);
                }
            }
            Some(Err(e)) => eprintln!("{}", e),
            Some(Ok(Command::Quit)) => break,
            Some(Ok(Command::Help)) => println!("{}", commands::HELP),
            Some(Ok(Command::Copy(n))) => {
                copy_block(&mut transcript, &mut clipboard, n);
                write_view(&transcript, &view_path);
            }
            Some(Ok(Command::Save(path))) => {
                let path = path.unwrap_or_else(|| view_path.clone());
                if write_view(&transcript, &path) {
                    println!("Saved {}", path.display());
                }
            }
            Some(Ok(Command::Open)) => open_view(&transcript, Some(&view_path)),
        }
    }

    if !transcript.is_empty() {
        log::info!(
            "session {} ended with {} messages",
            session_id,
            transcript.len()
        );
        if args.open {
            open_view(&transcript, Some(&view_path));
        }
    }
    Ok(())
}

fn page_input(arg: Option<&str>) -> io::Result<Option<PageInput>> {
    match arg {
        None => Ok(None),
        Some("-") => Ok(Some(PageInput::Text(io::read_to_string(io::stdin())?))),
        Some(arg) => Ok(Some(PageInput::from_arg(arg))),
    }
}

/// Stdin lines from a plain thread, so a pending read never holds up shutdown.
fn stdin_lines() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in io::stdin().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn revert_due(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

fn print_reply(transcript: &Transcript, outcome: &TurnOutcome) {
    let handle = outcome.handle();
    let Some(reply) = transcript.get(handle) else {
        return;
    };
    println!("{}", reply.content);
    for (n, (block, code, _)) in transcript.code_blocks().enumerate() {
        if block.message == handle {
            println!("  [code {}: {}] /copy {}", n + 1, code.lang, n + 1);
        }
    }
}

fn copy_block(transcript: &mut Transcript, clipboard: &mut SystemClipboard, n: usize) {
    let Some(block) = transcript.nth_code_block(n) else {
        eprintln!(
            "No code block {} (the transcript has {})",
            n,
            transcript.code_blocks().count()
        );
        return;
    };
    match transcript.activate_copy(block, clipboard, Instant::now()) {
        Ok(true) => println!("{}", COPIED_LABEL),
        Ok(false) => eprintln!("Could not access the clipboard"),
        Err(e) => eprintln!("Error: {}", e),
    }
}

/// Regenerate the view and write it. Failures are reported, never fatal.
fn write_view(transcript: &Transcript, path: &Path) -> bool {
    match save_view(path, &render_view(transcript, Instant::now())) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Error writing {}: {}", path.display(), e);
            false
        }
    }
}

fn open_view(transcript: &Transcript, path: Option<&Path>) {
    let path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => core::paths::default_view_path(&uuid::Uuid::new_v4().to_string()),
    };
    if !write_view(transcript, &path) {
        return;
    }
    if let Err(e) = opener::open(&path) {
        eprintln!("Could not open {}: {}", path.display(), e);
    }
}
