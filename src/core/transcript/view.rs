//! Standalone HTML view of a transcript.
//!
//! Built from the transcript record only: each code block gets exactly the controls the
//! transcript holds for it, so the view never has to be inspected to find them.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use crate::core::app;
use crate::core::markdown::{MarkupPart, escape_html};

use super::{ChatMessage, MessageStatus, Transcript};

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; margin: 0; background: #f7f7f8; }
#chat-output { max-width: 760px; margin: 0 auto; padding: 16px; }
.message { padding: 10px 14px; margin: 8px 0; border-radius: 10px; line-height: 1.45; }
.message.user { background: #dbeafe; margin-left: 20%; }
.message.assistant { background: #fff; border: 1px solid #e5e7eb; margin-right: 10%; }
.message.pending { color: #6b7280; font-style: italic; }
.message time { display: block; font-size: 11px; color: #9ca3af; margin-bottom: 4px; }
pre { position: relative; background: #111827; color: #e5e7eb; padding: 12px; border-radius: 6px; overflow-x: auto; }
code { font-family: ui-monospace, monospace; }
.copy-button { position: absolute; top: 6px; right: 6px; font-size: 11px; }
";

const SCRIPT: &str = "\
document.querySelectorAll('.copy-button').forEach((button) => {
  button.addEventListener('click', () => {
    const code = button.parentElement.querySelector('code')?.textContent || '';
    navigator.clipboard.writeText(code).then(() => {
      button.textContent = 'Copied!';
      setTimeout(() => { button.textContent = 'Copy to clipboard'; }, 2000);
    }).catch(() => {});
  });
});
";

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);\n";

/// Render the whole transcript as an HTML document. Control labels reflect `now`.
pub fn render_view(transcript: &Transcript, now: Instant) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(app::NAME)));
    out.push_str(&format!("<style>\n{}</style>\n", STYLE));
    out.push_str("</head>\n<body>\n<div id=\"chat-output\">\n");
    for message in transcript.messages() {
        render_message(&mut out, message, now);
    }
    out.push_str("</div>\n<script>\n");
    out.push_str(SCRIPT);
    if transcript.follows_bottom() {
        out.push_str(SCROLL_SCRIPT);
    }
    out.push_str("</script>\n</body>\n</html>\n");
    out
}

fn render_message(out: &mut String, message: &ChatMessage, now: Instant) {
    let pending = if message.status == MessageStatus::Pending {
        " pending"
    } else {
        ""
    };
    out.push_str(&format!(
        "<div class=\"message {}{}\" id=\"msg-{}\">",
        message.role.as_str(),
        pending,
        message.handle().0
    ));
    out.push_str(&format!(
        "<time>{}</time>",
        message.created_at.format("%H:%M")
    ));
    let mut block_index = 0;
    for part in message.content.parts() {
        match part {
            MarkupPart::Html(html) => out.push_str(html),
            MarkupPart::CodeBlock(block) => {
                out.push_str("<pre>");
                out.push_str(&block.code_html());
                if let Some(control) = message.copy_controls().get(block_index) {
                    let label = control.label(now);
                    out.push_str(&format!(
                        "<button class=\"copy-button\" title=\"{label}\">{label}</button>"
                    ));
                }
                out.push_str("</pre>");
                block_index += 1;
            }
        }
    }
    out.push_str("</div>\n");
}

/// Write the view atomically (temp file + rename). Creates parent directories.
pub fn save_view(path: &Path, html: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, html)?;
    fs::rename(tmp, path)
}
