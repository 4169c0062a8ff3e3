//! Slash commands of the interactive session.

use std::path::PathBuf;

/// Help text printed by `/help`.
pub const HELP: &str = "\
/copy N      Copy the Nth code block to the clipboard
/save [FILE] Write the transcript view to FILE (default: the session view file)
/open        Open the transcript view in the browser
/help        Show this help
/quit        Exit (also /exit, Ctrl-D)
Anything else is sent as a question about the page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 1-based index over all code blocks of the transcript.
    Copy(usize),
    Save(Option<PathBuf>),
    Open,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command /{0}. Type /help for the list.")]
    Unknown(String),
    #[error("Usage: /copy N (N starts at 1)")]
    CopyUsage,
}

/// Parse a slash command. Returns `None` when the line is a question.
pub fn parse(line: &str) -> Option<Result<Command, CommandError>> {
    let rest = line.trim().strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let cmd = match name.to_ascii_lowercase().as_str() {
        "copy" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Command::Copy(n)),
            _ => Err(CommandError::CopyUsage),
        },
        "save" => Ok(Command::Save(
            (!arg.is_empty()).then(|| PathBuf::from(arg)),
        )),
        "open" => Ok(Command::Open),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    };
    Some(cmd)
}
