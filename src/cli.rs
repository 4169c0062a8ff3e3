//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  page-chat --page https://example.com            Chat about a page interactively
  page-chat --page notes.html -p \"summarize\"      Single prompt, print rendered answer
  curl -s URL | page-chat --page - -p \"what is X\" Read the page from stdin
  page-chat --page URL -p - --out answer.html     Read prompt from stdin, save the view
  page-chat render answer.md                      Render markdown to HTML
  page-chat config                                Show config paths and status
  page-chat config set-api-key                    Store the Gemini API key (reads stdin)
  page-chat completions bash                      Generate bash completions

INTERACTIVE COMMANDS:
  /copy N      Copy the Nth code block of the transcript to the clipboard
  /save [FILE] Write the transcript view to FILE
  /open        Open the transcript view in the browser
  /help        Show commands
  /quit        Exit
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Chat about a web page with Gemini",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Page to chat about: an http(s) URL, a local file, or '-' for stdin
    #[arg(long, value_name = "URL|FILE|-")]
    pub page: Option<String>,

    /// Send a single prompt then exit
    #[arg(
        short = 'p',
        long,
        help = "Ask a single question and print the rendered answer (use '-' to read from stdin)"
    )]
    pub prompt: Option<String>,

    /// Override model
    #[arg(short = 'm', long, help = "Model ID (e.g. gemini-2.5-pro)")]
    pub model: Option<String>,

    /// Skip the background search query
    #[arg(long)]
    pub no_search: bool,

    /// Write the transcript view (HTML) to this file
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Open the transcript view in the default browser when done
    #[arg(long)]
    pub open: bool,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render markdown (from FILE or stdin) to HTML and print it
    Render {
        /// Markdown file; stdin when omitted or '-'
        file: Option<PathBuf>,
    },
    /// Show config paths, model, and API key status
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Store the Gemini API key in the config directory
    SetApiKey {
        /// The key; read from stdin when omitted
        key: Option<String>,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }

    /// The interactive loop owns stdin and stdout.
    pub fn is_interactive(&self) -> bool {
        self.command.is_none() && self.prompt.is_none()
    }
}
