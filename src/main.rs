//! # page-chat - chat about a web page with Gemini
//!
//! Reads the visible text of a page, optionally looks up background context on
//! DuckDuckGo, asks Gemini, and renders the answer as HTML in a chat transcript.
//!
//! ## Features
//! - Single prompt mode with `-p` or `--prompt`
//! - Interactive session with copyable code blocks and an HTML transcript view
//! - `render` subcommand for the markdown renderer alone
//! - Configuration and API key management

mod cli;
mod core;
mod run;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use cli::{Args, Commands, ConfigSubcommand};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    match &args.command {
        Some(Commands::Render { file }) => return run::run_render(file.as_deref()),
        Some(Commands::Config { subcommand }) => {
            match subcommand {
                Some(ConfigSubcommand::SetApiKey { key }) => {
                    core::cli::run_config_set_api_key(key.clone())
                }
                None => core::cli::run_config(),
            }
            return Ok(());
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Args::command();
            cli::generate(*shell, &mut cmd, core::app::NAME, &mut std::io::stdout());
            return Ok(());
        }
        None => {}
    }

    // Print user-friendly message; exit uses Display not Debug
    let config = core::config::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if args.prompt.is_some() {
        run::run_single_prompt(&args, &config).await
    } else {
        run::run_interactive(&args, &config).await
    }
}
