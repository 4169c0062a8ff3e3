//! CLI-only commands: config info and API key storage.
//!
//! These run without a page or a transcript and produce plain text output.

use std::env;
use std::io::{self, Read};

use crate::core::api_key::{self, CredentialStore, FileCredentialStore, GEMINI_API_KEY};
use crate::core::config::{self, DEFAULT_MODEL};
use crate::core::paths;

/// Run the `config` command: display paths, model, endpoints and API key status.
pub fn run_config() {
    let config_dir = paths::config_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "—".to_string());
    let cache_dir = paths::cache_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "—".to_string());

    let config = match config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let store = FileCredentialStore::from_default_location();
    let api_key_status = match (store.get(GEMINI_API_KEY), key_in_env()) {
        (Some(_), true) => "set ✓ (from GEMINI_API_KEY)",
        (Some(_), false) => "set ✓ (from credentials file)",
        (None, _) => "not set",
    };

    println!("Config:       {}", config_dir);
    println!("Cache:        {}", cache_dir);
    println!("Model:        {} ({})", config.model_id, model_source());
    println!("API base:     {}", config.api_base);
    println!("Search:       {}", config.search_url);
    println!("Page chars:   {}", config.page_chars);
    println!("Timeout:      {}s", config.timeout.as_secs());
    println!("API key:      {}", api_key_status);
    println!(
        "Credentials:  {}",
        store
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "—".to_string())
    );
}

/// Run the `config set-api-key` command: store the API key in the config directory.
pub fn run_config_set_api_key(api_key: Option<String>) {
    let key = match api_key {
        Some(k) if !k.trim().is_empty() => k.trim().to_string(),
        _ => {
            let mut buf = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buf) {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
            let trimmed = buf.trim().to_string();
            if trimmed.is_empty() {
                eprintln!("Error: no API key provided");
                std::process::exit(1);
            }
            trimmed
        }
    };

    let store = FileCredentialStore::from_default_location();
    match store.set(GEMINI_API_KEY, &key) {
        Ok(()) => {
            let path = api_key::credentials_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "config directory".to_string());
            println!("API key saved to {}", path);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn key_in_env() -> bool {
    env::var(GEMINI_API_KEY)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .is_some()
}

fn model_source() -> &'static str {
    match env::var(config::MODEL_ENV) {
        Ok(id) if !id.trim().is_empty() && id.trim() != DEFAULT_MODEL => "from PAGE_CHAT_MODEL",
        _ => "default",
    }
}
