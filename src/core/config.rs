//! Runtime configuration from the environment (and `.env`, loaded by the binary).

use std::env;
use std::time::Duration;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
/// DuckDuckGo Instant Answer API.
pub const DEFAULT_SEARCH_URL: &str = "https://api.duckduckgo.com";
/// Page text prefix forwarded to the model, in characters.
pub const DEFAULT_PAGE_CHARS: usize = 2000;
/// Per-call timeout for page fetch, search and generation.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable overriding the model.
pub const MODEL_ENV: &str = "PAGE_CHAT_MODEL";

#[derive(Debug, Clone)]
pub struct Config {
    pub model_id: String,
    pub api_base: String,
    pub search_url: String,
    pub page_chars: usize,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            page_chars: DEFAULT_PAGE_CHARS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {value}")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Load configuration from the process environment.
pub fn load() -> Result<Config, ConfigError> {
    load_from(|key| env::var(key).ok())
}

/// Load configuration through an arbitrary lookup. Empty values count as unset.
pub fn load_from<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let defaults = Config::default();

    let model_id = get(MODEL_ENV).unwrap_or(defaults.model_id);
    let api_base = match get("GEMINI_BASE_URL") {
        Some(v) => validate_url("GEMINI_BASE_URL", v)?,
        None => defaults.api_base,
    };
    let search_url = match get("PAGE_CHAT_SEARCH_URL") {
        Some(v) => validate_url("PAGE_CHAT_SEARCH_URL", v)?,
        None => defaults.search_url,
    };
    let page_chars = match get("PAGE_CHAT_PAGE_CHARS") {
        Some(v) => parse_positive("PAGE_CHAT_PAGE_CHARS", v)? as usize,
        None => defaults.page_chars,
    };
    let timeout = match get("PAGE_CHAT_TIMEOUT_SECS") {
        Some(v) => Duration::from_secs(parse_positive("PAGE_CHAT_TIMEOUT_SECS", v)?),
        None => defaults.timeout,
    };

    Ok(Config {
        model_id,
        api_base,
        search_url,
        page_chars,
        timeout,
    })
}

fn validate_url(var: &'static str, value: String) -> Result<String, ConfigError> {
    match url::Url::parse(&value) {
        Ok(_) => Ok(value.trim_end_matches('/').to_string()),
        Err(_) => Err(ConfigError::InvalidUrl { var, value }),
    }
}

fn parse_positive(var: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { var, value }),
    }
}
