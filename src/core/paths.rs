//! Centralized path helpers for config and cache directories.

use std::path::PathBuf;

use crate::core::app;

/// Env var that replaces the platform config directory (useful for tests and portable setups).
pub const CONFIG_DIR_ENV: &str = "PAGE_CHAT_CONFIG_DIR";

/// Project directories (config, cache) from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/page-chat/), or `PAGE_CHAT_CONFIG_DIR` when set.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Cache directory (~/.cache/page-chat/). Holds the interactive-mode log file.
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.cache_dir().to_path_buf())
}

/// Default location for an exported transcript view.
pub fn default_view_path(session_id: &str) -> PathBuf {
    let dir = cache_dir().unwrap_or_else(std::env::temp_dir);
    dir.join(format!("transcript_{}.html", session_id))
}
