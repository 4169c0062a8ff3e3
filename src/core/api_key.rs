//! Credential store: a small key-value file in the config directory.
//!
//! The process environment takes precedence over the file, so `GEMINI_API_KEY=... page-chat`
//! works without touching disk. The file is written with restrictive permissions (0o600 on Unix).

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::core::paths;

/// Key under which the generation provider's credential is stored.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Read access to stored credentials. Read once per turn.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Errors when loading or storing credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("No config directory available")]
    NoConfigDir,
    #[error("Credentials file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Failed to store credential: {0}")]
    Io(#[from] io::Error),
}

/// Path to the credentials file in the config directory.
pub fn credentials_path() -> Option<PathBuf> {
    paths::config_dir().map(|d| d.join("credentials.json"))
}

/// File-backed store with environment override.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: Option<PathBuf>,
    use_env: bool,
}

impl FileCredentialStore {
    /// Store at the default location, honouring environment variables.
    pub fn from_default_location() -> Self {
        Self {
            path: credentials_path(),
            use_env: true,
        }
    }

    /// Store at an explicit path; the environment is ignored.
    #[cfg(test)]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            use_env: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let Some(path) = &self.path else {
            return Ok(BTreeMap::new());
        };
        match fs::read_to_string(path) {
            Ok(data) if data.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a value. Creates the config dir if needed; keeps other keys intact.
    pub fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let path = self.path.as_ref().ok_or(CredentialError::NoConfigDir)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.trim().to_string());
        let json = serde_json::to_string_pretty(&entries)?;

        let tmp = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;

        #[cfg(unix)]
        {
            let mut perms = file.metadata()?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&tmp, perms)?;
        }

        fs::rename(tmp, path)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        if self.use_env
            && let Ok(v) = std::env::var(key)
            && !v.trim().is_empty()
        {
            return Some(v.trim().to_string());
        }
        match self.read_all() {
            Ok(entries) => entries
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            Err(e) => {
                log::warn!("Could not read credentials: {}", e);
                None
            }
        }
    }
}
