//! Errors that end a turn. All of them become a failed transcript entry.

/// Why a turn could not produce an answer.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(
        "No Gemini API key found. Run `page-chat config set-api-key` or set GEMINI_API_KEY."
    )]
    MissingCredential,
    #[error("Could not read the page: {0}")]
    Extraction(String),
    /// Search or generation provider errored or returned unusable data.
    #[error("{0}")]
    Upstream(String),
    #[error("Request timed out after {0}s")]
    TimedOut(u64),
    #[error("Request cancelled")]
    Cancelled,
}

impl TurnError {
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }
}
