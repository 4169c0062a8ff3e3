//! System clipboard access behind a small trait so copy controls can be tested.

/// Write-only clipboard.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, thiserror::Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(String);

impl ClipboardError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<arboard::Error> for ClipboardError {
    fn from(e: arboard::Error) -> Self {
        Self(e.to_string())
    }
}

/// The OS clipboard. Opened on first use and kept for the session, since some
/// platforms drop the contents when the owning handle goes away.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let clipboard = match &mut self.inner {
            Some(c) => c,
            None => self.inner.insert(arboard::Clipboard::new()?),
        };
        clipboard.set_text(text.to_string())?;
        Ok(())
    }
}
