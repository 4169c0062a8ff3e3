//! Copy control attached to a rendered code block.

use std::time::{Duration, Instant};

/// How long the "copied" acknowledgment stays before reverting.
pub const COPY_ACK_DELAY: Duration = Duration::from_millis(2000);

pub const IDLE_LABEL: &str = "Copy to clipboard";
pub const COPIED_LABEL: &str = "Copied!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    Idle,
    Copied { since: Instant },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyControl {
    state: CopyState,
}

impl Default for CopyControl {
    fn default() -> Self {
        Self::new()
    }
}

impl CopyControl {
    pub fn new() -> Self {
        Self {
            state: CopyState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> CopyState {
        self.state
    }

    /// Label as of `now`; an expired acknowledgment already reads as idle.
    pub fn label(&self, now: Instant) -> &'static str {
        match self.state {
            CopyState::Copied { since } if now.saturating_duration_since(since) < COPY_ACK_DELAY => {
                COPIED_LABEL
            }
            _ => IDLE_LABEL,
        }
    }

    pub(super) fn mark_copied(&mut self, now: Instant) {
        self.state = CopyState::Copied { since: now };
    }

    /// When the current acknowledgment expires, if one is showing.
    pub fn revert_at(&self) -> Option<Instant> {
        match self.state {
            CopyState::Copied { since } => Some(since + COPY_ACK_DELAY),
            CopyState::Idle => None,
        }
    }

    /// Revert to idle if the acknowledgment has expired. Returns true if it changed.
    pub(super) fn tick(&mut self, now: Instant) -> bool {
        match self.revert_at() {
            Some(at) if now >= at => {
                self.state = CopyState::Idle;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acknowledgment_reverts_after_delay() {
        let t0 = Instant::now();
        let mut control = CopyControl::new();
        assert_eq!(control.label(t0), IDLE_LABEL);

        control.mark_copied(t0);
        assert_eq!(control.label(t0 + Duration::from_millis(1999)), COPIED_LABEL);
        assert!(!control.tick(t0 + Duration::from_millis(1999)));

        assert_eq!(control.label(t0 + COPY_ACK_DELAY), IDLE_LABEL);
        assert!(control.tick(t0 + COPY_ACK_DELAY));
        assert_eq!(control.state(), CopyState::Idle);
        assert_eq!(control.revert_at(), None);
    }
}
