//! The chat transcript: ordered messages, in-place replacement of pending replies,
//! and the copy controls attached to code blocks.
//!
//! Messages are addressed by [`MessageHandle`], never by position. Each message records
//! its own code blocks and their controls, so attaching is bookkeeping on this struct
//! rather than a scan of rendered output.

mod copy;
mod view;

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Local};

use crate::core::clipboard::Clipboard;
use crate::core::markdown::{CodeBlock, Markup};

pub use copy::{COPIED_LABEL, CopyControl};
#[allow(unused_imports)]
pub use copy::{COPY_ACK_DELAY, CopyState, IDLE_LABEL};
pub use view::{render_view, save_view};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Stable identity of a message for the lifetime of its transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle(u64);

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of an entry. A reply goes `Pending` -> `Answered` | `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    /// Regular message (e.g. the user's query).
    Settled,
    /// Placeholder shown while a reply is on its way.
    Pending,
    Answered,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    handle: MessageHandle,
    pub role: Role,
    pub content: Markup,
    pub status: MessageStatus,
    pub created_at: DateTime<Local>,
    copy_controls: Vec<CopyControl>,
}

impl ChatMessage {
    pub fn handle(&self) -> MessageHandle {
        self.handle
    }

    pub fn copy_controls(&self) -> &[CopyControl] {
        &self.copy_controls
    }
}

/// Addresses one code block: the `index`-th block of `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlockRef {
    pub message: MessageHandle,
    pub index: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("no message {0} in the transcript")]
    UnknownMessage(MessageHandle),
    #[error("message {} has no code block {}", .0.message, .0.index + 1)]
    UnknownCodeBlock(CodeBlockRef),
    #[error("message {0} is not awaiting a reply")]
    NotPending(MessageHandle),
    #[error("{0:?} is not a final reply status")]
    NotFinal(MessageStatus),
}

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_handle: u64,
    /// Set by every append/replace; the view then scrolls to the newest entry.
    follow_bottom: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn follows_bottom(&self) -> bool {
        self.follow_bottom
    }

    pub fn get(&self, handle: MessageHandle) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.handle == handle)
    }

    fn get_mut(&mut self, handle: MessageHandle) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().find(|m| m.handle == handle)
    }

    /// Append a message at the end and follow it.
    pub fn append(&mut self, role: Role, content: Markup) -> MessageHandle {
        self.push(role, content, MessageStatus::Settled)
    }

    /// Append a placeholder that a later [`Transcript::replace`] turns into the real reply.
    pub fn append_pending(&mut self, role: Role, placeholder: Markup) -> MessageHandle {
        self.push(role, placeholder, MessageStatus::Pending)
    }

    fn push(&mut self, role: Role, content: Markup, status: MessageStatus) -> MessageHandle {
        let handle = MessageHandle(self.next_handle);
        self.next_handle += 1;
        self.messages.push(ChatMessage {
            handle,
            role,
            content,
            status,
            created_at: Local::now(),
            copy_controls: Vec::new(),
        });
        self.follow_bottom = true;
        log::debug!("transcript: appended {} ({:?})", handle, status);
        self.attach_copy_controls();
        handle
    }

    /// Settle a pending message: overwrite its role and content, then attach copy controls.
    /// Only `Pending` entries can be replaced, and only with `Answered` or `Failed`.
    /// Controls of the replaced content are dropped; no other message is touched.
    pub fn replace(
        &mut self,
        handle: MessageHandle,
        role: Role,
        content: Markup,
        status: MessageStatus,
    ) -> Result<(), TranscriptError> {
        if !matches!(status, MessageStatus::Answered | MessageStatus::Failed) {
            return Err(TranscriptError::NotFinal(status));
        }
        let message = self
            .get_mut(handle)
            .ok_or(TranscriptError::UnknownMessage(handle))?;
        if message.status != MessageStatus::Pending {
            return Err(TranscriptError::NotPending(handle));
        }
        message.role = role;
        message.content = content;
        message.status = status;
        message.copy_controls.clear();
        self.follow_bottom = true;
        log::debug!("transcript: replaced {} ({:?})", handle, status);
        self.attach_copy_controls();
        Ok(())
    }

    /// Messages still waiting for their reply.
    pub fn pending(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages
            .iter()
            .filter(|m| m.status == MessageStatus::Pending)
    }

    /// Give every code block that lacks one exactly one copy control.
    /// Returns how many controls were attached; a second call returns 0.
    pub fn attach_copy_controls(&mut self) -> usize {
        let mut attached = 0;
        for message in &mut self.messages {
            let blocks = message.content.code_block_count();
            let have = message.copy_controls.len();
            if have < blocks {
                message
                    .copy_controls
                    .extend((have..blocks).map(|_| CopyControl::new()));
                attached += blocks - have;
            } else if have > blocks {
                message.copy_controls.truncate(blocks);
            }
        }
        attached
    }

    /// All code blocks in display order, with their control once attached.
    pub fn code_blocks(
        &self,
    ) -> impl Iterator<Item = (CodeBlockRef, &CodeBlock, Option<&CopyControl>)> {
        self.messages.iter().flat_map(|m| {
            m.content.code_blocks().enumerate().map(move |(index, block)| {
                (
                    CodeBlockRef {
                        message: m.handle,
                        index,
                    },
                    block,
                    m.copy_controls.get(index),
                )
            })
        })
    }

    /// The `n`-th code block of the whole transcript, counting from 1.
    pub fn nth_code_block(&self, n: usize) -> Option<CodeBlockRef> {
        let idx = n.checked_sub(1)?;
        self.code_blocks().nth(idx).map(|(r, _, _)| r)
    }

    /// Activate a copy control: put the block's raw code on the clipboard and show the
    /// acknowledgment. Clipboard failures are logged and leave the control idle.
    /// Returns whether the clipboard write succeeded.
    pub fn activate_copy(
        &mut self,
        block: CodeBlockRef,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Result<bool, TranscriptError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.handle == block.message)
            .ok_or(TranscriptError::UnknownMessage(block.message))?;
        let code = message
            .content
            .code_blocks()
            .nth(block.index)
            .map(|b| b.code.clone())
            .ok_or(TranscriptError::UnknownCodeBlock(block))?;
        let control = message
            .copy_controls
            .get_mut(block.index)
            .ok_or(TranscriptError::UnknownCodeBlock(block))?;

        match clipboard.write_text(&code) {
            Ok(()) => {
                control.mark_copied(now);
                Ok(true)
            }
            Err(e) => {
                log::warn!("copy of code block failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Revert expired acknowledgments. Returns true if any control changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for control in self
            .messages
            .iter_mut()
            .flat_map(|m| m.copy_controls.iter_mut())
        {
            changed |= control.tick(now);
        }
        changed
    }

    /// Earliest pending revert, for scheduling the next [`Transcript::tick`].
    pub fn next_revert(&self) -> Option<Instant> {
        self.messages
            .iter()
            .flat_map(|m| m.copy_controls.iter())
            .filter_map(CopyControl::revert_at)
            .min()
    }
}
