//! One question/answer turn: placeholder, collaborators, then the final entry.

mod error;

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::api_key::{CredentialStore, GEMINI_API_KEY};
use crate::core::llm::{self, AnswerGenerator};
use crate::core::markdown::{Markup, render_markup};
use crate::core::page::PageSource;
use crate::core::search::SearchSource;
use crate::core::transcript::{MessageHandle, MessageStatus, Role, Transcript};

pub use error::TurnError;

/// Assistant entry shown while a turn is in flight.
pub const PLACEHOLDER: &str = "Reading page and thinking...";

/// Prefix of the assistant entry that replaces the placeholder on failure.
pub const ERROR_PREFIX: &str = "⚠️ Error: ";

/// Everything a turn talks to besides the transcript.
pub struct TurnContext<'a, P, S, G> {
    pub page: &'a P,
    pub search: &'a S,
    pub generator: &'a G,
    pub credentials: &'a dyn CredentialStore,
    /// Upper bound for each outbound call.
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum TurnOutcome {
    Answered { handle: MessageHandle },
    Failed { handle: MessageHandle, error: TurnError },
}

impl TurnOutcome {
    pub fn handle(&self) -> MessageHandle {
        match self {
            TurnOutcome::Answered { handle } | TurnOutcome::Failed { handle, .. } => *handle,
        }
    }
}

/// Run one turn for `query`. Whitespace-only queries are ignored (`None`).
///
/// The user's query and a pending placeholder are appended first; the
/// placeholder is then replaced by the rendered answer or by an error entry.
/// No error escapes: every failure ends up in the transcript.
pub async fn run_turn<P, S, G>(
    transcript: &mut Transcript,
    ctx: &TurnContext<'_, P, S, G>,
    query: &str,
    cancel: &CancellationToken,
) -> Option<TurnOutcome>
where
    P: PageSource,
    S: SearchSource,
    G: AnswerGenerator,
{
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    if let Some(stale) = transcript.pending().next() {
        log::warn!("starting a turn while {} is still pending", stale.handle());
    }
    transcript.append(Role::User, Markup::text(query));
    let handle = transcript.append_pending(Role::Assistant, Markup::text(PLACEHOLDER));

    let (content, status, outcome) = match answer(ctx, query, cancel).await {
        Ok(raw) => (
            render_markup(&raw),
            MessageStatus::Answered,
            TurnOutcome::Answered { handle },
        ),
        Err(error) => {
            log::warn!("turn failed: {}", error);
            (
                Markup::text(&format!("{}{}", ERROR_PREFIX, error)),
                MessageStatus::Failed,
                TurnOutcome::Failed { handle, error },
            )
        }
    };

    if let Err(e) = transcript.replace(handle, Role::Assistant, content, status) {
        log::error!("could not settle turn {}: {}", handle, e);
    }
    Some(outcome)
}

async fn answer<P, S, G>(
    ctx: &TurnContext<'_, P, S, G>,
    query: &str,
    cancel: &CancellationToken,
) -> Result<String, TurnError>
where
    P: PageSource,
    S: SearchSource,
    G: AnswerGenerator,
{
    // No network traffic without a key.
    let credential = ctx
        .credentials
        .get(GEMINI_API_KEY)
        .ok_or(TurnError::MissingCredential)?;

    let page_text = bounded(ctx.page.page_text(), ctx.timeout, cancel).await?;
    log::debug!("page text: {} chars", page_text.chars().count());

    let background = bounded(ctx.search.background(query), ctx.timeout, cancel).await?;
    log::debug!("background: {} chars", background.chars().count());

    let prompt = llm::compose(&page_text, &background, query);
    bounded(ctx.generator.generate(&prompt, &credential), ctx.timeout, cancel).await
}

/// Race a collaborator call against cancellation and the per-call timeout.
async fn bounded<T>(
    call: impl Future<Output = Result<T, TurnError>>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<T, TurnError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TurnError::Cancelled),
        result = tokio::time::timeout(timeout, call) => {
            result.unwrap_or_else(|_| Err(TurnError::TimedOut(timeout.as_secs())))
        }
    }
}
