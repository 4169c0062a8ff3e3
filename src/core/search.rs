//! Background context for a query from a public search API.

use serde::Deserialize;

use crate::core::app;
use crate::core::turn::TurnError;

/// Supplies a short background string for a query; empty when nothing is known.
pub trait SearchSource {
    async fn background(&self, query: &str) -> Result<String, TurnError>;
}

/// DuckDuckGo Instant Answer API (no key required).
pub struct DuckDuckGo {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
}

impl DuckDuckGo {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl SearchSource for DuckDuckGo {
    async fn background(&self, query: &str) -> Result<String, TurnError> {
        let url = format!("{}/", self.base_url.trim_end_matches('/'));
        log::debug!("search: {}", query);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .header(
                reqwest::header::USER_AGENT,
                format!("{}/{}", app::NAME, app::VERSION),
            )
            .send()
            .await
            .map_err(|e| TurnError::upstream(format!("Search request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TurnError::upstream(format!("Search API error: HTTP {}", status)));
        }
        let body = response
            .text()
            .await
            .map_err(|e| TurnError::upstream(format!("Search response unreadable: {}", e)))?;
        parse_abstract(&body)
    }
}

/// `AbstractText` of an Instant Answer response; an empty body means no answer.
fn parse_abstract(body: &str) -> Result<String, TurnError> {
    if body.trim().is_empty() {
        return Ok(String::new());
    }
    let answer: InstantAnswer = serde_json::from_str(body)
        .map_err(|e| TurnError::upstream(format!("Search response is not JSON: {}", e)))?;
    Ok(answer.abstract_text.trim().to_string())
}

/// `None` means search is disabled: never any background.
impl<S: SearchSource> SearchSource for Option<S> {
    async fn background(&self, query: &str) -> Result<String, TurnError> {
        match self {
            Some(search) => search.background(query).await,
            None => Ok(String::new()),
        }
    }
}
