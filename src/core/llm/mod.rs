//! Answer generation through Gemini's OpenAI-compatible chat endpoint.

mod error;
mod prompt;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use serde_json::{Value, json};

use crate::core::turn::TurnError;

pub use error::map_api_error;
pub use prompt::compose;

/// Produces an answer for a composed prompt, authenticated with a per-turn credential.
pub trait AnswerGenerator {
    async fn generate(&self, prompt: &str, credential: &str) -> Result<String, TurnError>;
}

/// Gemini via the OpenAI-compatible endpoint.
pub struct GeminiGenerator {
    api_base: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl AnswerGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str, credential: &str) -> Result<String, TurnError> {
        let config = OpenAIConfig::new()
            .with_api_base(&self.api_base)
            .with_api_key(credential);
        let client = Client::with_config(config);

        log::info!("generate: model={} prompt_chars={}", self.model, prompt.chars().count());
        let response: Value = client
            .chat()
            .create_byot::<_, Value>(json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
            }))
            .await
            .map_err(map_api_error)?;

        extract_answer(&response)
            .ok_or_else(|| TurnError::upstream("Gemini returned no answer"))
    }
}

/// Text of the first choice, if the response carries any.
pub fn extract_answer(response: &Value) -> Option<String> {
    let content = response
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?;
    match content {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        // Some compatible endpoints return content parts instead of a string.
        Value::Array(parts) => {
            let text: String = parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect();
            (!text.trim().is_empty()).then_some(text)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn extract_answer_reads_first_choice() {
        let v = json!({"choices": [{"message": {"role": "assistant", "content": "Hi **there**"}}]});
        assert_eq!(extract_answer(&v).as_deref(), Some("Hi **there**"));
    }

    #[test]
    fn extract_answer_joins_content_parts() {
        let v = json!({"choices": [{"message": {"content": [{"type": "text", "text": "a"}, {"type": "text", "text": "b"}]}}]});
        assert_eq!(extract_answer(&v).as_deref(), Some("ab"));
    }

    #[test]
    fn extract_answer_missing_or_empty() {
        assert_eq!(extract_answer(&json!({})), None);
        assert_eq!(extract_answer(&json!({"choices": []})), None);
        assert_eq!(
            extract_answer(&json!({"choices": [{"message": {"content": "  "}}]})),
            None
        );
    }

    #[tokio::test]
    async fn posts_prompt_with_bearer_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"model": "gemini-test"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1",
                "object": "chat.completion",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "The answer."}, "finish_reason": "stop"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(server.uri(), "gemini-test");
        let answer = generator.generate("prompt", "test-key").await.unwrap();
        assert_eq!(answer, "The answer.");
    }

    #[tokio::test]
    async fn empty_choices_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(server.uri(), "gemini-test");
        let err = generator.generate("prompt", "k").await.unwrap_err();
        assert_eq!(err.to_string(), "Gemini returned no answer");
    }
}
