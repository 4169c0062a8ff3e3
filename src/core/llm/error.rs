//! Mapping of generation API errors into turn errors.

use crate::core::turn::TurnError;

/// Map async-openai or API errors into a user-readable upstream failure.
pub fn map_api_error<E>(e: E) -> TurnError
where
    E: std::fmt::Display,
{
    let s = e.to_string();
    if s.contains("API key not valid") || s.contains("API_KEY_INVALID") || is_unauthorized(&s) {
        return TurnError::upstream(
            "Gemini rejected the API key. Check it with `page-chat config` or GEMINI_API_KEY.",
        );
    }
    if s.contains("\"error\"")
        && let Some((_, rest)) = s.split_once("\"message\":\"")
        && let Some((msg, _)) = rest.split_once('"')
    {
        return TurnError::upstream(format!("Gemini error: {}", msg));
    }
    TurnError::upstream(format!("Error reaching Gemini: {}", s))
}

/// HTTP 401 as a status, not any "401" inside the message.
fn is_unauthorized(s: &str) -> bool {
    s.contains("401 Unauthorized")
        || s.contains("(401)")
        || s.contains("status: 401")
        || s.contains("\"code\":401")
        || s.contains("\"code\": 401")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_is_reported_as_such() {
        let err = map_api_error("400 Bad Request: API key not valid. Please pass a valid API key.");
        assert!(err.to_string().contains("rejected the API key"));
    }

    #[test]
    fn unauthorized_status_is_a_rejected_key() {
        for text in [
            "HTTP status client error (401 Unauthorized) for url",
            r#"{"error":{"code":401,"message":"Request had invalid authentication credentials."}}"#,
        ] {
            assert!(
                map_api_error(text).to_string().contains("rejected the API key"),
                "{}",
                text
            );
        }
    }

    #[test]
    fn numbers_containing_401_are_not_auth_errors() {
        let err = map_api_error(
            r#"{"error":{"message":"Prompt has 4013 tokens, limit is 4000"}}"#,
        );
        assert_eq!(
            err.to_string(),
            "Gemini error: Prompt has 4013 tokens, limit is 4000"
        );
    }

    #[test]
    fn json_message_is_extracted() {
        let err = map_api_error(r#"{"error":{"message":"Quota exceeded"}}"#);
        match &err {
            TurnError::Upstream(msg) => assert_eq!(msg, "Gemini error: Quota exceeded"),
            _ => panic!("expected Upstream, got {:?}", err),
        }
    }

    #[test]
    fn other_errors_keep_their_text() {
        let err = map_api_error(std::io::Error::other("connection refused"));
        assert!(err.to_string().contains("connection refused"));
    }
}
