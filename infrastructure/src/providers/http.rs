//! HTTP plumbing shared by the model backends.

use std::time::Duration;

use serde_json::Value;
use zia_application::ProviderError;
use zia_domain::util::truncate_str;

/// Longest error body echoed back in an error message
const MAX_ERROR_BODY: usize = 500;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Transport(e.to_string()))
}

pub(crate) fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Transport(format!("request timed out: {}", e))
    } else {
        ProviderError::Transport(e.to_string())
    }
}

/// Human-readable message from an error body.
///
/// Understands `{"error": {"message": ..}}` (Messages API) and
/// `{"detail": ..}` (the credential proxy); anything else is echoed,
/// truncated.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            return message.to_string();
        }
        if let Some(detail) = value.get("detail").and_then(Value::as_str) {
            return detail.to_string();
        }
    }
    truncate_str(body.trim(), MAX_ERROR_BODY).to_string()
}

/// Map a non-2xx status to a typed error.
pub(crate) fn error_for_status(status: u16, body: &str) -> ProviderError {
    let message = error_message(body);
    match status {
        401 | 403 => ProviderError::InvalidCredential(message),
        400 | 413 | 422 => ProviderError::MalformedRequest(message),
        502 | 503 | 504 | 529 => ProviderError::ServiceUnavailable(message),
        _ => ProviderError::Http {
            status,
            body: message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let api_error = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert_eq!(
            error_for_status(401, api_error),
            ProviderError::InvalidCredential("invalid x-api-key".into())
        );
        assert!(matches!(
            error_for_status(400, "{}"),
            ProviderError::MalformedRequest(_)
        ));
        assert!(error_for_status(529, r#"{"error":{"message":"Overloaded"}}"#).is_retryable());
        assert_eq!(
            error_for_status(503, r#"{"detail":"ANTHROPIC_API_KEY is not configured on the server"}"#),
            ProviderError::ServiceUnavailable(
                "ANTHROPIC_API_KEY is not configured on the server".into()
            )
        );
        assert_eq!(
            error_for_status(418, "teapot"),
            ProviderError::Http {
                status: 418,
                body: "teapot".into()
            }
        );
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        assert_eq!(error_message(&body).len(), MAX_ERROR_BODY);
    }
}
