//! Error types for the gateway API client.
//!
//! Every failure is local to the triggering action: errors bubble up to the
//! store layer, which records a human-readable message for the UI. There is
//! no retry or backoff anywhere in the client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response from the gateway. The message is extracted from the
    /// JSON error body (`detail` or `message`), falling back to the HTTP
    /// status reason.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connection refused, DNS, timeout).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not the JSON shape we expected.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The endpoint returned 204 where a body was required.
    #[error("empty response from {0}")]
    EmptyBody(String),

    /// Client-side misuse (bad base URL, missing parent id).
    #[error("{0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Extract the operator-facing message from a JSON error body,
    /// mirroring the gateway's `{"detail": ...}` / `{"message": ...}` shape.
    pub fn from_response(status: u16, body: &str, status_reason: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("detail")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str().map(String::from))
            })
            .unwrap_or_else(|| status_reason.to_string());
        ApiError::Api { status, message }
    }

    /// True for a 404, which the UI treats like any other API error but
    /// callers occasionally want to distinguish in logs.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Api { status: 404, .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_detail() {
        let err = ApiError::from_response(404, r#"{"detail": "Provider not found"}"#, "Not Found");
        assert_eq!(err.to_string(), "Provider not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_message_from_message_field() {
        let err = ApiError::from_response(400, r#"{"message": "bad request"}"#, "Bad Request");
        assert_eq!(err.to_string(), "bad request");
    }

    #[test]
    fn test_fallback_to_status_reason() {
        let err = ApiError::from_response(500, "<html>oops</html>", "Internal Server Error");
        assert_eq!(err.to_string(), "Internal Server Error");
        assert!(!err.is_not_found());
    }
}
