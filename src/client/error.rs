//! Client error types
//!
//! The backend's failures are not categorized: any non-2xx response becomes
//! `ClientError::Api` with the most readable message found in the body.

use crate::session::SessionError;
use serde_json::Value;
use thiserror::Error;

/// Errors returned by `ApiClient` operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-2xx response from the backend
    #[error("{message}")]
    Api { status: u16, message: String },

    /// No response at all (connection refused, DNS, TLS, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// 2xx response whose body was not the expected JSON
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Operation requires a logged-in session
    #[error("Not logged in")]
    NotAuthenticated,

    /// Rejected locally before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reading a file to upload failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Token store failure
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl ClientError {
    /// HTTP status for backend errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403)) || matches!(self, ClientError::NotAuthenticated)
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(err)
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Keys checked, in order, for a single top-level message
const MESSAGE_KEYS: &[&str] = &["non_field_errors", "detail", "error", "message"];

/// Best-effort human-readable message from an error response body
///
/// Understands the shapes the backend produces: `{"detail": ".."}`,
/// `{"non_field_errors": [".."]}`, `{"error": ".."}`, and per-field
/// validation maps like `{"username": [".."], "password": [".."]}`, whose
/// messages are joined with ", ". Returns `None` for empty or non-JSON bodies.
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body.trim()).ok()?;

    match &value {
        Value::Object(map) => {
            for key in MESSAGE_KEYS {
                if let Some(message) = map.get(*key).and_then(first_text) {
                    return Some(message);
                }
            }
            let parts: Vec<String> = map.values().flat_map(collect_texts).collect();
            join_nonempty(parts)
        }
        _ => join_nonempty(collect_texts(&value)),
    }
}

fn first_text(value: &Value) -> Option<String> {
    collect_texts(value).into_iter().next()
}

fn collect_texts(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(collect_texts).collect(),
        Value::Object(map) => map.values().flat_map(collect_texts).collect(),
        _ => Vec::new(),
    }
}

fn join_nonempty(parts: Vec<String>) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_field_errors_first() {
        let body = r#"{"non_field_errors": ["Invalid credentials"], "detail": "other"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_detail_message() {
        let body = r#"{"detail": "Authentication credentials were not provided."}"#;
        assert_eq!(
            extract_message(body).as_deref(),
            Some("Authentication credentials were not provided.")
        );
    }

    #[test]
    fn test_field_errors_are_joined() {
        let body = r#"{"username": ["already taken"], "password": ["too short", "too common"]}"#;
        let message = extract_message(body).unwrap();
        assert!(message.contains("already taken"));
        assert!(message.contains("too short"));
        assert_eq!(message.matches(", ").count(), 2);
    }

    #[test]
    fn test_unreadable_bodies() {
        assert_eq!(extract_message(""), None);
        assert_eq!(extract_message("<html>502</html>"), None);
        assert_eq!(extract_message("{}"), None);
    }

    #[test]
    fn test_api_error_displays_message_only() {
        let err = ClientError::Api {
            status: 400,
            message: "start_date and end_date are required".to_string(),
        };
        assert_eq!(err.to_string(), "start_date and end_date are required");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_unauthorized());
    }
}
