use serde::{Deserialize, Serialize};
use std::fmt;

/// Error body returned by the persistence backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    /// Server-provided message; may be empty when the backend gave none.
    #[serde(default)]
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("invalid_argument", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal", message)
    }

    /// The message, if the server actually sent one.
    pub fn server_message(&self) -> Option<&str> {
        let message = self.message.trim();
        (!message.is_empty()).then_some(message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_ignores_blank() {
        assert_eq!(ApiError::internal("  ").server_message(), None);
        assert_eq!(
            ApiError::unauthorized("Session expired").server_message(),
            Some("Session expired")
        );
    }

    #[test]
    fn test_message_defaults_when_missing() {
        let err: ApiError = serde_json::from_str(r#"{"code":"internal"}"#).unwrap();
        assert_eq!(err.message, "");
        assert_eq!(err.server_message(), None);
    }
}
