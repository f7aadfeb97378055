//! Unified error types for hn-pulse.
//!
//! `Error` is `Clone` because a single in-flight fetch hands its outcome to
//! every caller waiting on the same cache key.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the hn-pulse crates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[serde(tag = "code", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Error {
    /// Invalid input parameters (e.g., a zero item id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The upstream responded but has no such record.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Network, HTTP status, or body parse failure.
    #[error("TRANSPORT_ERROR: {0}")]
    Transport(String),

    /// A content upload was rejected or could not be sent.
    #[error("UPLOAD_FAILED: {0}")]
    Upload(String),

    /// A cache key was read with a different value type than it holds.
    #[error("CACHE_TYPE_MISMATCH: {0}")]
    TypeMismatch(String),

    /// A spawned fetch task panicked or was aborted.
    #[error("FETCH_ABORTED: {0}")]
    Aborted(String),

    /// Configuration could not be loaded or is invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error came from the network layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::NotFound(msg) => (-32001, msg.clone()),
            Error::Transport(msg) => (-32002, msg.clone()),
            Error::Upload(msg) => (-32003, msg.clone()),
            Error::TypeMismatch(msg) => (-32004, msg.clone()),
            Error::Aborted(msg) => (-32005, msg.clone()),
            Error::Config(msg) => (-32006, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("item 42".to_string());
        assert!(err.to_string().contains("NOT_FOUND"));
        assert!(err.to_string().contains("item 42"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::Transport("status 503".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32002);
    }

    #[test]
    fn test_error_serializes_code_and_message() {
        let json = serde_json::to_value(Error::NotFound("item 7".into())).unwrap();
        assert_eq!(json, serde_json::json!({"code": "NOT_FOUND", "message": "item 7"}));
    }

    #[test]
    fn test_is_transport() {
        assert!(Error::Transport("x".into()).is_transport());
        assert!(!Error::NotFound("x".into()).is_transport());
    }
}
