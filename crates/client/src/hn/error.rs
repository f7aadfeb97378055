//! Hacker News API client error types.

use std::sync::Arc;

/// Errors from the Hacker News API client.
#[derive(Debug, thiserror::Error)]
pub enum HnError {
    /// Item ids start at 1.
    #[error("invalid item id: 0")]
    InvalidId,

    /// The API answered but has no such item.
    #[error("item {id} not found")]
    NotFound { id: u64 },

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl HnError {
    /// Whether the failure happened below the application layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, HnError::HttpError { .. } | HnError::Timeout | HnError::Network(_) | HnError::Parse(_))
    }
}

impl From<reqwest::Error> for HnError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { HnError::Timeout } else { HnError::Network(Arc::new(err)) }
    }
}

impl From<HnError> for pulse_core::Error {
    fn from(err: HnError) -> Self {
        match err {
            HnError::InvalidId => pulse_core::Error::InvalidInput(err.to_string()),
            HnError::NotFound { id } => pulse_core::Error::NotFound(format!("item {id}")),
            _ => pulse_core::Error::Transport(err.to_string()),
        }
    }
}
