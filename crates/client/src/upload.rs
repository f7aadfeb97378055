//! Content upload client.
//!
//! `POST {upload_url}` with a JSON [`ContentUpload`] body; a 2xx response
//! carries an [`UploadReceipt`]. Uploads are writes and are never retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header;

use pulse_core::{AppConfig, ConfigError, ContentUpload, UploadReceipt};

/// Errors from the upload endpoint.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The endpoint refused the payload (4xx).
    #[error("upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// HTTP error response (5xx).
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

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { UploadError::Timeout } else { UploadError::Network(Arc::new(err)) }
    }
}

impl From<UploadError> for pulse_core::Error {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Rejected { .. } => pulse_core::Error::Upload(err.to_string()),
            _ => pulse_core::Error::Transport(err.to_string()),
        }
    }
}

/// Destination for content uploads.
#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, content: &ContentUpload) -> Result<UploadReceipt, UploadError>;
}

/// HTTP uploader posting JSON to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    upload_url: String,
}

impl ContentClient {
    pub fn new(upload_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .use_rustls_tls()
            .build()?;

        Ok(Self { http, upload_url: upload_url.into() })
    }

    /// Build from configuration. Fails when no upload URL is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let upload_url = config.require_upload_url()?;
        Self::new(upload_url, config.timeout(), &config.user_agent)
            .map_err(|e| ConfigError::LoadFailed(format!("upload client: {e}")))
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

#[async_trait::async_trait]
impl Uploader for ContentClient {
    async fn upload(&self, content: &ContentUpload) -> Result<UploadReceipt, UploadError> {
        let start = Instant::now();

        let response = self
            .http
            .post(&self.upload_url)
            .header(header::ACCEPT, "application/json")
            .json(content)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("upload rejected: {} {}", status, message);
            return Err(UploadError::Rejected { status: status.as_u16(), message });
        }
        if !status.is_success() {
            return Err(UploadError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        let receipt: UploadReceipt = serde_json::from_slice(&bytes).map_err(|e| UploadError::Parse(e.to_string()))?;

        tracing::debug!("uploaded content {} in {:?}", receipt.id, start.elapsed());

        Ok(receipt)
    }
}
