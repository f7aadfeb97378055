//! upload_content tool implementation.
//!
//! Sends content to the configured upload endpoint. On success every cached
//! content and story query is marked stale.

use std::sync::Arc;

use pulse_client::{UploadContentMutation, Uploader};
use pulse_core::{ContentUpload, Error, QueryCache, UploadReceipt};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for upload_content tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UploadContentParams {
    /// Title of the submission.
    pub title: String,

    /// Link to submit. Either `url` or `text` is required.
    #[serde(default)]
    pub url: Option<String>,

    /// Body text for text posts.
    #[serde(default)]
    pub text: Option<String>,
}

impl From<UploadContentParams> for ContentUpload {
    fn from(params: UploadContentParams) -> Self {
        Self { title: params.title, url: params.url, text: params.text }
    }
}

/// Output structure for upload_content tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UploadContentOutput {
    /// Id assigned by the upload endpoint.
    pub id: String,
    pub status: Option<String>,
    /// Query key prefixes marked stale.
    pub invalidated: Vec<String>,
}

impl From<UploadReceipt> for UploadContentOutput {
    fn from(receipt: UploadReceipt) -> Self {
        Self {
            id: receipt.id,
            status: receipt.status,
            invalidated: UploadContentMutation::<dyn Uploader>::affected_keys()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Implementation of the upload_content tool.
pub async fn upload_impl(
    cache: &QueryCache, uploader: Option<Arc<dyn Uploader>>, params: UploadContentParams,
) -> Result<CallToolResult, McpError> {
    let Some(uploader) = uploader else {
        return Err(Error::Config("content upload is disabled: set HN_PULSE_UPLOAD_URL".into()).into());
    };

    let receipt = UploadContentMutation::new(cache.clone(), uploader)
        .upload(params.into())
        .await
        .into_result()?;

    tracing::info!("content uploaded: {}", receipt.id);

    json_result(&UploadContentOutput::from(receipt))
}
