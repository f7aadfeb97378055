//! Content upload payloads.

use serde::{Deserialize, Serialize};

/// Content submitted through the upload mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUpload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentUpload {
    /// Reject uploads that have no title or carry neither a url nor text.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.title.trim().is_empty() {
            return Err(crate::Error::InvalidInput("title cannot be empty".into()));
        }
        if self.url.is_none() && self.text.is_none() {
            return Err(crate::Error::InvalidInput("either url or text is required".into()));
        }
        Ok(())
    }
}

/// Server acknowledgement of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}
