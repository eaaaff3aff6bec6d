//! File-storage bridge: upload and delete certificate images.
//!
//! The wire protocol is one POST endpoint taking a JSON envelope (sent as
//! `text/plain` to avoid a CORS preflight) and returning a success flag
//! with either a file id and URL or an error message. The envelope types
//! here mirror that shape exactly; the trait hides the transport.

use crate::bridge::BridgeError;
use crate::model::ImageRef;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Bridge endpoint configuration. The shared token gates access on the
/// hosting side and must come from deployment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub endpoint: String,
    pub token: String,
}

/// Action discriminator of the wire envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeAction {
    Upload,
    Delete,
}

/// Outbound envelope. Field names are camelCase on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    pub token: String,
    pub action: BridgeAction,
    /// Owner username, used by the hosting side to name upload folders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Hosted file id, for deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Base64-encoded image bytes, for uploads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl BridgeRequest {
    /// Build an upload envelope from raw image bytes.
    pub fn upload(config: &BridgeConfig, username: &str, bytes: &[u8], mime_type: &str) -> Self {
        Self {
            token: config.token.clone(),
            action: BridgeAction::Upload,
            username: Some(username.to_string()),
            file_id: None,
            data: Some(BASE64.encode(bytes)),
            mime_type: Some(mime_type.to_string()),
        }
    }

    /// Build a delete envelope.
    pub fn delete(config: &BridgeConfig, file_id: &str) -> Self {
        Self {
            token: config.token.clone(),
            action: BridgeAction::Delete,
            username: None,
            file_id: Some(file_id.to_string()),
            data: None,
            mime_type: None,
        }
    }
}

/// Inbound envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A successfully uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub id: String,
    pub url: String,
}

impl From<UploadedFile> for ImageRef {
    fn from(file: UploadedFile) -> Self {
        ImageRef {
            file_id: file.id,
            url: file.url,
        }
    }
}

/// Transport-agnostic file-storage bridge.
pub trait FileBridge: Send + Sync {
    /// Upload image bytes on behalf of a user.
    fn upload(
        &self,
        username: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> impl Future<Output = Result<UploadedFile, BridgeError>> + Send;

    /// Delete a hosted file by id. Deleting an unknown id is not an error.
    fn delete(&self, file_id: &str) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

/// In-memory bridge for tests: records uploads and deletions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileBridge {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_uploads: bool,
}

impl InMemoryFileBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bridge whose uploads always fail, for error-path tests.
    pub fn failing() -> Self {
        Self {
            files: Arc::default(),
            fail_uploads: true,
        }
    }

    /// Number of files currently hosted.
    pub async fn file_count(&self) -> usize {
        self.files.read().await.len()
    }

    /// Whether a file id is currently hosted.
    pub async fn contains(&self, file_id: &str) -> bool {
        self.files.read().await.contains_key(file_id)
    }
}

impl FileBridge for InMemoryFileBridge {
    async fn upload(
        &self,
        _username: &str,
        bytes: &[u8],
        _mime_type: &str,
    ) -> Result<UploadedFile, BridgeError> {
        if self.fail_uploads {
            return Err(BridgeError::rejected("upload disabled"));
        }
        let id = Uuid::new_v4().to_string();
        self.files
            .write()
            .await
            .insert(id.clone(), bytes.to_vec());
        Ok(UploadedFile {
            url: format!("memory://{id}"),
            id,
        })
    }

    async fn delete(&self, file_id: &str) -> Result<(), BridgeError> {
        self.files.write().await.remove(file_id);
        Ok(())
    }
}
