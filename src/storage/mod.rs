//! # Object storage
//!
//! Uploaded brand images are pushed to an external object store and referenced
//! by the public URL it hands back. [`ObjectStore`] is the seam; the only
//! production implementation is [`FirebaseStorage`].

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod firebase;

pub use firebase::FirebaseStorage;

/// Folder every uploaded object is placed under.
pub const OBJECT_PREFIX: &str = "brands";

/// Content types accepted by the upload endpoint.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object storage is not configured")]
    NotConfigured,
    #[error("object store returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("object store response is missing a download token")]
    MissingDownloadToken,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid object store URL: {0}")]
    Url(#[from] url::ParseError),
}

impl StorageError {
    /// Short variant name, safe to return to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::NotConfigured => "not_configured",
            StorageError::Upstream { .. } => "upstream",
            StorageError::MissingDownloadToken => "missing_download_token",
            StorageError::Network(_) => "network",
            StorageError::Url(_) => "url",
        }
    }
}

/// A file ready to be stored.
#[derive(Clone)]
pub struct UploadObject {
    /// Full object path, see [`object_name`]
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadObject")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store the object and return its public URL.
    async fn upload(&self, object: UploadObject) -> Result<String, StorageError>;
}

/// `brands/<uuid>.<ext>`, keeping the lowercased extension of the client file name.
pub fn object_name(original_file_name: &str) -> String {
    let extension = original_file_name
        .rsplit_once('.')
        .map(|(stem, ext)| (stem, ext.trim()))
        .filter(|(stem, ext)| {
            !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension {
        Some(ext) => format!("{OBJECT_PREFIX}/{}.{ext}", Uuid::new_v4()),
        None => format!("{OBJECT_PREFIX}/{}", Uuid::new_v4()),
    }
}

/// Whether the upload endpoint accepts this content type (parameters ignored).
pub fn is_allowed_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_CONTENT_TYPES.contains(&essence.as_str())
}
