//! BlobStore port - media object storage.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("upload request failed: {0}")]
    Request(String),

    /// The store accepted the request but rejected the object.
    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Port for storing media objects and resolving their public locators.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload an object at `path` with the given content type.
    ///
    /// Returns the public URL the object is served from. The upload must be
    /// durable before the URL is returned; a returned locator is a promise
    /// that the bytes are retrievable.
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BlobError>;
}
