//! Supabase storage implementation of the `BlobStore` port.
//!
//! Objects are uploaded to a public bucket; the returned locator is the
//! bucket's public download URL for the object path.

use async_trait::async_trait;
use reqwest::StatusCode;

use super::client::SupabaseClient;
use crate::ports::{BlobError, BlobStore};

pub struct SupabaseBlobStore {
    client: SupabaseClient,
    bucket: String,
}

impl SupabaseBlobStore {
    pub fn new(client: SupabaseClient, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl BlobStore for SupabaseBlobStore {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BlobError> {
        let url = self.client.storage_url(&self.bucket, path);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| BlobError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return if status == StatusCode::BAD_REQUEST || status == StatusCode::CONFLICT {
                Err(BlobError::Rejected(format!("{}: {}", status, body)))
            } else {
                Err(BlobError::Request(format!("{}: {}", status, body)))
            };
        }

        Ok(self.client.public_object_url(&self.bucket, path))
    }
}
