//! Concurrent media upload batch.
//!
//! Every embedded photo and audio item in a draft is decoded and pushed to
//! the blob store before any card record is written. The batch is joined
//! concurrently; a single failure aborts the whole run so a card can never
//! reference a locator that was not durably stored.

use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use tracing::debug;

use crate::domain::card::{CardContent, EmbeddedMedia, MediaCategory};
use crate::domain::payment::ProvisionError;
use crate::ports::BlobStore;

/// Uploads the embedded media of a draft and returns public locators.
pub struct MediaUploader {
    blob_store: Arc<dyn BlobStore>,
}

impl MediaUploader {
    pub fn new(blob_store: Arc<dyn BlobStore>) -> Self {
        Self { blob_store }
    }

    /// Upload all embedded photos and audio concurrently.
    ///
    /// Returns `(photo_urls, music_urls)` in input order. Any failing item
    /// aborts the batch with a `MediaUpload` error carrying its category
    /// and index.
    pub async fn upload_all(
        &self,
        slug: &str,
        content: &CardContent,
    ) -> Result<(Vec<String>, Vec<String>), ProvisionError> {
        let photos = self.upload_category(slug, MediaCategory::Photos, &content.photos);
        let musics = self.upload_category(slug, MediaCategory::Musics, &content.musics);

        let (photo_urls, music_urls) = tokio::try_join!(photos, musics)?;

        debug!(
            slug,
            photos = photo_urls.len(),
            musics = music_urls.len(),
            "media batch uploaded"
        );

        Ok((photo_urls, music_urls))
    }

    async fn upload_category(
        &self,
        slug: &str,
        category: MediaCategory,
        items: &[EmbeddedMedia],
    ) -> Result<Vec<String>, ProvisionError> {
        let uploads = items
            .iter()
            .enumerate()
            .map(|(index, item)| self.upload_one(slug, category, index, item));

        try_join_all(uploads).await
    }

    async fn upload_one(
        &self,
        slug: &str,
        category: MediaCategory,
        index: usize,
        item: &EmbeddedMedia,
    ) -> Result<String, ProvisionError> {
        let decoded = item.decode().map_err(|e| ProvisionError::MediaUpload {
            category,
            index,
            message: e.to_string(),
        })?;

        let extension = item.extension(&decoded.content_type);
        let path = format!(
            "{}/{}/{}-{}.{}",
            slug,
            category,
            index,
            Utc::now().timestamp_millis(),
            extension
        );

        self.blob_store
            .upload(&path, &decoded.content_type, decoded.bytes)
            .await
            .map_err(|e| ProvisionError::MediaUpload {
                category,
                index,
                message: e.to_string(),
            })
    }
}
