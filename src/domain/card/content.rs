//! Card content payloads.
//!
//! A draft `CardContent` arrives from the client with media embedded inline
//! as data URLs (`data:<mime>;base64,<payload>`). After payment confirmation
//! every embedded item is replaced by a durable public locator, producing a
//! `PublishedContent`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of an embedded media item; determines the storage prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Photos,
    Musics,
}

impl MediaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photos => "photos",
            Self::Musics => "musics",
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error decoding an embedded media payload.
#[derive(Debug, Error)]
pub enum MediaDecodeError {
    #[error("payload is not a data URL")]
    NotADataUrl,

    #[error("data URL is not base64-encoded")]
    NotBase64Encoded,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// One media item embedded inline in a draft card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedMedia {
    /// Client-side label or filename (e.g. `"praia.jpg"`).
    pub name: String,

    /// Self-describing inline payload: `data:<mime>;base64,<bytes>`.
    pub data: String,
}

/// Decoded bytes plus the content type declared by the data URL.
#[derive(Debug, Clone)]
pub struct DecodedMedia {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl EmbeddedMedia {
    /// Decode the inline data URL into raw bytes and its declared media type.
    pub fn decode(&self) -> Result<DecodedMedia, MediaDecodeError> {
        use base64::Engine as _;

        let rest = self
            .data
            .strip_prefix("data:")
            .ok_or(MediaDecodeError::NotADataUrl)?;
        let (content_type, payload) = rest
            .split_once(";base64,")
            .ok_or(MediaDecodeError::NotBase64Encoded)?;

        let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;

        Ok(DecodedMedia {
            content_type: content_type.to_string(),
            bytes,
        })
    }

    /// File extension for the stored blob.
    ///
    /// Prefers the extension of the original filename so it round-trips
    /// unchanged; falls back to guessing from the declared media type.
    pub fn extension(&self, content_type: &str) -> String {
        if let Some((_, ext)) = self.name.rsplit_once('.') {
            if !ext.is_empty() && ext.len() <= 5 {
                return ext.to_ascii_lowercase();
            }
        }
        mime_guess::get_mime_extensions_str(content_type)
            .and_then(|exts| exts.first())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Draft card content as submitted by the client, media embedded inline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardContent {
    /// Card title (usually the couple's names).
    #[serde(default)]
    pub title: String,

    /// Free-form dedication message.
    #[serde(default)]
    pub message: String,

    /// Embedded photo payloads.
    #[serde(default)]
    pub photos: Vec<EmbeddedMedia>,

    /// Embedded audio payloads.
    #[serde(default)]
    pub musics: Vec<EmbeddedMedia>,

    /// Optional link to an external music service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_url: Option<String>,

    /// Any additional fields carried through unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CardContent {
    /// Replace embedded media with durable locators, carrying every other
    /// field over unchanged.
    pub fn publish(self, photo_urls: Vec<String>, music_urls: Vec<String>) -> PublishedContent {
        PublishedContent {
            title: self.title,
            message: self.message,
            photos: photo_urls,
            musics: music_urls,
            music_url: self.music_url,
            extra: self.extra,
        }
    }
}

/// Final card content with media locators instead of inline payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishedContent {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub message: String,

    /// Public locators of the stored photos.
    #[serde(default)]
    pub photos: Vec<String>,

    /// Public locators of the stored audio files.
    #[serde(default)]
    pub musics: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_url: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
