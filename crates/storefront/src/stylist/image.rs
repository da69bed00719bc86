//! Image attachments for stylist messages.
//!
//! Images are kept as base64 `data:` URLs, the same form used for on-screen
//! preview and for transmission.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Media type used when the file extension is not recognized.
const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

/// Errors that can occur while reading an image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read image {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An image encoded as a base64 `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment(String);

impl ImageAttachment {
    /// Encode raw image bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], media_type: &str) -> Self {
        Self(format!("data:{media_type};base64,{}", STANDARD.encode(bytes)))
    }

    /// Wrap an existing data URL (or bare base64 payload).
    #[must_use]
    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    /// Read and encode an image file.
    ///
    /// The preview media type is guessed from the file extension. No size or
    /// format validation is done.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, ImageError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Encoded image attachment");
        Ok(Self::from_bytes(&bytes, media_type_for_path(path)))
    }

    /// The full data URL, suitable for preview.
    #[must_use]
    pub fn data_url(&self) -> &str {
        &self.0
    }

    /// Base64 payload with any `data:...;base64,` prefix removed.
    #[must_use]
    pub fn base64_payload(&self) -> &str {
        match self.0.split_once(',') {
            Some((_, payload)) if !payload.is_empty() => payload,
            _ => &self.0,
        }
    }

    /// Media type declared by the data URL prefix, if any.
    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        let header = self.0.strip_prefix("data:")?.split_once(',')?.0;
        let media_type = header.split(';').next()?;
        (!media_type.is_empty()).then_some(media_type)
    }

    /// Approximate decoded size in bytes.
    #[must_use]
    pub fn approx_size(&self) -> usize {
        self.base64_payload().len() / 4 * 3
    }
}

/// Guess an image media type from a file extension.
#[must_use]
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => FALLBACK_MEDIA_TYPE,
    }
}
