//! Photo encoding: file bytes to a base64 payload with a sniffed MIME type.

use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::MemoriaError;

/// A user photo ready to be sent inline to the backend.
///
/// `data` is plain base64 with no `data:` prefix. The displayable preview is
/// derived on demand by [`PhotoPayload::data_url`] and never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoPayload {
    /// Base64-encoded file contents.
    #[serde(default)]
    pub data: String,
    /// MIME type sniffed from the file header (e.g. `"image/png"`).
    #[serde(rename = "mimeType", alias = "mime_type", default)]
    pub mime_type: String,
}

impl PhotoPayload {
    /// Encode raw file bytes, deriving the MIME type from the magic number.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Decode`] if the bytes are not a recognizable image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MemoriaError> {
        let format = image::guess_format(bytes).map_err(|_| {
            MemoriaError::Decode("could not determine the file's MIME type".to_string())
        })?;
        Ok(Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: format.to_mime_type().to_string(),
        })
    }

    /// Full `data:` URI for previews.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// True when the payload carries no image data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.trim().is_empty()
    }

    /// Decode the payload back into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Decode`] if `data` is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, MemoriaError> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| MemoriaError::Decode(format!("invalid base64 payload: {e}")))
    }
}

/// Read a photo from disk and encode it.
///
/// # Errors
///
/// Returns [`MemoriaError::Decode`] if the file cannot be read or is not an image.
pub async fn encode_file(path: &Path) -> Result<PhotoPayload, MemoriaError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| MemoriaError::Decode(format!("failed to read {}: {e}", path.display())))?;
    PhotoPayload::from_bytes(&bytes)
}
