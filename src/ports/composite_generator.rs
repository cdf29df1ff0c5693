//! Composite generator port: two photos and a name in, one image out.

use std::future::Future;
use std::pin::Pin;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::MemoriaError;
use crate::request::GenerationRequest;

/// The single generated image, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeImage {
    /// Base64 image payload.
    pub data: String,
    /// MIME type; the backend is asked for PNG.
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

fn default_mime_type() -> String {
    "image/png".to_string()
}

impl CompositeImage {
    /// Wrap a base64 payload whose type is implicitly PNG.
    #[must_use]
    pub fn png(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: default_mime_type(),
        }
    }

    /// Full `data:` URI for display.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decode the payload into raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Backend`] if the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, MemoriaError> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| MemoriaError::Backend {
                status: None,
                message: format!("Failed to decode image payload: {e}"),
                raw: None,
            })
    }
}

/// Boxed future type returned by [`CompositeGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CompositeImage, MemoriaError>> + Send + 'a>>;

/// Produces the composite image, directly from the backend or via a relay.
///
/// Implementations must reject a request missing either photo before doing
/// any network activity, and must make at most one outbound call.
pub trait CompositeGenerator: Send + Sync {
    /// Generate the composite for the given request.
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_>;
}
