//! Unified error type for memoria.

use thiserror::Error;

/// Fallback message when the backend gives no usable explanation.
pub const GENERIC_BACKEND_MESSAGE: &str = "Could not communicate with the image backend.";

/// Errors that can occur while encoding photos, generating, or relaying.
#[derive(Debug, Error)]
pub enum MemoriaError {
    /// A photo could not be read or its MIME type could not be determined.
    #[error("Could not process photo: {0}")]
    Decode(String),

    /// A required input was missing at submission time.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The backend (or the transport to it) reported a failure.
    #[error("Backend error: {message}")]
    Backend {
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Human-readable message, from the backend when available.
        message: String,
        /// Raw backend response body, kept for diagnostics.
        raw: Option<serde_json::Value>,
    },

    /// A well-formed backend response without any inline image part.
    #[error("The backend response did not contain an image")]
    NoImage {
        /// Raw backend response body, kept for diagnostics.
        raw: Option<serde_json::Value>,
    },

    /// Configuration error (missing credential, unreadable config file).
    #[error("Config error: {0}")]
    Config(String),

    /// The relay rejected the caller's verification token.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The relay refused a request body over its size limit.
    #[error("Request too large: {0}")]
    PayloadTooLarge(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format conversion error.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),
}

impl MemoriaError {
    /// Shorthand for the missing-photo validation failure.
    #[must_use]
    pub fn photos_required() -> Self {
        Self::Validation("both photos required".to_string())
    }

    /// Stable name of the variant, as stored in cassettes.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Validation(_) => "validation",
            Self::Backend { .. } => "backend",
            Self::NoImage { .. } => "no_image",
            Self::Config(_) => "config",
            Self::Forbidden(_) => "forbidden",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Io(_) => "io",
            Self::ImageConversion(_) => "image_conversion",
        }
    }

    /// The variant's message without the display prefix.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Decode(m)
            | Self::Validation(m)
            | Self::Config(m)
            | Self::Forbidden(m)
            | Self::PayloadTooLarge(m)
            | Self::ImageConversion(m) => m.clone(),
            Self::Backend { message, .. } => message.clone(),
            Self::NoImage { .. } => String::new(),
            Self::Io(e) => e.to_string(),
        }
    }

    /// Rebuild an error from [`MemoriaError::kind`] and [`MemoriaError::detail`].
    ///
    /// Unknown kinds become [`MemoriaError::Backend`]. Status codes and raw
    /// bodies are not restored.
    #[must_use]
    pub fn from_kind(kind: &str, detail: String) -> Self {
        match kind {
            "decode" => Self::Decode(detail),
            "validation" => Self::Validation(detail),
            "no_image" => Self::NoImage { raw: None },
            "config" => Self::Config(detail),
            "forbidden" => Self::Forbidden(detail),
            "payload_too_large" => Self::PayloadTooLarge(detail),
            "io" => Self::Io(std::io::Error::other(detail)),
            "image_conversion" => Self::ImageConversion(detail),
            _ => Self::Backend {
                status: None,
                message: detail,
                raw: None,
            },
        }
    }
}

impl From<reqwest::Error> for MemoriaError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            "The image backend did not answer in time.".to_string()
        } else {
            format!("{GENERIC_BACKEND_MESSAGE} ({e})")
        };
        Self::Backend {
            status: e.status().map(|s| s.as_u16()),
            message,
            raw: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photos_required_message() {
        let err = MemoriaError::photos_required();
        assert_eq!(err.to_string(), "Invalid request: both photos required");
    }

    #[test]
    fn backend_display_uses_message() {
        let err = MemoriaError::Backend {
            status: Some(429),
            message: "quota exceeded".into(),
            raw: None,
        };
        assert_eq!(err.to_string(), "Backend error: quota exceeded");
    }

    #[test]
    fn kind_and_detail_rebuild_the_variant() {
        let no_image = MemoriaError::NoImage { raw: None };
        let rebuilt = MemoriaError::from_kind(no_image.kind(), no_image.detail());
        assert!(matches!(rebuilt, MemoriaError::NoImage { .. }));

        let validation = MemoriaError::photos_required();
        let rebuilt = MemoriaError::from_kind(validation.kind(), validation.detail());
        assert_eq!(rebuilt.to_string(), validation.to_string());

        let unknown = MemoriaError::from_kind("something_new", "quota".into());
        match unknown {
            MemoriaError::Backend { message, .. } => assert_eq!(message, "quota"),
            other => panic!("expected Backend, got {other:?}"),
        }
    }
}
