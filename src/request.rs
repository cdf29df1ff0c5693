//! Generation requests and the `generateContent` wire shapes.
//!
//! Both the direct client and the relay shape their backend call through
//! [`shape_request`], so the prompt text and part order live in one place.

use serde::{Deserialize, Serialize};

use crate::error::MemoriaError;
use crate::photo::PhotoPayload;
use crate::prompt::build_prompt;

/// One user submission: two photos and an optional caption name.
///
/// This is also the JSON body accepted by the relay's `/generate-image`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The childhood photo.
    #[serde(default)]
    pub old_photo: Option<PhotoPayload>,
    /// The recent adult photo.
    #[serde(default)]
    pub recent_photo: Option<PhotoPayload>,
    /// Caption name; empty means no caption.
    #[serde(default)]
    pub name: String,
}

impl GenerationRequest {
    /// Create a request with both photos present.
    #[must_use]
    pub fn new(
        old_photo: PhotoPayload,
        recent_photo: PhotoPayload,
        name: impl Into<String>,
    ) -> Self {
        Self {
            old_photo: Some(old_photo),
            recent_photo: Some(recent_photo),
            name: name.into(),
        }
    }

    /// Both photos, or a validation error if either is absent or empty.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Validation`] when a photo is missing.
    pub fn photos(&self) -> Result<(&PhotoPayload, &PhotoPayload), MemoriaError> {
        match (&self.old_photo, &self.recent_photo) {
            (Some(old), Some(recent)) if !old.is_empty() && !recent.is_empty() => Ok((old, recent)),
            _ => Err(MemoriaError::photos_required()),
        }
    }

    /// Check that both photos are present, before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Validation`] when a photo is missing.
    pub fn validate(&self) -> Result<(), MemoriaError> {
        self.photos().map(|_| ())
    }

    /// Validate and shape the backend body in one step.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Validation`] when a photo is missing.
    pub fn to_backend_request(&self) -> Result<GenerateContentRequest, MemoriaError> {
        let (old, recent) = self.photos()?;
        Ok(shape_request(old, recent, &self.name))
    }
}

/// Build the `generateContent` body: old photo, recent photo, then the prompt.
#[must_use]
pub fn shape_request(
    old: &PhotoPayload,
    recent: &PhotoPayload,
    name: &str,
) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![
                RequestPart::inline(old),
                RequestPart::inline(recent),
                RequestPart::Text {
                    text: build_prompt(name),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["IMAGE".to_string()],
        },
    }
}

// --- Request wire types ---

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation contents; always a single user turn here.
    pub contents: Vec<Content>,
    /// Output configuration.
    pub generation_config: GenerationConfig,
}

/// A single content turn.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    /// Ordered parts of the turn.
    pub parts: Vec<RequestPart>,
}

/// A request part: inline media or text.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    /// Inline base64 media.
    InlineData {
        /// The media payload.
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
}

impl RequestPart {
    fn inline(photo: &PhotoPayload) -> Self {
        Self::InlineData {
            inline_data: InlineData::from(photo),
        }
    }
}

/// Output configuration; only the response modality is set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Requested output modalities (`["IMAGE"]`).
    pub response_modalities: Vec<String>,
}

/// Inline base64 media, shared by requests and responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type of the payload.
    #[serde(default, alias = "mime_type")]
    pub mime_type: String,
    /// Base64 payload.
    #[serde(default)]
    pub data: String,
}

impl From<&PhotoPayload> for InlineData {
    fn from(photo: &PhotoPayload) -> Self {
        Self {
            mime_type: photo.mime_type.clone(),
            data: photo.data.clone(),
        }
    }
}

// --- Response wire types ---

/// Body of a `generateContent` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    /// Response candidates; only the first is inspected.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// A response candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    /// Candidate content; absent when generation was blocked.
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

/// Content of a response candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    /// Returned parts in order.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A response part, classified by what it carries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPart")]
pub enum Part {
    /// Inline image data.
    InlineImage(InlineData),
    /// Text commentary.
    Text(String),
    /// Anything else (function calls, non-image media, empty parts).
    Other,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "inline_data")]
    inline_data: Option<InlineData>,
}

impl From<RawPart> for Part {
    fn from(raw: RawPart) -> Self {
        match (raw.inline_data, raw.text) {
            (Some(inline), _) if is_image(&inline) => Self::InlineImage(inline),
            (_, Some(text)) => Self::Text(text),
            _ => Self::Other,
        }
    }
}

fn is_image(inline: &InlineData) -> bool {
    let image_mime = inline.mime_type.is_empty() || inline.mime_type.starts_with("image/");
    !inline.data.is_empty() && image_mime
}

/// Return the first inline image among the first candidate's parts.
///
/// # Errors
///
/// Returns [`MemoriaError::NoImage`] when no such part exists.
pub fn first_inline_image(
    response: &GenerateContentResponse,
) -> Result<&InlineData, MemoriaError> {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .into_iter()
        .flat_map(|content| content.parts.iter())
        .find_map(|part| match part {
            Part::InlineImage(inline) => Some(inline),
            Part::Text(_) | Part::Other => None,
        })
        .ok_or(MemoriaError::NoImage { raw: None })
}

/// Extract `error.message` from a Google-style error body, if present.
#[must_use]
pub fn backend_message(body: Option<&serde_json::Value>) -> Option<String> {
    body?
        .get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(serde_json::Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::prompt::NO_TEXT_INSTRUCTION;

    fn photo(data: &str, mime: &str) -> PhotoPayload {
        PhotoPayload {
            data: data.into(),
            mime_type: mime.into(),
        }
    }

    fn is_validation<T>(result: Result<T, MemoriaError>) -> bool {
        matches!(result, Err(MemoriaError::Validation(_)))
    }

    #[test]
    fn missing_photo_is_rejected_regardless_of_name() {
        for name in ["", "Ana"] {
            let only_old = GenerationRequest {
                old_photo: Some(photo("AA", "image/png")),
                recent_photo: None,
                name: name.into(),
            };
            assert!(is_validation(only_old.photos()));

            let only_recent = GenerationRequest {
                old_photo: None,
                recent_photo: Some(photo("AA", "image/png")),
                name: name.into(),
            };
            assert!(is_validation(only_recent.to_backend_request()));
        }
    }

    #[test]
    fn empty_photo_counts_as_missing() {
        let request = GenerationRequest::new(photo("", ""), photo("AA", "image/png"), "");
        assert!(request.photos().is_err());
        assert!(is_validation(request.validate()));
    }

    #[test]
    fn shaped_body_has_ordered_parts_and_image_modality() {
        let old = photo("OLD", "image/jpeg");
        let body = shape_request(&old, &photo("NEW", "image/png"), "Ana");
        let json = serde_json::to_value(&body).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        let old_part = json!({"inlineData": {"mimeType": "image/jpeg", "data": "OLD"}});
        let new_part = json!({"inlineData": {"mimeType": "image/png", "data": "NEW"}});
        assert_eq!(parts[0], old_part);
        assert_eq!(parts[1], new_part);
        let text = parts[2]["text"].as_str().unwrap();
        assert!(text.contains("Ana"));
        assert!(!text.contains(NO_TEXT_INSTRUCTION));
        assert_eq!(json["generationConfig"]["responseModalities"], json!(["IMAGE"]));
    }

    #[test]
    fn relay_body_deserializes_without_name() {
        let body = json!({
            "old_photo": {"data": "AA", "mimeType": "image/png"},
            "recent_photo": {"data": "BB", "mimeType": "image/jpeg"}
        });
        let request: GenerationRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.name, "");
        let (old, recent) = request.photos().unwrap();
        assert_eq!(old.data, "AA");
        assert_eq!(recent.mime_type, "image/jpeg");
    }

    #[test]
    fn parts_are_classified() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"text": "Here is your image"},
                {"functionCall": {"name": "x"}},
                {"inlineData": {"mimeType": "application/pdf", "data": "PDF"}},
                {"inlineData": {"mimeType": "image/png", "data": "IMG1"}},
                {"inline_data": {"mime_type": "image/png", "data": "IMG2"}}
            ]}}]
        }))
        .unwrap();
        let parts = &response.candidates[0].content.as_ref().unwrap().parts;
        assert_eq!(parts[0], Part::Text("Here is your image".into()));
        assert_eq!(parts[1], Part::Other);
        assert_eq!(parts[2], Part::Other);
        assert!(matches!(parts[3], Part::InlineImage(_)));

        assert_eq!(first_inline_image(&response).unwrap().data, "IMG1");
    }

    #[test]
    fn no_image_part_is_named_error() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot do that"}]}}]
        }))
        .unwrap();
        let err = first_inline_image(&response).unwrap_err();
        assert!(matches!(err, MemoriaError::NoImage { .. }));

        let blocked = json!({"candidates": [{"finishReason": "SAFETY"}]});
        let blocked: GenerateContentResponse = serde_json::from_value(blocked).unwrap();
        let err = first_inline_image(&blocked).unwrap_err();
        assert!(matches!(err, MemoriaError::NoImage { .. }));

        let empty = GenerateContentResponse::default();
        assert!(first_inline_image(&empty).is_err());
    }

    #[test]
    fn backend_message_extraction() {
        let body = json!({"error": {"code": 400, "message": "API key not valid"}});
        let message = backend_message(Some(&body));
        assert_eq!(message.as_deref(), Some("API key not valid"));
        let plain = json!({"error": "plain"});
        assert_eq!(backend_message(Some(&plain)).as_deref(), Some("plain"));
        assert!(backend_message(Some(&json!({"ok": true}))).is_none());
        assert!(backend_message(None).is_none());
    }
}
