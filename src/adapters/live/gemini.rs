//! Live adapter for the Gemini `generateContent` API.

use std::time::Duration;

use reqwest::Client;

use crate::error::{MemoriaError, GENERIC_BACKEND_MESSAGE};
use crate::ports::composite_generator::{CompositeGenerator, CompositeImage, GenerateFuture};
use crate::request::{
    backend_message, first_inline_image, GenerateContentResponse, GenerationRequest,
};

/// Default base URL for Gemini models.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Calls the Gemini API directly with a credential held by this process.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiGenerator {
    /// Create a generator for `model` using transport defaults.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            endpoint: GEMINI_API_BASE.to_string(),
        }
    }

    /// Override the base URL (everything before `/{model}:generateContent`).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Bound each call by `timeout`; exceeding it counts as a backend failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, MemoriaError> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MemoriaError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    fn url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        format!("{base}/{}:generateContent", self.model)
    }
}

impl CompositeGenerator for GeminiGenerator {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let body = request.to_backend_request();
        Box::pin(async move {
            let body = body?;
            let url = self.url();
            tracing::debug!(model = %self.model, "sending generateContent request");

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;
            let raw: Option<serde_json::Value> = serde_json::from_str(&response_text).ok();

            if !status.is_success() {
                let message = backend_message(raw.as_ref())
                    .unwrap_or_else(|| format!("{GENERIC_BACKEND_MESSAGE} (HTTP {status})"));
                let status = status.as_u16();
                tracing::warn!(status, %message, "backend rejected generation");
                return Err(MemoriaError::Backend {
                    status: Some(status),
                    message,
                    raw,
                });
            }

            let parsed: GenerateContentResponse =
                serde_json::from_str(&response_text).map_err(|e| MemoriaError::Backend {
                    status: Some(status.as_u16()),
                    message: format!("Failed to parse backend response: {e}"),
                    raw: raw.clone(),
                })?;

            let Ok(inline) = first_inline_image(&parsed) else {
                tracing::warn!("backend response contained no inline image");
                return Err(MemoriaError::NoImage { raw });
            };

            tracing::info!(bytes = inline.data.len(), "composite image received");
            let mut image = CompositeImage::png(inline.data.clone());
            if !inline.mime_type.is_empty() {
                image.mime_type.clone_from(&inline.mime_type);
            }
            Ok(image)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, Uri};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::adapters::live::mock;
    use crate::photo::PhotoPayload;
    use crate::prompt::NO_TEXT_INSTRUCTION;

    #[derive(Debug, Clone)]
    struct Seen {
        path: String,
        api_key: Option<String>,
        body: Value,
    }

    #[derive(Clone)]
    struct Backend {
        status: StatusCode,
        reply: Value,
        seen: Arc<Mutex<Vec<Seen>>>,
    }

    async fn handle(
        State(backend): State<Backend>,
        uri: Uri,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let api_key = headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        backend.seen.lock().unwrap().push(Seen {
            path: uri.path().to_string(),
            api_key,
            body,
        });
        (backend.status, Json(backend.reply.clone()))
    }

    async fn start(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Seen>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let backend = Backend {
            status,
            reply,
            seen: Arc::clone(&seen),
        };
        let app = Router::new().fallback(handle).with_state(backend);
        (mock::spawn(app).await, seen)
    }

    fn request(name: &str) -> GenerationRequest {
        let photo = |data: &str, mime: &str| PhotoPayload {
            data: data.into(),
            mime_type: mime.into(),
        };
        let old = photo("T0xE", "image/jpeg");
        GenerationRequest::new(old, photo("TkVX", "image/png"), name)
    }

    fn generator(base: &str) -> GeminiGenerator {
        GeminiGenerator::new("test-key".into(), "gemini-test".into()).with_endpoint(base)
    }

    #[tokio::test]
    async fn returns_first_inline_image_with_one_call() {
        let (base, seen) = start(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [
                {"text": "here you go"},
                {"inlineData": {"mimeType": "image/png", "data": "RklSU1Q="}},
                {"inlineData": {"mimeType": "image/png", "data": "U0VDT05E"}}
            ]}}]}),
        )
        .await;

        let image = generator(&base).generate(&request("Ana")).await.unwrap();
        assert_eq!(image, CompositeImage::png("RklSU1Q="));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "/gemini-test:generateContent");
        assert_eq!(seen[0].api_key.as_deref(), Some("test-key"));
        let parts = seen[0].body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts[0]["inlineData"]["data"], "T0xE");
        assert_eq!(parts[1]["inlineData"]["data"], "TkVX");
        let prompt = parts[2]["text"].as_str().unwrap();
        assert!(prompt.contains("Ana"));
        assert!(!prompt.contains(NO_TEXT_INSTRUCTION));
    }

    #[tokio::test]
    async fn text_only_response_is_no_image() {
        let reply = json!({"candidates": [{"content": {"parts": [{"text": "sorry"}]}}]});
        let (base, _) = start(StatusCode::OK, reply).await;

        let err = generator(&base).generate(&request("")).await.unwrap_err();
        match err {
            MemoriaError::NoImage { raw } => assert!(raw.is_some()),
            other => panic!("expected NoImage, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn backend_error_carries_message() {
        let reply = json!({"error": {
            "code": 400,
            "message": "API key not valid",
            "status": "INVALID_ARGUMENT"
        }});
        let (base, _) = start(StatusCode::BAD_REQUEST, reply).await;

        let err = generator(&base).generate(&request("")).await.unwrap_err();
        match err {
            MemoriaError::Backend { status, message, raw } => {
                assert_eq!(status, Some(400));
                assert_eq!(message, "API key not valid");
                assert!(raw.is_some());
            }
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_photo_makes_no_call() {
        let (base, seen) = start(StatusCode::OK, json!({})).await;
        let mut req = request("Ana");
        req.recent_photo = None;

        let err = generator(&base).generate(&req).await.unwrap_err();
        assert!(matches!(err, MemoriaError::Validation(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_backend_is_backend_error() {
        // Port 9 (discard) on localhost is not expected to accept connections.
        let err = generator("http://127.0.0.1:9")
            .generate(&request(""))
            .await
            .unwrap_err();
        assert!(matches!(err, MemoriaError::Backend { status: None, .. }));
    }
}
