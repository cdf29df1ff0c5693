//! Recording adapter: delegates to a live generator and captures outcomes.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;
use crate::ports::composite_generator::{CompositeGenerator, GenerateFuture};
use crate::request::GenerationRequest;

/// What a cassette keeps of a request: never the photo bytes.
#[derive(Debug, Serialize)]
pub struct RecordedInput {
    /// Caption name as submitted.
    pub name: String,
    /// MIME type of the old photo, if present.
    pub old_photo: Option<String>,
    /// MIME type of the recent photo, if present.
    pub recent_photo: Option<String>,
}

impl From<&GenerationRequest> for RecordedInput {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            name: request.name.clone(),
            old_photo: request.old_photo.as_ref().map(|p| p.mime_type.clone()),
            recent_photo: request.recent_photo.as_ref().map(|p| p.mime_type.clone()),
        }
    }
}

/// Wraps another generator and records each call into a shared recorder.
pub struct RecordingGenerator {
    inner: Box<dyn CompositeGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingGenerator {
    /// Wrap `inner`, recording into `recorder`.
    pub fn new(
        inner: Box<dyn CompositeGenerator>,
        recorder: Arc<Mutex<CassetteRecorder>>,
    ) -> Self {
        Self { inner, recorder }
    }
}

impl CompositeGenerator for RecordingGenerator {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let input = RecordedInput::from(request);
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.generate(&request).await;
            self.recorder
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .record("composite_generator", "generate", &input, &result);
            result
        })
    }
}
