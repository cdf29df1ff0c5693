//! Replaying adapter: serves recorded outcomes instead of calling out.

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::composite_generator::{CompositeGenerator, CompositeImage, GenerateFuture};
use crate::request::GenerationRequest;

/// Answers `generate` from a cassette, after the same photo validation a
/// live generator performs.
pub struct ReplayingGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingGenerator {
    /// Create a replaying generator backed by `replayer`.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl CompositeGenerator for ReplayingGenerator {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let outcome = request.validate().and_then(|()| {
            self.replayer
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .next_result::<CompositeImage>("composite_generator", "generate")
        });
        Box::pin(async move { outcome })
    }
}
