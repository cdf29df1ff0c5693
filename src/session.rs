//! The form → loading → result → print flow around one generator.
//!
//! A [`Session`] owns every piece of user-visible state. Generation takes
//! `&mut self`, so a second submission cannot start while one is in flight.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::MemoriaError;
use crate::photo::{encode_file, PhotoPayload};
use crate::ports::{CompositeGenerator, CompositeImage};
use crate::request::GenerationRequest;

/// Shown when generation fails for any reason.
pub const GENERATION_FAILED: &str = "The image could not be generated. Please try again.";
/// Shown when the childhood photo cannot be read.
pub const OLD_PHOTO_FAILED: &str = "There was an error processing the old photo.";
/// Shown when the recent photo cannot be read.
pub const RECENT_PHOTO_FAILED: &str = "There was an error processing the recent photo.";

/// Which screen the flow is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    /// Collecting photos and the optional name.
    #[default]
    Form,
    /// A generation call is in flight.
    Loading,
    /// The composite is ready.
    Result,
    /// Print fulfillment instructions for the composite.
    Print,
}

/// Which of the two photo slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSlot {
    /// The childhood photo.
    Old,
    /// The recent adult photo.
    Recent,
}

/// View state for one user session. Nothing here outlives the process.
#[derive(Debug, Default)]
pub struct Session {
    old_photo: Option<PhotoPayload>,
    recent_photo: Option<PhotoPayload>,
    name: String,
    image: Option<CompositeImage>,
    error: Option<String>,
    view: View,
}

impl Session {
    /// A fresh session on the form view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current view.
    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    /// The last error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The generated composite, once available.
    #[must_use]
    pub fn image(&self) -> Option<&CompositeImage> {
        self.image.as_ref()
    }

    /// The caption name as typed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The photo held in `slot`.
    #[must_use]
    pub fn photo(&self, slot: PhotoSlot) -> Option<&PhotoPayload> {
        match slot {
            PhotoSlot::Old => self.old_photo.as_ref(),
            PhotoSlot::Recent => self.recent_photo.as_ref(),
        }
    }

    /// Put an already-encoded photo into `slot`.
    pub fn set_photo(&mut self, slot: PhotoSlot, photo: PhotoPayload) {
        match slot {
            PhotoSlot::Old => self.old_photo = Some(photo),
            PhotoSlot::Recent => self.recent_photo = Some(photo),
        }
    }

    /// Encode the file at `path` into `slot`.
    ///
    /// On failure the slot is left unchanged and a per-slot message is set;
    /// the view does not change.
    pub async fn upload(&mut self, slot: PhotoSlot, path: &Path) -> Result<(), MemoriaError> {
        match encode_file(path).await {
            Ok(photo) => {
                debug!(?slot, mime = %photo.mime_type, "photo encoded");
                self.set_photo(slot, photo);
                Ok(())
            }
            Err(e) => {
                warn!(?slot, error = %e, "photo could not be encoded");
                let message = match slot {
                    PhotoSlot::Old => OLD_PHOTO_FAILED,
                    PhotoSlot::Recent => RECENT_PHOTO_FAILED,
                };
                self.error = Some(message.to_string());
                Err(e)
            }
        }
    }

    /// Set the optional caption name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Whether the submit affordance is available.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.view == View::Form && self.old_photo.is_some() && self.recent_photo.is_some()
    }

    /// Run one generation.
    ///
    /// Refused without any call unless [`Session::can_submit`]. Otherwise the
    /// view passes through `Loading` and lands on `Result` (image set) or back
    /// on `Form` (error message set).
    ///
    /// # Errors
    ///
    /// Returns the validation error for a refused submission, or the
    /// generator's error after the session has returned to `Form`.
    pub async fn submit(&mut self, generator: &dyn CompositeGenerator) -> Result<(), MemoriaError> {
        if !self.can_submit() {
            return Err(MemoriaError::photos_required());
        }
        let request = GenerationRequest {
            old_photo: self.old_photo.clone(),
            recent_photo: self.recent_photo.clone(),
            name: self.name.clone(),
        };

        self.error = None;
        self.view = View::Loading;

        match generator.generate(&request).await {
            Ok(image) => {
                self.image = Some(image);
                self.view = View::Result;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "generation failed");
                self.error = Some(GENERATION_FAILED.to_string());
                self.view = View::Form;
                Err(e)
            }
        }
    }

    /// Move from the result to the print hand-off.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Validation`] unless the view is `Result`.
    pub fn choose_print(&mut self) -> Result<(), MemoriaError> {
        if self.view != View::Result {
            return Err(MemoriaError::Validation(
                "printing is only available once an image has been generated".to_string(),
            ));
        }
        self.view = View::Print;
        Ok(())
    }

    /// Clear photos, name, image and error and return to the form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
