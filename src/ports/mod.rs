//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system. Implementations live in `src/adapters/`.

pub mod composite_generator;

pub use composite_generator::{CompositeGenerator, CompositeImage, GenerateFuture};
