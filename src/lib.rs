//! Memoria - embrace portraits from a childhood photo and a recent photo.
//!
//! Two photos of the same person and an optional caption go in; one
//! composite from the Gemini image backend comes out, either by calling the
//! backend directly or through the credential-holding relay in [`server`].

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod model;
pub mod nonce;
pub mod output;
pub mod photo;
pub mod ports;
pub mod print;
pub mod prompt;
pub mod request;
pub mod server;
pub mod session;
