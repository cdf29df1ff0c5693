//! Live adapters that talk to the network.

pub mod gemini;
pub mod relay;
