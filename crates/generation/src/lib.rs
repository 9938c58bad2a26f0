//! Client for the remote reply-generation service.
//!
//! One POST endpoint per platform, bearer-token auth, JSON in and out. The
//! credential and reply preferences come from the preference store on every
//! call; nothing is cached between activations.

pub mod client;
pub mod config;
pub mod errors;

pub use client::{GenerationClient, GenerationSession};
pub use config::GenerationConfig;
pub use errors::GenerationError;
