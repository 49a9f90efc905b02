//! Gemini-backed implementations of the core's collaborator traits:
//! query embedding and grounded answer generation over HTTP.

pub mod client;
pub mod prompt;

pub use client::GeminiClient;
