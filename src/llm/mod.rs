//! Text-generation client module
//!
//! Provides the `GenerateClient` trait the analysis stages call, an Ollama
//! implementation, and a mock for tests.

mod error;
mod ollama;

pub mod client;

pub use client::GenerateClient;
pub use error::LlmError;
pub use ollama::OllamaClient;
