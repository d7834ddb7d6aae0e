//! Language-model backends for the planning loop.

mod ollama;

pub use ollama::{OllamaConfig, OllamaProvider};
