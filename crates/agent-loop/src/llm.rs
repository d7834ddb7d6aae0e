//! The language-model collaborator contract.
//!
//! Providers turn a prompt into free text; nothing about well-formedness
//! is guaranteed, so all structure is recovered downstream in [`crate::parse`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a completion request.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Request(String),

    #[error("llm returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("llm request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The provider cannot serve this request shape at all.
    #[error("unsupported llm request: {0}")]
    Unsupported(String),
}

impl LlmError {
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }
}

/// Abstraction over LLM backends so multiple vendors can plug into the
/// planning loop.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// One prompt in, the raw completion text out.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Vision variant carrying one base64-encoded screenshot. Providers
    /// without a vision model reject it.
    async fn complete_with_image(&self, prompt: &str, image_b64: &str) -> Result<String, LlmError> {
        let _ = (prompt, image_b64);
        Err(LlmError::Unsupported(
            "this provider has no vision model".into(),
        ))
    }
}

/// Scripted provider for tests and offline development: responses are
/// consumed in push order, prompts are recorded for assertions, and an
/// exhausted script errors.
#[derive(Debug, Default)]
pub struct MockLlmProvider {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for response in responses {
            provider.push_response(response);
        }
        provider
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push_back(response.into());
    }

    /// Every prompt received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::request("mock responses exhausted"))
    }
}
