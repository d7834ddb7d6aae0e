//! Client for a local Ollama server.
//!
//! Talks to the plain completion endpoint with streaming disabled, so the
//! reply arrives as one JSON object whose `response` field carries the text.

use std::time::Duration;

use agent_loop::{LlmError, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmSettings;

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    /// Model for requests that carry a screenshot; `None` rejects them.
    pub vision_model: Option<String>,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5:7b".to_string(),
            vision_model: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl From<&LlmSettings> for OllamaConfig {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            vision_model: settings.vision_model.clone(),
            timeout: settings.timeout(),
        }
    }
}

pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| LlmError::request(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        images: Vec<String>,
    ) -> Result<String, LlmError> {
        let url = generate_endpoint(&self.config.base_url);
        let body = GenerateRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
            images,
        };

        let response = self.client.post(&url).json(&body).send().await.map_err(|err| {
            if err.is_timeout() {
                LlmError::Timeout {
                    seconds: self.config.timeout.as_secs(),
                }
            } else {
                LlmError::request(format!("ollama request failed: {err}"))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            return Err(LlmError::Status { status, body });
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|err| LlmError::request(format!("ollama response invalid: {err}")))?;
        debug!(
            target: "pagepilot::llm",
            model,
            chars = reply.response.len(),
            "completion received"
        );
        Ok(reply.response)
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate(&self.config.model, prompt, Vec::new()).await
    }

    async fn complete_with_image(&self, prompt: &str, image_b64: &str) -> Result<String, LlmError> {
        let model = self
            .config
            .vision_model
            .as_deref()
            .ok_or_else(|| LlmError::Unsupported("no vision model configured".into()))?
            .to_string();
        self.generate(&model, prompt, vec![image_b64.to_string()])
            .await
    }
}

fn generate_endpoint(base_url: &str) -> String {
    format!("{}/api/generate", base_url.trim_end_matches('/'))
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}
