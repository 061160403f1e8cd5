//! HTTP invoker for an Ollama server's `/api/generate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use polarity_ai::{InvocationError, ModelInvoker};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Where a local Ollama server listens by default.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Non-streaming completion client for Ollama.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Create a client for the given Ollama base URL.
    ///
    /// `base_url` should be like `http://localhost:11434` (a trailing slash is
    /// trimmed). `timeout` bounds each whole request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            temperature: None,
        })
    }

    /// Sampling temperature sent with every request (server default when unset).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_error(&self, e: reqwest::Error) -> InvocationError {
        if e.is_timeout() {
            InvocationError::Timeout(self.timeout)
        } else {
            InvocationError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl ModelInvoker for OllamaClient {
    async fn invoke(&self, model: &str, prompt: &str) -> Result<String, InvocationError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: self
                .temperature
                .map(|temperature| GenerateOptions { temperature }),
        };

        debug!(url = %url, model, prompt_len = prompt.len(), "sending generate request");
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InvocationError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| InvocationError::Malformed(format!("{e}: {}", preview(&body))))?;
        Ok(parsed.response)
    }
}

/// First 200 characters of a body, for error messages.
fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((cut, _)) => &body[..cut],
        None => body,
    }
}
