//! Text-to-audio model abstraction and its HTTP client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Tokens requested from the model per second of audio.
pub const TOKENS_PER_SECOND: u32 = 256;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout
        } else {
            ModelError::Connection(err.to_string())
        }
    }
}

/// Float waveform as produced by a model, before quantization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWaveform {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

/// A pretrained model that turns a text prompt into audio.
///
/// Implementations hold no state across calls.
#[async_trait]
pub trait TextToAudio: Send + Sync {
    /// Short identifier of the backend kind, e.g. "http".
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    async fn health_check(&self) -> Result<(), ModelError>;

    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<RawWaveform, ModelError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_new_tokens: u32,
    guidance_scale: f32,
    temperature: f32,
    do_sample: bool,
}

/// Client for a model server exposing `POST /generate` and `GET /health`.
pub struct HttpTextToAudio {
    client: Client,
    base_url: String,
    model: String,
}

impl HttpTextToAudio {
    /// # Arguments
    /// * `base_url` - Base URL of the model server (e.g., "http://localhost:5002")
    /// * `model` - Model identifier forwarded with each request
    /// * `timeout_sec` - Generation request timeout in seconds
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_sec: u64,
    ) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .map_err(|e| ModelError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            model: model.into(),
        })
    }
}

#[async_trait]
impl TextToAudio for HttpTextToAudio {
    fn name(&self) -> &str {
        "http"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<(), ModelError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ModelError::Api {
                status: response.status().as_u16(),
                message: "Health check failed".to_string(),
            });
        }
        Ok(())
    }

    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<RawWaveform, ModelError> {
        let url = format!("{}/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            max_new_tokens,
            guidance_scale: 3.0,
            temperature: 1.0,
            do_sample: true,
        };

        debug!(model = %self.model, max_new_tokens, "Sending generation request");

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let waveform: RawWaveform = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("Failed to parse waveform: {}", e)))?;

        if waveform.sample_rate == 0 {
            return Err(ModelError::InvalidResponse(
                "Model returned a zero sample rate".to_string(),
            ));
        }

        debug!(
            samples = waveform.samples.len(),
            sample_rate = waveform.sample_rate,
            "Received waveform"
        );
        Ok(waveform)
    }
}
