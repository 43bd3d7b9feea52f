//! Ollama text-generation adapter.

use super::{InferenceClient, ModerationUnavailable};
use crate::config::ModerationConfig;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// [`InferenceClient`] calling Ollama's non-streaming generate endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    endpoint: Url,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
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
    /// Builds a client for `config.ollama_host`.
    ///
    /// No request is sent; an unreachable server only shows up on the first
    /// [`InferenceClient::generate`] call.
    ///
    /// # Errors
    ///
    /// Returns [`ModerationUnavailable::InvalidEndpoint`] for an unusable
    /// host and [`ModerationUnavailable::Transport`] when the HTTP client
    /// cannot be built.
    pub fn new(config: &ModerationConfig) -> Result<Self, ModerationUnavailable> {
        let raw = format!("{}/api/generate", config.ollama_host.trim_end_matches('/'));
        let endpoint = Url::parse(&raw).map_err(|_| ModerationUnavailable::InvalidEndpoint(raw))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| ModerationUnavailable::Transport(err.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            model: config.ollama_model.clone(),
            temperature: config.temperature,
        })
    }

    /// Returns the generate endpoint URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn transport_error(err: &reqwest::Error) -> ModerationUnavailable {
    if err.is_timeout() {
        ModerationUnavailable::Timeout
    } else {
        ModerationUnavailable::Transport(err.to_string())
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModerationUnavailable> {
        debug!(model = %self.model, "ollama generate request");
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|err| transport_error(&err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModerationUnavailable::Status {
                status: status.as_u16(),
                body,
            });
        }

        let decoded: GenerateResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                ModerationUnavailable::Timeout
            } else {
                ModerationUnavailable::Decode(err.to_string())
            }
        })?;
        Ok(decoded.response)
    }
}
