//! Moderation pipeline combining the inference and fallback stages.

use super::{
    InferenceClient, ModerationUnavailable, ModerationVerdict, OllamaClient, build_prompt,
    fallback_verdict, parse_inference_response,
};
use crate::config::ModerationConfig;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Content moderator shared across requests.
///
/// Holds at most one inference client and no per-call state.
#[derive(Clone)]
pub struct ContentModerator {
    client: Option<Arc<dyn InferenceClient>>,
}

impl ContentModerator {
    /// Initialises the Ollama-backed moderator.
    ///
    /// Never fails: when the client cannot be built the error is logged and
    /// the moderator runs in fallback-only mode.
    #[must_use]
    pub fn initialize(config: &ModerationConfig) -> Self {
        OllamaClient::new(config).map_or_else(
            |err| {
                error!(error = %err, host = %config.ollama_host, "failed to initialise inference client; fallback moderation only");
                Self::fallback_only()
            },
            |client| {
                info!(model = %config.ollama_model, endpoint = %client.endpoint(), "inference moderation initialised");
                Self::with_client(Arc::new(client))
            },
        )
    }

    /// Creates a moderator over an arbitrary inference client.
    #[must_use]
    pub const fn with_client(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Creates a moderator that only applies the fallback heuristic.
    #[must_use]
    pub const fn fallback_only() -> Self {
        Self { client: None }
    }

    /// Reports whether the inference stage is available.
    #[must_use]
    pub const fn has_inference(&self) -> bool {
        self.client.is_some()
    }

    /// Classifies `text`.
    ///
    /// Any inference failure is logged and answered by
    /// [`fallback_verdict`]; callers always receive a verdict.
    pub async fn moderate(&self, text: &str) -> ModerationVerdict {
        let verdict = self.classify(text).await.unwrap_or_else(|err| {
            warn!(error = %err, "inference moderation unavailable; applying fallback");
            fallback_verdict(text)
        });
        debug!(
            is_clean = verdict.is_clean,
            confidence = verdict.confidence,
            source = %verdict.source,
            "moderation verdict"
        );
        verdict
    }

    async fn classify(&self, text: &str) -> Result<ModerationVerdict, ModerationUnavailable> {
        let client = self
            .client
            .as_ref()
            .ok_or(ModerationUnavailable::NotInitialized)?;
        let raw = client.generate(&build_prompt(text)).await?;
        Ok(parse_inference_response(&raw))
    }
}
