//! Inference port used by the primary moderation stage.

use async_trait::async_trait;
use thiserror::Error;

/// Reasons the inference stage could not produce a response.
///
/// Always absorbed by the moderator, which falls back to the heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModerationUnavailable {
    /// No inference client was initialised.
    #[error("no inference client is configured")]
    NotInitialized,

    /// The configured endpoint is not a usable URL.
    #[error("invalid inference endpoint {0}")]
    InvalidEndpoint(String),

    /// The request could not be sent or the connection failed.
    #[error("inference transport failure: {0}")]
    Transport(String),

    /// The request exceeded its deadline.
    #[error("inference request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("inference service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response envelope could not be decoded.
    #[error("undecodable inference response: {0}")]
    Decode(String),
}

/// Text-generation backend asked to classify content.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Sends `prompt` and returns the raw completion text.
    ///
    /// # Errors
    ///
    /// Returns [`ModerationUnavailable`] when no completion is obtained.
    async fn generate(&self, prompt: &str) -> Result<String, ModerationUnavailable>;
}
