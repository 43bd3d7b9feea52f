//! Two-stage content moderation for submitted messages.
//!
//! A message is first classified by an inference model reached through the
//! [`InferenceClient`] port. When no client is available, or the call fails
//! for any reason, a deterministic word-list heuristic decides instead. The
//! moderator never fails: every call yields a [`ModerationVerdict`].
//!
//! Verdicts are a best-effort filter, not a security boundary.

mod heuristics;
mod ollama;
mod parser;
mod ports;
mod service;
mod verdict;

pub use heuristics::{PROHIBITED_TERMS, fallback_verdict};
pub use ollama::OllamaClient;
pub use parser::{build_prompt, parse_inference_response};
pub use ports::{InferenceClient, ModerationUnavailable};
pub use service::ContentModerator;
pub use verdict::{ModerationVerdict, VerdictSource};

#[cfg(test)]
mod tests;
