//! Moderation outcome types.

use serde::Serialize;
use std::fmt;

/// Pipeline stage that produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    /// The inference model classified the text.
    Inference,
    /// The deterministic heuristic classified the text.
    Fallback,
}

impl VerdictSource {
    /// Returns the stage name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inference => "inference",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for VerdictSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clean or not-clean decision for a piece of text.
///
/// `confidence` lies in `[0, 1]`, higher meaning more confident the content
/// is acceptable. It is advisory: nothing thresholds on it. Verdicts are
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModerationVerdict {
    /// Whether the text may be accepted.
    pub is_clean: bool,
    /// Human-readable reason for the decision.
    pub explanation: String,
    /// Advisory confidence in `[0, 1]`.
    pub confidence: f64,
    /// Stage that produced the verdict.
    pub source: VerdictSource,
}
