//! Prompt construction and completion parsing for the inference stage.

use super::{ModerationVerdict, VerdictSource};
use serde::Deserialize;

/// Words in an unstructured completion that mark the text as not clean.
const NEGATIVE_SIGNALS: [&str; 6] = [
    "inappropriate",
    "offensive",
    "profanity",
    "vulgar",
    "hate",
    "toxic",
];

const DEFAULT_EXPLANATION: &str = "Content analysis complete";

/// Completion object as models actually return it. Older prompts asked for
/// `message` and `score`; those keys win when both spellings are present.
#[derive(Debug, Deserialize)]
struct InferencePayload {
    #[serde(default = "default_is_clean")]
    is_clean: bool,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    score: Option<f64>,
}

const fn default_is_clean() -> bool {
    true
}

/// Builds the classification instruction sent to the model.
#[must_use]
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"You are a content moderator. Analyze the following text for:
1. Profanity and vulgar language
2. Hate speech or discriminatory content
3. Spam or inappropriate promotional content
4. Overall tone and professionalism

Text to analyze: "{text}"

Respond with a JSON object containing:
- "is_clean": boolean (true if content is appropriate)
- "explanation": string (explanation of the decision)
- "confidence": float (0-1, where 1 is completely clean)

JSON Response:
"#
    )
}

/// Turns a raw model completion into a verdict.
///
/// The outermost `{...}` span is decoded as JSON; absent keys take their
/// defaults and the confidence is clamped into `[0, 1]`. A completion with no
/// decodable object is scanned for negative signal words instead.
#[must_use]
pub fn parse_inference_response(raw: &str) -> ModerationVerdict {
    decode_payload(raw).unwrap_or_else(|| keyword_verdict(raw))
}

fn decode_payload(raw: &str) -> Option<ModerationVerdict> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    let span = raw.get(start..=end)?;
    let payload: InferencePayload = serde_json::from_str(span).ok()?;
    let explanation = payload
        .message
        .or(payload.explanation)
        .unwrap_or_else(|| DEFAULT_EXPLANATION.to_owned());
    let confidence = payload.score.or(payload.confidence).unwrap_or_default();
    Some(ModerationVerdict {
        is_clean: payload.is_clean,
        explanation,
        confidence: confidence.clamp(0.0, 1.0),
        source: VerdictSource::Inference,
    })
}

fn keyword_verdict(raw: &str) -> ModerationVerdict {
    let lowered = raw.to_lowercase();
    let flagged = NEGATIVE_SIGNALS
        .iter()
        .any(|signal| lowered.contains(signal));
    let (explanation, confidence) = if flagged {
        ("Content may contain inappropriate material", 0.1)
    } else {
        ("Content reviewed", 0.9)
    };
    ModerationVerdict {
        is_clean: !flagged,
        explanation: explanation.to_owned(),
        confidence,
        source: VerdictSource::Inference,
    }
}
