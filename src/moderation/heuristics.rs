//! Deterministic fallback classifier.

use super::{ModerationVerdict, VerdictSource};

/// Terms that reject a message when they occur anywhere in it, including
/// inside longer words.
pub const PROHIBITED_TERMS: [&str; 21] = [
    "damn", "hell", "shit", "fuck", "bitch", "asshole", "bastard", "crap", "piss", "whore",
    "slut", "faggot", "nigger", "retard", "stupid", "idiot", "moron", "dumb", "hate", "kill",
    "die",
];

const PROHIBITED_CONFIDENCE: f64 = 0.2;
const SHOUTING_CONFIDENCE: f64 = 0.4;
const CLEAN_CONFIDENCE: f64 = 0.9;

/// Texts this short are never treated as shouting.
const SHOUTING_MIN_CHARS: usize = 10;

/// Classifies `text` without any external service.
///
/// Rules apply in order: any prohibited term occurring in the lower-cased
/// text rejects (matched terms listed in [`PROHIBITED_TERMS`] order), so
/// "hated" and "killing" are caught along with "hello" and "studied";
/// otherwise more than 70% uppercase characters in a text longer than ten
/// characters rejects; otherwise the text is accepted.
#[must_use]
pub fn fallback_verdict(text: &str) -> ModerationVerdict {
    let matched = prohibited_terms_in(text);
    if !matched.is_empty() {
        return verdict(
            false,
            format!("Content contains prohibited words: {}", matched.join(", ")),
            PROHIBITED_CONFIDENCE,
        );
    }
    if is_shouting(text) {
        return verdict(
            false,
            "Content contains excessive capitalization".to_owned(),
            SHOUTING_CONFIDENCE,
        );
    }
    verdict(
        true,
        "Content appears appropriate".to_owned(),
        CLEAN_CONFIDENCE,
    )
}

fn prohibited_terms_in(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    PROHIBITED_TERMS
        .iter()
        .copied()
        .filter(|term| lowered.contains(term))
        .collect()
}

fn is_shouting(text: &str) -> bool {
    let total = text.chars().count();
    if total <= SHOUTING_MIN_CHARS {
        return false;
    }
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    // upper / total > 0.7
    upper.saturating_mul(10) > total.saturating_mul(7)
}

const fn verdict(is_clean: bool, explanation: String, confidence: f64) -> ModerationVerdict {
    ModerationVerdict {
        is_clean,
        explanation,
        confidence,
        source: VerdictSource::Fallback,
    }
}
