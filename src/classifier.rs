//! # Classifier
//! Pure mapping `(text, scores)` → [`Analysis`]. No I/O, no ledger access.
//!
//! Thresholds are closed on the outside: `compound >= 0.05` is Positive,
//! `compound <= -0.05` is Negative, anything strictly between is Neutral.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sentiment::{PolarityScores, SentimentLabel};

pub const POSITIVE_THRESHOLD: f32 = 0.05;
pub const NEGATIVE_THRESHOLD: f32 = -0.05;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    /// Trimmed input had zero length.
    #[error("empty input provided")]
    EmptyInput,
}

/// One classification outcome. Immutable once built; moves into the ledger on insert.
/// Built only by [`classify`] / [`classify_at`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    text: String,
    scores: PolarityScores,
    label: SentimentLabel,
    timestamp: DateTime<Utc>,
}

impl Analysis {
    /// Original input as supplied by the caller (not trimmed).
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scores(&self) -> &PolarityScores {
        &self.scores
    }

    pub fn label(&self) -> SentimentLabel {
        self.label
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Threshold rule on its own. NaN fails both comparisons and lands on Neutral.
pub fn label_for(compound: f32) -> SentimentLabel {
    if compound >= POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if compound <= NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Fails early on whitespace-only text so callers can skip the scorer entirely.
pub fn ensure_non_empty(text: &str) -> Result<(), ClassificationError> {
    if text.trim().is_empty() {
        return Err(ClassificationError::EmptyInput);
    }
    Ok(())
}

pub fn classify(text: &str, scores: PolarityScores) -> Result<Analysis, ClassificationError> {
    classify_at(text, scores, Utc::now())
}

/// Same as [`classify`] with an explicit timestamp.
pub fn classify_at(
    text: &str,
    scores: PolarityScores,
    at: DateTime<Utc>,
) -> Result<Analysis, ClassificationError> {
    ensure_non_empty(text)?;
    Ok(Analysis {
        text: text.to_string(),
        label: label_for(scores.compound),
        scores,
        timestamp: at,
    })
}
