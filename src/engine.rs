//! # Analysis Engine
//! The request path in one place: guard → score → classify → record.
//!
//! Empty text is rejected before the scorer runs; scorer errors are passed
//! through untouched. The ledger is only touched once a label exists.

use tracing::{debug, warn};

use crate::classifier::{self, Analysis, ClassificationError};
use crate::history::HistoryLedger;
use crate::metrics;
use crate::sentiment::PolarityScorer;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error("scorer '{scorer}' failed: {cause:#}")]
    Scorer {
        scorer: &'static str,
        cause: anyhow::Error,
    },
}

impl AnalyzeError {
    pub fn is_empty_input(&self) -> bool {
        matches!(
            self,
            AnalyzeError::Classification(ClassificationError::EmptyInput)
        )
    }
}

/// Score and classify without touching any ledger.
pub fn evaluate(scorer: &dyn PolarityScorer, text: &str) -> Result<Analysis, AnalyzeError> {
    if let Err(e) = classifier::ensure_non_empty(text) {
        metrics::record_rejection();
        warn!("rejected empty input");
        return Err(e.into());
    }

    let scores = scorer
        .polarity_scores(text)
        .map_err(|cause| AnalyzeError::Scorer {
            scorer: scorer.name(),
            cause,
        })?;

    let analysis = classifier::classify(text, scores)?;
    debug!(
        label = %analysis.label(),
        compound = analysis.scores().compound,
        scorer = scorer.name(),
        "classified"
    );
    metrics::record_analysis(analysis.label());
    Ok(analysis)
}

/// Full request: evaluate, then prepend to `ledger`. Returns the fresh analysis.
pub fn analyze(
    scorer: &dyn PolarityScorer,
    ledger: &mut HistoryLedger,
    text: &str,
) -> Result<Analysis, AnalyzeError> {
    let analysis = evaluate(scorer, text)?;
    ledger.insert(analysis.clone());
    Ok(analysis)
}
