// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod presentation;
pub mod repl;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::classifier::{classify, Analysis, ClassificationError};
pub use crate::history::{HistoryLedger, CAPACITY};
pub use crate::sentiment::{LexiconScorer, PolarityScorer, PolarityScores, SentimentLabel};

use tracing::info;

use crate::config::AppConfig;

/// Scorer described by the config: a lexicon file if one is set, else the embedded lexicon.
pub fn build_scorer(cfg: &AppConfig) -> anyhow::Result<LexiconScorer> {
    let scorer = match &cfg.lexicon_path {
        Some(p) => LexiconScorer::from_path(p)?,
        None => LexiconScorer::embedded(),
    };
    info!(
        "lexicon loaded: entries={}, source={}",
        scorer.len(),
        cfg.lexicon_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "embedded".to_string())
    );
    Ok(scorer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_lexicon_file_is_an_error() {
        let cfg = AppConfig {
            lexicon_path: Some(PathBuf::from("definitely/not/here.json")),
            ..AppConfig::default()
        };
        let err = build_scorer(&cfg).unwrap_err();
        assert!(format!("{err:#}").contains("reading lexicon"));
    }

    #[test]
    fn lexicon_file_overrides_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("lex.json");
        std::fs::write(&p, r#"{"zorp": 2.5}"#).unwrap();
        let cfg = AppConfig {
            lexicon_path: Some(p),
            ..AppConfig::default()
        };
        let s = build_scorer(&cfg).unwrap();
        assert_eq!(s.len(), 1);
        assert!(s.score("zorp").compound > 0.0);
    }
}
