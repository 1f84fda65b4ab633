// src/config/mod.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::MAX_SESSIONS;
use crate::presentation::DEFAULT_PREVIEW_CHARS;

pub const ENV_CONFIG_PATH: &str = "SENTIMENT_CONFIG_PATH";
pub const ENV_LEXICON_PATH: &str = "SENTIMENT_LEXICON_PATH";
pub const ENV_PREVIEW_CHARS: &str = "SENTIMENT_PREVIEW_CHARS";
pub const DEFAULT_CONFIG_PATH: &str = "config/sentiment.toml";

fn default_log_filter() -> String {
    "sentiment_ledger=info,warn".to_string()
}
fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}
fn default_metrics() -> bool {
    true
}
fn default_max_sessions() -> usize {
    MAX_SESSIONS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Optional JSON lexicon replacing the embedded one.
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
    /// How many characters of the input the history shows.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// Install the Prometheus recorder and expose `/metrics`.
    #[serde(default = "default_metrics")]
    pub metrics: bool,
    /// Live HTTP sessions kept before the least recently used one is dropped.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            lexicon_path: None,
            preview_chars: default_preview_chars(),
            metrics: default_metrics(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s)?;
        Ok(cfg.sanitized())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&data).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load using env var + fallbacks:
    /// 1) $SENTIMENT_CONFIG_PATH (must exist)
    /// 2) config/sentiment.toml
    /// 3) built-in defaults
    ///
    /// Env overrides ($SENTIMENT_LEXICON_PATH, $SENTIMENT_PREVIEW_CHARS) apply on top.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                anyhow::bail!("{ENV_CONFIG_PATH} points to non-existent path");
            }
            Self::load_from_file(&pb)?
        } else {
            let p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if p.exists() {
                Self::load_from_file(&p)?
            } else {
                Self::default()
            }
        };

        if let Ok(p) = std::env::var(ENV_LEXICON_PATH) {
            if !p.trim().is_empty() {
                cfg.lexicon_path = Some(PathBuf::from(p.trim()));
            }
        }
        if let Some(n) = parse_preview_env(std::env::var(ENV_PREVIEW_CHARS).ok()) {
            cfg.preview_chars = n;
        }

        Ok(cfg.sanitized())
    }

    fn sanitized(mut self) -> Self {
        if self.preview_chars == 0 {
            self.preview_chars = default_preview_chars();
        }
        if self.max_sessions == 0 {
            self.max_sessions = default_max_sessions();
        }
        if self.log_filter.trim().is_empty() {
            self.log_filter = default_log_filter();
        }
        self
    }
}

fn parse_preview_env(v: Option<String>) -> Option<usize> {
    v.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn defaults_fill_missing_keys() {
        let cfg = AppConfig::from_toml_str("metrics = false").unwrap();
        assert!(!cfg.metrics);
        assert_eq!(cfg.preview_chars, 100);
        assert_eq!(cfg.log_filter, "sentiment_ledger=info,warn");
        assert!(cfg.lexicon_path.is_none());
        assert_eq!(cfg.max_sessions, MAX_SESSIONS);
    }

    #[test]
    fn zero_preview_is_sanitized() {
        let cfg = AppConfig::from_toml_str("preview_chars = 0\nmax_sessions = 0\nlog_filter = \"  \"").unwrap();
        assert_eq!(cfg.preview_chars, 100);
        assert_eq!(cfg.max_sessions, MAX_SESSIONS);
        assert_eq!(cfg.log_filter, default_log_filter());
    }

    #[test]
    fn preview_env_parsing() {
        assert_eq!(parse_preview_env(Some(" 40 ".into())), Some(40));
        assert_eq!(parse_preview_env(Some("0".into())), None);
        assert_eq!(parse_preview_env(Some("abc".into())), None);
        assert_eq!(parse_preview_env(None), None);
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Izoluj CWD do temp složky, aby nerušil reálný config/ v repo
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_LEXICON_PATH);
        env::remove_var(ENV_PREVIEW_CHARS);

        // Bez souborů → defaulty
        assert_eq!(AppConfig::load_default().unwrap(), AppConfig::default());

        // Env má přednost
        let p = tmp.path().join("custom.toml");
        fs::write(&p, "preview_chars = 12\nmetrics = false").unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        env::set_var(ENV_PREVIEW_CHARS, "7");
        let cfg = AppConfig::load_default().unwrap();
        assert_eq!(cfg.preview_chars, 7);
        assert!(!cfg.metrics);

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(AppConfig::load_default().is_err());

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_PREVIEW_CHARS);
        env::set_current_dir(&old).unwrap();
    }
}
