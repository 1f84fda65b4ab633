//! Sentiment service — binary entrypoint.
//! Boots the Axum HTTP server with per-session history ledgers.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};

use sentiment_ledger::api::{self, AppState};
use sentiment_ledger::config::AppConfig;
use sentiment_ledger::logging::init_tracing;
use sentiment_ledger::metrics::Metrics;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    let cfg = AppConfig::load_default()?;
    init_tracing(&cfg.log_filter);

    let scorer = sentiment_ledger::build_scorer(&cfg)?;

    let metrics = if cfg.metrics {
        match Metrics::init() {
            Ok(m) => Some(m.handle),
            Err(e) => {
                warn!(error = %e, "metrics disabled");
                None
            }
        }
    } else {
        None
    };

    let state = AppState::new(Arc::new(scorer), cfg.preview_chars)
        .with_session_limit(cfg.max_sessions);
    let router = api::router(state, metrics);
    info!(
        preview_chars = cfg.preview_chars,
        max_sessions = cfg.max_sessions,
        "sentiment service ready"
    );

    Ok(router.into())
}
