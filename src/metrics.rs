use axum::{routing::get, Router};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::history::CAPACITY;
use crate::sentiment::SentimentLabel;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if a recorder is already set.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;

        // Static gauge so the exported ledger size is visible next to the counters.
        metrics::gauge!("sentiment_ledger_capacity").set(CAPACITY as f64);

        Ok(Self { handle })
    }
}

/// Router exposing `/metrics` in the Prometheus exposition format.
pub fn router_for<S>(handle: PrometheusHandle) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/metrics",
        get(move || {
            let h = handle.clone();
            async move { h.render() }
        }),
    )
}

// Without an installed recorder these are no-ops, so unit tests can call them freely.

pub fn record_analysis(label: SentimentLabel) {
    counter!("sentiment_analyses_total", "label" => label.as_str()).increment(1);
}

pub fn record_rejection() {
    counter!("sentiment_empty_input_rejections_total").increment(1);
}

pub fn record_clear() {
    counter!("sentiment_ledger_clears_total").increment(1);
}
