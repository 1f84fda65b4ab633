use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post},
    Form, Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::classifier::Analysis;
use crate::engine::{self, AnalyzeError};
use crate::history::HistoryLedger;
use crate::metrics;
use crate::presentation::{render_page, AnalysisView, DEFAULT_PREVIEW_CHARS};
use crate::sentiment::{LexiconScorer, PolarityScorer};

pub const SESSION_HEADER: &str = "x-session-id";
pub const DEFAULT_SESSION: &str = "default";

/// Upper bound on live sessions; the least recently used one is dropped past it.
pub const MAX_SESSIONS: usize = 1024;

type SharedLedger = Arc<Mutex<HistoryLedger>>;

struct Session {
    ledger: SharedLedger,
    last_used: u64,
}

#[derive(Default)]
struct Sessions {
    map: HashMap<String, Session>,
    // monotonic use counter, cheaper and more deterministic than Instant
    tick: u64,
}

/// Session id → ledger. One lock for the map, one lock per ledger.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<Sessions>>,
    max: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limit(MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Sessions::default())),
            max: max.max(1),
        }
    }

    /// Ledger for `id`, created empty on first use. Evicts the least recently
    /// used session when the store is full.
    pub fn ledger(&self, id: &str) -> SharedLedger {
        let mut s = self.inner.lock().expect("session map mutex poisoned");
        s.tick += 1;
        let tick = s.tick;

        if let Some(sess) = s.map.get_mut(id) {
            sess.last_used = tick;
            return sess.ledger.clone();
        }

        if s.map.len() >= self.max {
            let oldest = s
                .map
                .iter()
                .min_by_key(|(_, sess)| sess.last_used)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                s.map.remove(&k);
                info!(session = %k, "session evicted");
            }
        }

        info!(session = id, "session started");
        let ledger = Arc::new(Mutex::new(HistoryLedger::new()));
        s.map.insert(
            id.to_string(),
            Session {
                ledger: ledger.clone(),
                last_used: tick,
            },
        );
        ledger
    }

    /// Existing ledger only; never creates one.
    pub fn get(&self, id: &str) -> Option<SharedLedger> {
        let mut s = self.inner.lock().expect("session map mutex poisoned");
        s.tick += 1;
        let tick = s.tick;
        s.map.get_mut(id).map(|sess| {
            sess.last_used = tick;
            sess.ledger.clone()
        })
    }

    /// Drop the session's ledger. Returns false if there was none.
    pub fn end(&self, id: &str) -> bool {
        let mut s = self.inner.lock().expect("session map mutex poisoned");
        let removed = s.map.remove(id).is_some();
        if removed {
            info!(session = id, "session ended");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("session map mutex poisoned")
            .map
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
pub struct AppState {
    scorer: Arc<dyn PolarityScorer>,
    sessions: SessionStore,
    preview_chars: usize,
}

impl AppState {
    pub fn new(scorer: Arc<dyn PolarityScorer>, preview_chars: usize) -> Self {
        Self {
            scorer,
            sessions: SessionStore::new(),
            preview_chars: preview_chars.max(1),
        }
    }

    pub fn with_session_limit(mut self, max_sessions: usize) -> Self {
        self.sessions = SessionStore::with_limit(max_sessions);
        self
    }

    /// Embedded lexicon, default preview width. Handy for tests.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(LexiconScorer::embedded()), DEFAULT_PREVIEW_CHARS)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn view_all(&self, ledger: &HistoryLedger) -> Vec<AnalysisView> {
        ledger
            .entries()
            .iter()
            .map(|a| AnalysisView::from_analysis(a, self.preview_chars))
            .collect()
    }
}

pub fn router(state: AppState, prometheus: Option<PrometheusHandle>) -> Router {
    let app = Router::new()
        .route("/", get(index).post(submit_form))
        .route("/clear", post(clear_form))
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/history", get(history).delete(clear_history))
        .route("/session", delete(end_session))
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    match prometheus {
        Some(handle) => app.merge(metrics::router_for(handle)),
        None => app,
    }
}

fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    text: String,
}

#[derive(serde::Serialize)]
struct AnalyzeResp {
    result: AnalysisView,
    history: Vec<AnalysisView>,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

struct ApiError(AnalyzeError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_empty_input() {
            StatusCode::BAD_REQUEST
        } else {
            error!(error = %self.0, "analysis failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<AnalyzeResp>, ApiError> {
    // Session is only created once there is something to record.
    let analysis = engine::evaluate(state.scorer.as_ref(), &body.text).map_err(ApiError)?;

    let ledger = state.sessions.ledger(&session_id(&headers));
    let mut guard = ledger.lock().expect("history mutex poisoned");
    guard.insert(analysis.clone());

    Ok(Json(AnalyzeResp {
        result: AnalysisView::from_analysis(&analysis, state.preview_chars),
        history: state.view_all(&guard),
    }))
}

async fn history(State(state): State<AppState>, headers: HeaderMap) -> Json<Vec<AnalysisView>> {
    let sid = session_id(&headers);
    let rows = match state.sessions.get(&sid) {
        Some(ledger) => {
            let guard = ledger.lock().expect("history mutex poisoned");
            state.view_all(&guard)
        }
        None => Vec::new(),
    };
    Json(rows)
}

async fn clear_history(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let sid = session_id(&headers);
    if let Some(ledger) = state.sessions.get(&sid) {
        ledger.lock().expect("history mutex poisoned").clear();
        metrics::record_clear();
    }
    StatusCode::NO_CONTENT
}

async fn end_session(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    state.sessions.end(&session_id(&headers));
    StatusCode::NO_CONTENT
}

fn session_entries(state: &AppState, sid: &str) -> Vec<Analysis> {
    match state.sessions.get(sid) {
        Some(ledger) => ledger.lock().expect("history mutex poisoned").entries(),
        None => Vec::new(),
    }
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let entries = session_entries(&state, &session_id(&headers));
    Html(render_page(None, &entries, state.preview_chars, None))
}

#[derive(serde::Deserialize)]
struct PageForm {
    #[serde(default)]
    text: String,
}

/// Browser form: analyse, record, re-render the page with the result card.
async fn submit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<PageForm>,
) -> (StatusCode, Html<String>) {
    let sid = session_id(&headers);
    match engine::evaluate(state.scorer.as_ref(), &form.text) {
        Ok(analysis) => {
            let ledger = state.sessions.ledger(&sid);
            let entries = {
                let mut guard = ledger.lock().expect("history mutex poisoned");
                guard.insert(analysis.clone());
                guard.entries()
            };
            (
                StatusCode::OK,
                Html(render_page(
                    Some(&analysis),
                    &entries,
                    state.preview_chars,
                    None,
                )),
            )
        }
        Err(e) => {
            let (status, notice) = if e.is_empty_input() {
                (
                    StatusCode::BAD_REQUEST,
                    "Please enter some text to analyze.".to_string(),
                )
            } else {
                error!(error = %e, "analysis failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            };
            let entries = session_entries(&state, &sid);
            (
                status,
                Html(render_page(
                    None,
                    &entries,
                    state.preview_chars,
                    Some(&notice),
                )),
            )
        }
    }
}

async fn clear_form(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if let Some(ledger) = state.sessions.get(&session_id(&headers)) {
        ledger.lock().expect("history mutex poisoned").clear();
        metrics::record_clear();
    }
    Redirect::to("/")
}
