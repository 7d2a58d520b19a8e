use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use nf_core::time::now_iso8601;
use nf_core::{DEFAULT_RECENT_COUNT, RawSample, SessionStatus, StreamEngine};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const SERVICE_NAME: &str = "EEG Processor";

#[derive(Clone)]
pub struct AppState {
    engine: Arc<Mutex<StreamEngine>>,
}

impl AppState {
    pub fn new(engine: StreamEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }
}

/// JSON error body: `{"error": "..."}`.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult = std::result::Result<Json<Value>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/eeg/data", post(receive_data))
        .route("/api/eeg/session/start", post(start_session))
        .route("/api/eeg/session/end", post(end_session))
        .route("/api/eeg/session/status", get(session_status))
        .route("/api/eeg/feedback/recent", get(recent_feedback))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, engine: StreamEngine) -> Result<()> {
    let app = router(AppState::new(engine));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    // Handlers must be in place before readiness is reported.
    let shutdown = shutdown_signal()?;
    tracing::info!("starting EEG processor on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;
    tracing::info!("EEG processor stopped");
    Ok(())
}

/// Install SIGTERM and SIGINT handlers now; the returned future resolves on
/// the first of either.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send + 'static> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate =
        signal(SignalKind::terminate()).context("failed to listen for SIGTERM")?;
    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed to listen for SIGINT")?;

    Ok(async move {
        tokio::select! {
            _ = terminate.recv() => {},
            _ = interrupt.recv() => {},
        }
        tracing::info!("shutdown signal received");
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send + 'static> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutdown signal received");
    })
}

/// Parse a request body as JSON, treating an empty body as `null`.
fn parse_body(body: &Bytes) -> std::result::Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("invalid JSON: {e}")))
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

async fn index() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "timestamp": now_iso8601(),
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.engine.lock().await.health_snapshot();
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": now_iso8601(),
        "buffer_size": snapshot.buffer_length,
        "session_active": snapshot.session_active,
    }))
}

async fn receive_data(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let value = parse_body(&body)?;
    if is_empty_payload(&value) {
        return Err(ApiError::bad_request("No data provided"));
    }

    // Records of the wrong shape are dropped with a warning, not refused.
    match serde_json::from_value::<RawSample>(value) {
        Ok(raw) => {
            state.engine.lock().await.ingest(raw);
        }
        Err(e) => tracing::warn!("invalid data point dropped: {e}"),
    }

    Ok(Json(json!({
        "success": true,
        "message": "Data received and processed",
        "timestamp": now_iso8601(),
    })))
}

#[derive(Debug, Default, Deserialize)]
struct StartSessionRequest {
    session_id: Option<String>,
    patient_id: Option<String>,
    session_type: Option<String>,
}

async fn start_session(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let value = parse_body(&body)?;
    let req: StartSessionRequest = if value.is_null() {
        StartSessionRequest::default()
    } else {
        serde_json::from_value(value)
            .map_err(|e| ApiError::bad_request(format!("invalid session request: {e}")))?
    };

    let (Some(session_id), Some(patient_id)) = (
        req.session_id.filter(|s| !s.is_empty()),
        req.patient_id.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "session_id and patient_id are required",
        ));
    };

    state.engine.lock().await.start_session(
        session_id.clone(),
        patient_id,
        req.session_type.as_deref(),
    );

    Ok(Json(json!({
        "success": true,
        "message": "Session started",
        "session_id": session_id,
        "timestamp": now_iso8601(),
    })))
}

async fn end_session(State(state): State<AppState>) -> ApiResult {
    let Some(session) = state.engine.lock().await.end_session() else {
        return Err(ApiError::bad_request("No active session"));
    };
    Ok(Json(json!({
        "success": true,
        "message": "Session ended",
        "session_data": session,
    })))
}

async fn session_status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.engine.lock().await.session_status())
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    count: Option<String>,
}

async fn recent_feedback(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<Value> {
    // Unparseable counts fall back to the default window.
    let count = query
        .count
        .and_then(|c| c.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_RECENT_COUNT);

    let engine = state.engine.lock().await;
    let feedback = engine.recent_feedback(count);
    Json(json!({
        "success": true,
        "feedback": feedback,
        "count": feedback.len(),
    }))
}
