//! JSON dashboard API over a single in-memory tagging session.
//!
//! Every request takes the one session lock, so mutations are serialized and
//! metrics are always recomputed against a consistent event log.

use crate::command::{Command, RecordEventCommand};
use crate::config::ServeConfig;
use crate::event::{PlayEvent, Quarter};
use crate::export;
use crate::metrics::{FoulPolicy, PlayMetrics};
use crate::outcome::Outcome;
use crate::session::{GameInfo, SessionError, TaggingSession};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

pub type SharedSession = Arc<Mutex<TaggingSession>>;

#[derive(Clone)]
struct AppState {
    session: SharedSession,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(serde_json::json!({"error": message.to_string()})))
}

fn session_error(e: SessionError) -> ApiError {
    match e {
        SessionError::DuplicatePlay(_) => api_error(StatusCode::CONFLICT, e),
        SessionError::EmptyPlayName => api_error(StatusCode::BAD_REQUEST, e),
    }
}

pub fn router(session: SharedSession) -> Router {
    let state = AppState { session };
    Router::new()
        .route("/api/health", get(health))
        .route("/api/session", get(session_info))
        .route("/api/plays", get(list_plays).post(add_play))
        .route("/api/events", get(list_events).post(record_event))
        .route("/api/quarter", put(set_quarter))
        .route("/api/metrics", get(metrics))
        .route("/api/export/log.csv", get(export_log))
        .route("/api/export/metrics.csv", get(export_metrics))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

pub async fn run(
    serve_config: &ServeConfig,
    session: TaggingSession,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(Arc::new(Mutex::new(session)));

    let addr = format!("{}:{}", serve_config.bind, serve_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("serve listening on {local_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for ctrl-c: {e}");
            }
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true}))
}

#[derive(Serialize)]
struct SessionView {
    game: GameInfo,
    heading: Option<String>,
    foul_policy: FoulPolicy,
    plays: usize,
    events: usize,
}

async fn session_info(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session.lock().await;
    Json(SessionView {
        game: session.game().clone(),
        heading: session.heading(),
        foul_policy: session.foul_policy(),
        plays: session.catalog().len(),
        events: session.events().len(),
    })
}

async fn list_plays(State(state): State<AppState>) -> Json<Vec<String>> {
    let session = state.session.lock().await;
    Json(session.catalog().iter().map(str::to_string).collect())
}

#[derive(Deserialize)]
struct AddPlayRequest {
    name: String,
}

async fn add_play(
    State(state): State<AppState>,
    Json(req): Json<AddPlayRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let mut session = state.session.lock().await;
    let outcome = Command::add_play(req.name)
        .apply(&mut session)
        .map_err(session_error)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"ok": true, "message": outcome.to_string()})),
    ))
}

async fn list_events(State(state): State<AppState>) -> Json<Vec<PlayEvent>> {
    let session = state.session.lock().await;
    Json(session.events().to_vec())
}

#[derive(Deserialize)]
struct RecordEventRequest {
    play: String,
    outcome: Outcome,
}

async fn record_event(
    State(state): State<AppState>,
    Json(req): Json<RecordEventRequest>,
) -> Result<(StatusCode, Json<PlayEvent>), ApiError> {
    let mut session = state.session.lock().await;
    let event = RecordEventCommand {
        play: req.play,
        outcome: req.outcome,
    }
    .apply(&mut session)
    .map_err(session_error)?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[derive(Deserialize)]
struct QuarterRequest {
    quarter: Quarter,
}

async fn set_quarter(
    State(state): State<AppState>,
    Json(req): Json<QuarterRequest>,
) -> Result<Json<GameInfo>, ApiError> {
    let mut session = state.session.lock().await;
    Command::set_quarter(req.quarter)
        .apply(&mut session)
        .map_err(session_error)?;
    Ok(Json(session.game().clone()))
}

async fn metrics(State(state): State<AppState>) -> Json<Vec<PlayMetrics>> {
    let session = state.session.lock().await;
    Json(session.metrics())
}

fn csv_response(file_name: String, body: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
}

async fn export_log(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let session = state.session.lock().await;
    let body = export::log_csv(session.events())
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    Ok(csv_response(export::log_file_name(session.game()), body))
}

async fn export_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let session = state.session.lock().await;
    let body = export::metrics_csv(&session.metrics())
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    Ok(csv_response(export::metrics_file_name(session.game()), body))
}
