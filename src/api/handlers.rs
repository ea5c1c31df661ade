//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{error, info, warn};

use crate::{
    state::{AppState, StopwatchSnapshot},
    view::render_page,
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

/// Handle GET / - Render the stopwatch page
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, StatusCode> {
    match state.get_snapshot() {
        Ok(snapshot) => Ok(Html(render_page(&snapshot))),
        Err(e) => {
            error!("Failed to render stopwatch page: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn control_response(
    action: &str,
    message: &str,
    result: Result<StopwatchSnapshot, String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok(snapshot) => {
            info!("{} endpoint called - stopwatch at {}", action, snapshot.display);
            Ok(Json(ApiResponse::from_snapshot(message.to_string(), snapshot)))
        }
        Err(e) => {
            error!("Failed to {} stopwatch: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /start - Start the stopwatch
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    control_response("start", "Stopwatch started", state.start())
}

/// Handle POST /stop - Stop the stopwatch
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    control_response("stop", "Stopwatch stopped", state.stop())
}

/// Handle POST /reset - Stop the stopwatch and clear the elapsed time
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    control_response("reset", "Stopwatch reset", state.reset())
}

/// Handle GET /status - Return the current stopwatch status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let stopwatch = match state.get_snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to get stopwatch state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        stopwatch,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - Stream a `display` event for every state change
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let display_rx = state.subscribe();

    // The first event carries the current snapshot, later ones follow changes
    let events = stream::unfold((display_rx, true), |(mut display_rx, first)| async move {
        if !first && display_rx.changed().await.is_err() {
            return None;
        }

        let snapshot = display_rx.borrow_and_update().clone();
        match Event::default().event("display").json_data(&snapshot) {
            Ok(event) => Some((Ok(event), (display_rx, false))),
            Err(e) => {
                error!("Failed to encode display event: {}", e);
                None
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /stopwatch.css - Serve the configured stylesheet
pub async fn stylesheet_handler(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, StatusCode> {
    let css = match &state.stylesheet {
        Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            warn!("Failed to read stylesheet {}: {}", path.display(), e);
            StatusCode::NOT_FOUND
        })?,
        None => String::new(),
    };

    Ok(([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
