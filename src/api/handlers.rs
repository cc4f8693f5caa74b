//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc, time::Duration};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use tracing::{debug, info};

use crate::state::{AppState, ConfigUpdate, Shortcut, TimerView};
use super::responses::{ApiError, ApiResponse, HealthResponse, StatusResponse, ToggleResponse};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Handle POST /timers/:id/start
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    let timer = state.start_timer(&id)?;
    Ok(Json(ApiResponse::for_timer(format!("{} started", timer.name), timer)))
}

/// Handle POST /timers/:id/pause
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    let timer = state.pause_timer(&id)?;
    Ok(Json(ApiResponse::for_timer(format!("{} paused", timer.name), timer)))
}

/// Handle POST /timers/:id/toggle - start when paused, pause when running
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    let timer = state.toggle_timer(&id)?;
    let verb = if timer.running { "started" } else { "paused" };
    Ok(Json(ApiResponse::for_timer(format!("{} {}", timer.name, verb), timer)))
}

/// Optional starting value for a reset
#[derive(Debug, Default, Deserialize)]
pub struct ResetParams {
    pub initial_ms: Option<u64>,
}

/// Handle POST /timers/:id/reset[?initial_ms=N]
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    params: Result<Query<ResetParams>, QueryRejection>,
) -> ApiResult<ApiResponse> {
    let Query(params) = params?;
    let initial = Duration::from_millis(params.initial_ms.unwrap_or(0));
    let timer = state.reset_timer(&id, initial)?;
    Ok(Json(ApiResponse::for_timer(format!("{} reset", timer.name), timer)))
}

/// Handle POST /timers/:id/stop
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    let timer = state.stop_timer(&id)?;
    Ok(Json(ApiResponse::for_timer(format!("{} stopped", timer.name), timer)))
}

/// Handle PUT /timers/:id/config - partial configuration edit
pub async fn config_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    update: Result<Json<ConfigUpdate>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(update) = update?;
    let timer = state.update_config(&id, &update)?;
    Ok(Json(ApiResponse::for_timer(format!("{} updated", timer.name), timer)))
}

/// Handle GET /timers
pub async fn list_timers_handler(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TimerView>> {
    Ok(Json(state.timer_views()?))
}

/// Handle GET /timers/:id
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TimerView> {
    Ok(Json(state.timer_view(&id)?))
}

/// Handle POST /active/:id - select the timer shortcuts act on
pub async fn select_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    state.set_active_timer(&id)?;
    let timer = state.timer_view(&id)?;
    Ok(Json(ApiResponse::for_timer(format!("{} selected", timer.name), timer)))
}

/// Handle POST /theme/toggle
pub async fn theme_toggle_handler(State(state): State<Arc<AppState>>) -> ApiResult<ToggleResponse> {
    let dark_mode = state.toggle_dark_mode()?;
    let message = if dark_mode { "Switched to dark mode" } else { "Switched to light mode" };
    Ok(Json(ToggleResponse::new(message.to_string(), dark_mode)))
}

/// Handle POST /presentation/toggle - fullscreen presentation mode
pub async fn presentation_toggle_handler(State(state): State<Arc<AppState>>) -> ApiResult<ToggleResponse> {
    let enabled = state.toggle_presentation_mode()?;
    let message = if enabled { "Entered presentation mode" } else { "Left presentation mode" };
    Ok(Json(ToggleResponse::new(message.to_string(), enabled)))
}

/// Handle POST /shortcut/:key - Space, R or Escape on the active timer
pub async fn shortcut_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<ApiResponse> {
    let shortcut: Shortcut = key.parse()?;
    let timer = state.handle_shortcut(shortcut)?;
    info!("Shortcut {:?} applied to {}", shortcut, timer.id);
    Ok(Json(ApiResponse::for_timer(format!("{:?} applied to {}", shortcut, timer.name), timer)))
}

/// Handle GET /status - Return current status of every timer
pub async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let snapshot = state.snapshot()?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        theme: if snapshot.dark_mode { "dark" } else { "light" }.to_string(),
        dark_mode: snapshot.dark_mode,
        presentation_mode: snapshot.presentation_mode,
        active_timer_id: snapshot.active_timer_id,
        clock_time: snapshot.clock_time,
        timers: snapshot.timers,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - display frames as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Display subscriber connected");

    let mut display_rx = state.display_tx.subscribe();
    // Send the current frame right away
    display_rx.mark_changed();

    let frames = stream::unfold(display_rx, |mut display_rx| async move {
        display_rx.changed().await.ok()?;
        let snapshot = display_rx.borrow_and_update().clone();
        let event = Event::default()
            .event("display")
            .json_data(&snapshot)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));
        Some((Ok(event), display_rx))
    });

    Sse::new(frames).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
