//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    state::{AppState, CountdownState, CountdownView, StoreError},
    tasks::SessionPhase,
};
use super::responses::{
    ApiResponse, ForegroundResponse, HealthResponse, StatusResponse, TotalTimeRequest,
};

/// Turn a verb result into a response, recording the action on success
fn respond(
    state: &AppState,
    action: &str,
    message: &str,
    result: Result<CountdownState, StoreError>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok(countdown) => {
            state.record_action(action);
            info!("{} endpoint called", action);
            Ok(Json(ApiResponse::new(message, &countdown)))
        }
        Err(e) => {
            error!("Failed to {}: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /toggle - Start or pause the countdown
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.engine.toggle_countdown();
    let message = match &result {
        Ok(c) if c.is_running => "Countdown running",
        Ok(c) if c.current_millis <= 0 => "Countdown finished, nothing to toggle",
        _ => "Countdown paused",
    };
    respond(&state, "toggle", message, result)
}

/// Handle POST /reset - Bank elapsed time and refill the countdown
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.engine.reset_countdown();
    respond(&state, "reset", "Countdown reset", result)
}

/// Handle POST /total - Set a new countdown duration
pub async fn total_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TotalTimeRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state
        .engine
        .set_new_total_time(request.hours, request.minutes, request.seconds);
    respond(&state, "set-total", "Countdown duration updated", result)
}

/// Handle POST /set-max - Make the remaining time the full duration
pub async fn set_max_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.engine.set_current_as_max();
    respond(&state, "set-max", "Remaining time set as maximum", result)
}

/// Handle POST /clear-today - Soft clear today's total
pub async fn clear_today_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.engine.clear_today_completed_time();
    respond(&state, "clear-today", "Today's total cleared", result)
}

/// Handle POST /save - Persist the live remaining time
pub async fn save_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.engine.save_current_state();
    respond(&state, "save", "Countdown state saved", result)
}

/// Handle POST /lifecycle/background - The host went to the background
pub async fn background_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.engine.on_background();
    respond(&state, "background", "Countdown saved for background", result)
}

/// Handle POST /lifecycle/foreground - The host is back in the foreground
pub async fn foreground_handler(State(state): State<Arc<AppState>>) -> Json<ForegroundResponse> {
    let was_auto_paused = state.engine.on_foreground();
    state.record_action("foreground");
    Json(ForegroundResponse {
        was_auto_paused,
        view: state.engine.view(),
    })
}

/// Handle GET /status - Return the countdown record and its projection
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let countdown = state.engine.state();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        status: SessionPhase::of(&countdown),
        view: CountdownView::from(&countdown),
        state: countdown,
        ticking: state.engine.is_ticking(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
