//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    error::CountdownError,
    preferences::{PreferenceError, PreferenceKey, PreferenceValue},
    state::{AppState, CountdownSnapshot},
};
use super::responses::{
    ApiResponse, CountdownStatus, ErrorResponse, HealthResponse, PreferenceResponse,
    PreferencesResponse, StartRequest, StatusResponse,
};

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn countdown_error(e: CountdownError) -> ApiError {
    let status = match e {
        CountdownError::InvalidDuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CountdownError::NotRunning(_)
        | CountdownError::NotPaused(_)
        | CountdownError::NotExpired(_) => StatusCode::CONFLICT,
        CountdownError::StatePoisoned(_) => {
            error!("Countdown state unavailable: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}

fn preference_error(e: PreferenceError) -> ApiError {
    let status = match e {
        PreferenceError::UnknownKey(_) => StatusCode::NOT_FOUND,
        PreferenceError::TypeMismatch { .. } | PreferenceError::OutOfRange { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PreferenceError::Poisoned | PreferenceError::Io(_) | PreferenceError::Format(_) => {
            error!("Failed to store preference: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}

/// Turn a command result into a response, logging the outcome
fn command_response(
    state: &AppState,
    command: &str,
    result: Result<CountdownSnapshot, CountdownError>,
    message: impl FnOnce(&CountdownSnapshot) -> String,
) -> ApiResult<ApiResponse> {
    match result {
        Ok(snapshot) => {
            let message = message(&snapshot);
            info!("{} endpoint called - {}", command, message);
            Ok(Json(ApiResponse::ok(message, CountdownStatus::new(&snapshot, state))))
        }
        Err(e) => {
            warn!("{} rejected: {}", command, e);
            Err(countdown_error(e))
        }
    }
}

/// Parse the POST /start body. An empty body means "use preferences";
/// anything else must be a valid `StartRequest` naming a duration.
fn start_duration(body: &[u8]) -> Result<Option<i64>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let request: StartRequest = serde_json::from_slice(body).map_err(|e| {
        warn!("Start rejected: malformed body: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!("invalid start request: {}", e))),
        )
    })?;
    match request.total_seconds() {
        Some(seconds) => Ok(Some(seconds)),
        None => {
            warn!("Start rejected: body names no duration");
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::new(
                    "start request needs hours, minutes or seconds".to_string(),
                )),
            ))
        }
    }
}

/// Handle POST /start - Start a countdown from the body or the stored setting
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<ApiResponse> {
    let result = match start_duration(&body)? {
        Some(seconds) => state.start(seconds),
        None => state.start_from_preferences(),
    };
    command_response(&state, "Start", result, |s| {
        format!("Countdown started from {}s", s.setting_seconds)
    })
}

/// Handle POST /stop - Stop the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let result = state.stop();
    command_response(&state, "Stop", result, |_| "Countdown stopped".to_string())
}

/// Handle POST /pause - Pause a running countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let result = state.pause();
    command_response(&state, "Pause", result, |s| {
        if s.has_expired() {
            "Countdown had already expired".to_string()
        } else {
            format!("Countdown paused with {}s remaining", s.remaining_seconds)
        }
    })
}

/// Handle POST /resume - Resume a paused countdown
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let result = state.resume();
    command_response(&state, "Resume", result, |s| {
        format!("Countdown resumed with {}s remaining", s.remaining_seconds)
    })
}

/// Handle POST /dismiss - Acknowledge an expired countdown
pub async fn dismiss_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let result = state.dismiss();
    command_response(&state, "Dismiss", result, |_| "Expiration alert dismissed".to_string())
}

/// Handle POST /restart - Dismiss and count down again from the stored setting
pub async fn restart_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let result = state.restart();
    command_response(&state, "Restart", result, |s| {
        format!("Countdown restarted from {}s", s.setting_seconds)
    })
}

/// Handle POST /notification-clicked - The expiration notification was clicked
pub async fn notification_clicked_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ApiResponse> {
    let result = state.notification_clicked();
    command_response(&state, "Notification-clicked", result, |_| {
        "Waiting for a new countdown".to_string()
    })
}

/// Handle POST /quit - Shut the server down
pub async fn quit_handler(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    info!("Quit endpoint called");
    state.request_shutdown();
    Ok(Json(HealthResponse {
        status: "shutting down".to_string(),
        ..HealthResponse::ok()
    }))
}

/// Handle GET /status - Countdown state and server information
pub async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let snapshot = state.snapshot().map_err(countdown_error)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        countdown: CountdownStatus::new(&snapshot, &state),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /preferences - Every preference with its effective value
pub async fn preferences_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<PreferencesResponse> {
    Ok(Json(PreferencesResponse {
        preferences: state.preferences.snapshot(),
    }))
}

/// Handle GET /preferences/:key - One preference
pub async fn get_preference_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<PreferenceResponse> {
    let key: PreferenceKey = key.parse().map_err(preference_error)?;
    Ok(Json(PreferenceResponse {
        key: key.to_string(),
        value: state.preferences.get(key),
    }))
}

/// Handle PUT /preferences/:key - Store one preference
pub async fn set_preference_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(value): Json<PreferenceValue>,
) -> ApiResult<PreferenceResponse> {
    let key: PreferenceKey = key.parse().map_err(preference_error)?;
    state
        .preferences
        .set(key, value.clone())
        .map_err(preference_error)?;
    info!("Preference {} set to {:?}", key, value);
    Ok(Json(PreferenceResponse {
        key: key.to_string(),
        value,
    }))
}

/// Handle GET /health - Health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
