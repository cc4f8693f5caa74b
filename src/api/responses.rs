//! API response structures

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{error::TimerError, state::TimerView};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Response for actions on a single timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerView) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Response reflecting the timer's run state
    pub fn for_timer(message: String, timer: TimerView) -> Self {
        let status = if timer.complete {
            "complete"
        } else if timer.running {
            "running"
        } else {
            "stopped"
        };
        Self::new(status.to_string(), message, timer)
    }
}

/// Response for on/off switches (theme, presentation mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub enabled: bool,
}

impl ToggleResponse {
    pub fn new(message: String, enabled: bool) -> Self {
        Self {
            status: if enabled { "on" } else { "off" }.to_string(),
            message,
            timestamp: Utc::now(),
            enabled,
        }
    }
}

/// Full status of the service and every timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub theme: String,
    pub dark_mode: bool,
    pub presentation_mode: bool,
    pub active_timer_id: String,
    pub clock_time: String,
    pub timers: Vec<TimerView>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: VERSION.to_string(),
        }
    }
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// `TimerError` rendered as an HTTP error
#[derive(Debug)]
pub struct ApiError(pub TimerError);

impl From<TimerError> for ApiError {
    fn from(e: TimerError) -> Self {
        ApiError(e)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(TimerError::InvalidRequest(rejection.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(TimerError::InvalidRequest(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            TimerError::NotFound(_) => StatusCode::NOT_FOUND,
            TimerError::ControlsDisabled(_) => StatusCode::CONFLICT,
            TimerError::InvalidConfig(_)
            | TimerError::InvalidRequest(_)
            | TimerError::UnknownShortcut(_) => StatusCode::BAD_REQUEST,
            TimerError::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.0.to_string(),
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}
