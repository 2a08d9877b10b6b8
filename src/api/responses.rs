//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{CountdownState, CountdownView},
    tasks::SessionPhase,
};

/// Response returned by every verb endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: SessionPhase,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub view: CountdownView,
}

impl ApiResponse {
    /// Build a response describing `state` after a verb ran
    pub fn new(message: impl Into<String>, state: &CountdownState) -> Self {
        Self {
            status: SessionPhase::of(state),
            message: message.into(),
            timestamp: Utc::now(),
            view: CountdownView::from(state),
        }
    }
}

/// Request body for `POST /total`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TotalTimeRequest {
    #[serde(default)]
    pub hours: i64,
    #[serde(default)]
    pub minutes: i64,
    #[serde(default)]
    pub seconds: i64,
}

/// Response for `POST /lifecycle/foreground`
#[derive(Debug, Clone, Serialize)]
pub struct ForegroundResponse {
    pub was_auto_paused: bool,
    pub view: CountdownView,
}

/// Full status including the raw persisted record
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: SessionPhase,
    pub state: CountdownState,
    pub view: CountdownView,
    pub ticking: bool,
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
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
