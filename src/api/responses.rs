//! API response structures

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    preferences::PreferenceValue,
    state::{AppState, CountdownPhase, CountdownSnapshot},
};

/// Countdown fields shared by every response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownStatus {
    pub phase: CountdownPhase,
    pub setting_seconds: u64,
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub is_paused: bool,
    pub can_pause: bool,
    pub can_resume: bool,
    pub has_expired: bool,
    /// Title shown in place of the icon, absent while idle
    pub title: Option<String>,
    pub blinking: bool,
    pub alert_visible: bool,
}

impl CountdownStatus {
    pub fn new(snapshot: &CountdownSnapshot, state: &AppState) -> Self {
        Self {
            phase: snapshot.phase,
            setting_seconds: snapshot.setting_seconds,
            remaining_seconds: snapshot.remaining_seconds,
            is_running: snapshot.is_running(),
            is_paused: snapshot.is_paused(),
            can_pause: snapshot.can_pause(),
            can_resume: snapshot.can_resume(),
            has_expired: snapshot.has_expired(),
            title: state.display.title(),
            blinking: state.display.is_blinking(),
            alert_visible: state.alert.is_visible(),
        }
    }
}

/// API response structure for countdown command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub countdown: CountdownStatus,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, countdown: CountdownStatus) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            countdown,
        }
    }

    /// Create a success response
    pub fn ok(message: String, countdown: CountdownStatus) -> Self {
        Self::new("ok".to_string(), message, countdown)
    }
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: String) -> Self {
        Self {
            status: "error".to_string(),
            error,
            timestamp: Utc::now(),
        }
    }
}

/// Status response with server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub countdown: CountdownStatus,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Body accepted by POST /start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartRequest {
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
    pub seconds: Option<i64>,
}

impl StartRequest {
    /// Requested duration in seconds, or `None` when no field was given
    pub fn total_seconds(&self) -> Option<i64> {
        if self.hours.is_none() && self.minutes.is_none() && self.seconds.is_none() {
            return None;
        }
        let hours = self.hours.unwrap_or(0);
        let minutes = self.minutes.unwrap_or(0);
        let seconds = self.seconds.unwrap_or(0);
        Some(
            hours
                .saturating_mul(3600)
                .saturating_add(minutes.saturating_mul(60))
                .saturating_add(seconds),
        )
    }
}

/// A single preference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceResponse {
    pub key: String,
    pub value: PreferenceValue,
}

/// Every preference with its effective value
#[derive(Debug, Clone, Serialize)]
pub struct PreferencesResponse {
    pub preferences: BTreeMap<&'static str, PreferenceValue>,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_totals() {
        assert_eq!(StartRequest::default().total_seconds(), None);
        let req = StartRequest {
            hours: Some(1),
            minutes: Some(2),
            seconds: Some(3),
        };
        assert_eq!(req.total_seconds(), Some(3723));
        let req = StartRequest {
            seconds: Some(-5),
            ..Default::default()
        };
        assert_eq!(req.total_seconds(), Some(-5));
    }

    #[test]
    fn start_request_rejects_unknown_fields() {
        assert!(serde_json::from_str::<StartRequest>(r#"{"secs": 10}"#).is_err());
        let req: StartRequest = serde_json::from_str(r#"{"minutes": 2}"#).unwrap();
        assert_eq!(req.total_seconds(), Some(120));
    }
}
