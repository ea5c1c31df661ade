//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::StopwatchSnapshot;

/// API response structure for control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub stopwatch: StopwatchSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, stopwatch: StopwatchSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            stopwatch,
        }
    }

    /// Create a response whose status mirrors the stopwatch phase
    pub fn from_snapshot(message: String, stopwatch: StopwatchSnapshot) -> Self {
        Self::new(stopwatch.phase.as_str().to_string(), message, stopwatch)
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub stopwatch: StopwatchSnapshot,
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
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
