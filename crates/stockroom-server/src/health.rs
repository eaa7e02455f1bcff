//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Crate version.
    pub version: &'static str,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Live SSE subscribers across all workspaces.
    pub subscribers: usize,
    /// Events dropped because a subscriber fell behind.
    pub dropped_events: u64,
}

/// Build a health response from live counters.
pub fn health_check(start_time: Instant, subscribers: usize, dropped_events: u64) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: start_time.elapsed().as_secs(),
        subscribers,
        dropped_events,
    }
}
