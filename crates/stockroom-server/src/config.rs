//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stockroom_settings::StockroomSettings;

/// Runtime configuration of the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (`0` for auto-assign).
    pub port: u16,
    /// Allow any origin (the dashboard runs on a different port in development).
    pub cors_permissive: bool,
    /// Largest accepted request body, which bounds file uploads.
    pub max_upload_bytes: usize,
    /// Per-subscriber event queue length.
    pub subscriber_buffer: usize,
    /// Interval between SSE keep-alive comments, in seconds.
    pub keepalive_secs: u64,
    /// Time allowed for in-flight requests after a shutdown signal, in seconds.
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Extract the server-relevant parts of the loaded settings.
    pub fn from_settings(settings: &StockroomSettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            cors_permissive: settings.server.cors_permissive,
            max_upload_bytes: settings.storage.max_upload_bytes,
            subscriber_buffer: settings.events.subscriber_buffer,
            keepalive_secs: settings.events.keepalive_secs,
            shutdown_timeout_secs: settings.server.shutdown_timeout_secs,
        }
    }

    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// SSE keep-alive interval.
    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs.max(1))
    }

    /// Grace period for shutdown.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_settings(&StockroomSettings::default())
    }
}
