//! Settings sections and their compiled defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::loader::stockroom_home;

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockroomSettings {
    /// HTTP server.
    pub server: ServerSettings,
    /// `SQLite` database.
    pub database: DatabaseSettings,
    /// Attachment blob storage.
    pub storage: StorageSettings,
    /// Change event fan-out.
    pub events: EventSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

/// HTTP server settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Allow any origin, method and header.
    pub cors_permissive: bool,
    /// Grace period for in-flight requests on shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_permissive: true,
            shutdown_timeout_secs: 30,
        }
    }
}

/// Database settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file.
    pub path: PathBuf,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// `SQLite` busy timeout.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: stockroom_home().join("stockroom.db"),
            pool_size: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Blob storage settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding uploaded files.
    pub root_dir: PathBuf,
    /// Largest accepted upload.
    pub max_upload_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root_dir: stockroom_home().join("files"),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Event broadcaster settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Per-subscriber channel capacity; a full channel drops events.
    pub subscriber_buffer: usize,
    /// Interval between SSE keep-alive comments.
    pub keepalive_secs: u64,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            subscriber_buffer: 64,
            keepalive_secs: 15,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`). `RUST_LOG`
    /// overrides it.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl StockroomSettings {
    /// Reject values the server cannot run with.
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: &str| Err(crate::SettingsError::InvalidValue(msg.to_string()));
        if self.database.pool_size == 0 {
            return invalid("database.pool_size must be at least 1");
        }
        if self.events.subscriber_buffer == 0 {
            return invalid("events.subscriber_buffer must be at least 1");
        }
        if self.storage.max_upload_bytes == 0 {
            return invalid("storage.max_upload_bytes must be at least 1");
        }
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(crate::SettingsError::InvalidValue(format!(
                "logging.level must be one of {}, got '{}'",
                LEVELS.join(", "),
                self.logging.level
            )));
        }
        Ok(())
    }
}
