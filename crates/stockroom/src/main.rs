//! # stockroom
//!
//! Stockroom server binary: loads settings, opens the database and blob
//! storage, and serves the HTTP API until Ctrl-C or SIGTERM.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use stockroom_settings::{StockroomSettings, expand_home};
use stockroom_store::{ConnectionConfig, Database, FilesystemStorage, Repositories};
use stockroom_server::{ServerConfig, Services, StockroomServer, shutdown_signal};

/// Stockroom inventory server.
#[derive(Parser, Debug)]
#[command(name = "stockroom", version, about = "Multi-tenant inventory tracker")]
struct Cli {
    /// Settings file (default `~/.stockroom/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Host to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Directory for uploaded file content.
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Log level (`trace`, `debug`, `info`, `warn`, `error`).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Load settings and apply command-line overrides on top.
    fn settings(&self) -> Result<StockroomSettings> {
        let path = self
            .settings
            .clone()
            .unwrap_or_else(stockroom_settings::settings_path);
        let mut settings = stockroom_settings::load_settings_from_path(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;
        self.apply(&mut settings);
        settings
            .validate()
            .context("Invalid command-line override")?;
        Ok(settings)
    }

    fn apply(&self, settings: &mut StockroomSettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref path) = self.db_path {
            settings.database.path.clone_from(path);
        }
        if let Some(ref dir) = self.storage_dir {
            settings.storage.root_dir.clone_from(dir);
        }
        if let Some(ref level) = self.log_level {
            settings.logging.level.clone_from(level);
        }
        settings.database.path = expand_home(&settings.database.path);
        settings.storage.root_dir = expand_home(&settings.storage.root_dir);
    }
}

/// Open the database and storage and wire the services.
fn build_services(settings: &StockroomSettings) -> Result<Services> {
    let db = open_database(&settings.database.path, settings)?;
    let storage = FilesystemStorage::new(&settings.storage.root_dir).with_context(|| {
        format!(
            "Failed to open storage directory: {}",
            settings.storage.root_dir.display()
        )
    })?;
    let repos = Repositories::new(&db);
    Ok(Services::new(&repos, Arc::new(storage)))
}

fn open_database(path: &Path, settings: &StockroomSettings) -> Result<Database> {
    let config = ConnectionConfig {
        pool_size: settings.database.pool_size,
        busy_timeout_ms: settings.database.busy_timeout_ms,
    };
    Database::open(path, &config)
        .with_context(|| format!("Failed to open database: {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let settings = args.settings()?;

    stockroom_logging::init_subscriber(&settings.logging.level, settings.logging.format);

    let services = build_services(&settings)?;
    let server = StockroomServer::new(ServerConfig::from_settings(&settings), services);

    let (addr, handle) = server
        .listen()
        .await
        .context("Failed to bind server")?;
    tracing::info!(
        db = %settings.database.path.display(),
        storage = %settings.storage.root_dir.display(),
        "Stockroom listening on http://{addr}"
    );

    shutdown_signal().await;

    tracing::info!("Shutting down...");
    let timeout = server.config().shutdown_timeout();
    server
        .shutdown()
        .graceful_shutdown(vec![handle], Some(timeout))
        .await;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_no_overrides() {
        let cli = Cli::parse_from(["stockroom"]);
        assert!(cli.settings.is_none());
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::parse_from([
            "stockroom",
            "--port",
            "9000",
            "--db-path",
            "/tmp/test.db",
            "--storage-dir",
            "/tmp/files",
        ]);
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/test.db")));
        assert_eq!(cli.storage_dir, Some(PathBuf::from("/tmp/files")));
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::parse_from([
            "stockroom",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--log-level",
            "debug",
            "--db-path",
            "/srv/stock.db",
        ]);
        let mut settings = StockroomSettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.database.path, PathBuf::from("/srv/stock.db"));
        assert_eq!(settings.database.pool_size, 8);
    }

    #[test]
    fn settings_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"port": 7000, "host": "10.0.0.1"}}"#).unwrap();

        let cli = Cli::parse_from([
            "stockroom",
            "--settings",
            path.to_str().unwrap(),
            "--port",
            "7001",
        ]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.server.host, "10.0.0.1");
        assert_eq!(settings.server.port, 7001);
    }

    #[test]
    fn invalid_level_flag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "stockroom",
            "--settings",
            dir.path().join("missing.json").to_str().unwrap(),
            "--log-level",
            "loud",
        ]);
        assert!(cli.settings().is_err());
    }

    #[tokio::test]
    async fn server_graceful_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = StockroomSettings::default();
        settings.server.port = 0;
        settings.database.path = dir.path().join("stockroom.db");
        settings.storage.root_dir = dir.path().join("files");

        let services = build_services(&settings).unwrap();
        let server = StockroomServer::new(ServerConfig::from_settings(&settings), services);
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);
        assert!(settings.database.path.exists());

        server.shutdown().shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("shutdown timed out")
            .expect("join error");
    }
}
