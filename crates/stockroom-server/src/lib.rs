//! # stockroom-server
//!
//! Axum HTTP API for Stockroom.
//!
//! - REST endpoints for every workspace-scoped resource under `/api/workspaces`
//! - Domain errors mapped to status codes with a JSON error body
//! - Change events fanned out per workspace by the [`Broadcaster`] and
//!   streamed to dashboards over server-sent events
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod broadcast;
pub mod config;
pub mod error;
mod handlers;
pub mod health;
pub mod server;
pub mod shutdown;
pub mod state;

pub use broadcast::{Broadcaster, Subscription};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use server::StockroomServer;
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
pub use state::{AppState, Services};
