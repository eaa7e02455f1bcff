//! `StockroomServer`: Axum router assembly and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::Json;
use axum::routing::{get, post, put};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::broadcast::Broadcaster;
use crate::config::ServerConfig;
use crate::handlers::{
    attachments, borrowers, categories, containers, events, files, inventory, items, labels,
    loans, locations, movements, workspaces,
};
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;
use crate::state::{AppState, Services};

/// The Stockroom HTTP server.
pub struct StockroomServer {
    config: Arc<ServerConfig>,
    services: Arc<Services>,
    broadcaster: Broadcaster,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl StockroomServer {
    /// Create a server over the given services.
    pub fn new(config: ServerConfig, services: Services) -> Self {
        let broadcaster = Broadcaster::new(config.subscriber_buffer);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
            broadcaster,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes and middleware.
    pub fn router(&self) -> Router {
        let state = AppState {
            services: Arc::clone(&self.services),
            broadcaster: self.broadcaster.clone(),
            config: Arc::clone(&self.config),
            shutdown: self.shutdown.token(),
            start_time: self.start_time,
        };

        let cors = if self.config.cors_permissive {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        };

        Router::new()
            .route("/health", get(health_handler))
            .merge(api_routes())
            .layer(DefaultBodyLimit::max(self.config.max_upload_bytes))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind the configured address and serve in a background task.
    ///
    /// The task stops accepting connections once the shutdown coordinator
    /// fires and finishes when in-flight requests complete.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned())
                .await;
            if let Err(e) = result {
                error!(error = %e, "server error");
            }
        });
        info!(%addr, "listening");
        Ok((addr, handle))
    }

    /// Change-event broadcaster.
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workspaces", get(workspaces::list).post(workspaces::create))
        .route(
            "/api/workspaces/{ws}",
            get(workspaces::get)
                .patch(workspaces::update)
                .delete(workspaces::delete),
        )
        .route("/api/workspaces/{ws}/events", get(events::stream))
        .route(
            "/api/workspaces/{ws}/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/workspaces/{ws}/categories/{id}",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::delete),
        )
        .route("/api/workspaces/{ws}/locations", get(locations::list).post(locations::create))
        .route(
            "/api/workspaces/{ws}/locations/{id}",
            get(locations::get)
                .patch(locations::update)
                .delete(locations::delete),
        )
        .route(
            "/api/workspaces/{ws}/containers",
            get(containers::list).post(containers::create),
        )
        .route(
            "/api/workspaces/{ws}/containers/{id}",
            get(containers::get)
                .patch(containers::update)
                .delete(containers::delete),
        )
        .route("/api/workspaces/{ws}/items", get(items::list).post(items::create))
        .route("/api/workspaces/{ws}/items/low-stock", get(items::low_stock))
        .route(
            "/api/workspaces/{ws}/items/{id}",
            get(items::get).patch(items::update).delete(items::delete),
        )
        .route("/api/workspaces/{ws}/items/{id}/archive", post(items::archive))
        .route("/api/workspaces/{ws}/items/{id}/restore", post(items::restore))
        .route("/api/workspaces/{ws}/items/{id}/labels", get(labels::list_for_item))
        .route(
            "/api/workspaces/{ws}/items/{id}/labels/{label_id}",
            put(labels::attach).delete(labels::detach),
        )
        .route(
            "/api/workspaces/{ws}/items/{id}/attachments",
            get(attachments::list_for_item).post(attachments::create),
        )
        .route(
            "/api/workspaces/{ws}/attachments/{id}",
            get(attachments::get)
                .patch(attachments::update)
                .delete(attachments::delete),
        )
        .route("/api/workspaces/{ws}/attachments/{id}/primary", post(attachments::set_primary))
        .route("/api/workspaces/{ws}/files", post(files::upload))
        .route("/api/workspaces/{ws}/files/{id}", get(files::download))
        .route("/api/workspaces/{ws}/labels", get(labels::list).post(labels::create))
        .route(
            "/api/workspaces/{ws}/labels/{id}",
            get(labels::get).patch(labels::update).delete(labels::delete),
        )
        .route("/api/workspaces/{ws}/inventory", get(inventory::list).post(inventory::create))
        .route(
            "/api/workspaces/{ws}/inventory/{id}",
            get(inventory::get)
                .patch(inventory::update)
                .delete(inventory::delete),
        )
        .route("/api/workspaces/{ws}/inventory/{id}/move", post(inventory::move_to))
        .route("/api/workspaces/{ws}/inventory/{id}/quantity", post(inventory::set_quantity))
        .route("/api/workspaces/{ws}/inventory/{id}/status", post(inventory::change_status))
        .route("/api/workspaces/{ws}/inventory/{id}/archive", post(inventory::archive))
        .route("/api/workspaces/{ws}/inventory/{id}/movements", get(inventory::movements))
        .route("/api/workspaces/{ws}/movements", get(movements::list).post(movements::record))
        .route("/api/workspaces/{ws}/movements/{id}", get(movements::get))
        .route("/api/workspaces/{ws}/borrowers", get(borrowers::list).post(borrowers::create))
        .route(
            "/api/workspaces/{ws}/borrowers/{id}",
            get(borrowers::get)
                .patch(borrowers::update)
                .delete(borrowers::delete),
        )
        .route("/api/workspaces/{ws}/loans", get(loans::list).post(loans::create))
        .route("/api/workspaces/{ws}/loans/{id}", get(loans::get))
        .route("/api/workspaces/{ws}/loans/{id}/return", post(loans::return_loan))
        .route("/api/workspaces/{ws}/loans/{id}/extend", post(loans::extend))
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.broadcaster.subscriber_count(),
        state.broadcaster.dropped_count(),
    ))
}
