//! Shared handler state.

use std::sync::Arc;
use std::time::Instant;

use stockroom_core::attachment::{AttachmentService, FileStorage};
use stockroom_core::borrower::BorrowerService;
use stockroom_core::category::CategoryService;
use stockroom_core::container::ContainerService;
use stockroom_core::inventory::InventoryService;
use stockroom_core::item::ItemService;
use stockroom_core::label::LabelService;
use stockroom_core::loan::LoanService;
use stockroom_core::location::LocationService;
use stockroom_core::movement::MovementService;
use stockroom_core::workspace::WorkspaceService;
use stockroom_core::{ChangeEvent, ItemId, WorkspaceId};
use stockroom_store::Repositories;
use tokio_util::sync::CancellationToken;

use crate::broadcast::Broadcaster;
use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};

/// Every domain service, wired over one set of repositories.
#[derive(Clone)]
pub struct Services {
    /// Workspaces.
    pub workspaces: WorkspaceService,
    /// Categories.
    pub categories: CategoryService,
    /// Locations.
    pub locations: LocationService,
    /// Containers.
    pub containers: ContainerService,
    /// Items.
    pub items: ItemService,
    /// Inventory records.
    pub inventory: InventoryService,
    /// Labels.
    pub labels: LabelService,
    /// Files and attachments.
    pub attachments: AttachmentService,
    /// Movement history.
    pub movements: MovementService,
    /// Borrowers.
    pub borrowers: BorrowerService,
    /// Loans.
    pub loans: LoanService,
}

impl Services {
    /// Wire the services over `repos`, storing file content in `storage`.
    pub fn new(repos: &Repositories, storage: Arc<dyn FileStorage>) -> Self {
        Self {
            workspaces: WorkspaceService::new(repos.workspaces.clone()),
            categories: CategoryService::new(repos.categories.clone()),
            locations: LocationService::new(repos.locations.clone()),
            containers: ContainerService::new(repos.containers.clone(), repos.locations.clone()),
            items: ItemService::new(repos.items.clone(), repos.categories.clone()),
            inventory: InventoryService::new(
                repos.inventory.clone(),
                repos.items.clone(),
                repos.locations.clone(),
                repos.containers.clone(),
            ),
            labels: LabelService::new(repos.labels.clone(), repos.items.clone()),
            attachments: AttachmentService::new(
                repos.attachments.clone(),
                repos.files.clone(),
                storage,
                repos.items.clone(),
            ),
            movements: MovementService::new(
                repos.movements.clone(),
                repos.inventory.clone(),
                repos.locations.clone(),
                repos.containers.clone(),
            ),
            borrowers: BorrowerService::new(repos.borrowers.clone()),
            loans: LoanService::new(
                repos.loans.clone(),
                repos.inventory.clone(),
                repos.borrowers.clone(),
            ),
        }
    }

    /// Delete an item together with its attachments, their file records and
    /// stored bytes.
    pub fn delete_item(&self, workspace_id: &WorkspaceId, id: &ItemId) -> stockroom_core::Result<()> {
        let _ = self.items.get(workspace_id, id)?;
        let _ = self.attachments.delete_for_item(workspace_id, id)?;
        self.items.delete(workspace_id, id)
    }

    /// Delete a workspace, then the stored bytes of every file it owned.
    /// File records go with the workspace row.
    pub fn delete_workspace(&self, id: &WorkspaceId) -> stockroom_core::Result<()> {
        let _ = self.workspaces.get(id)?;
        let files = self.attachments.workspace_files(id)?;
        self.workspaces.delete(id)?;
        self.attachments.remove_blobs(&files);
        Ok(())
    }
}

/// State handed to every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// Domain services.
    pub services: Arc<Services>,
    /// Change-event fan-out.
    pub broadcaster: Broadcaster,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Cancelled when the server starts shutting down.
    pub shutdown: CancellationToken,
    /// When the server started.
    pub start_time: Instant,
}

impl AppState {
    /// Run a service call on the blocking pool.
    ///
    /// Services talk to `SQLite` and the filesystem synchronously.
    pub(crate) async fn call<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Services) -> stockroom_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let services = Arc::clone(&self.services);
        tokio::task::spawn_blocking(move || f(&services))
            .await
            .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
            .map_err(ApiError::from)
    }

    /// Like [`AppState::call`], but first checks that the workspace exists so
    /// an unknown workspace is a 404 rather than a dangling reference.
    pub(crate) async fn in_workspace<T, F>(&self, workspace_id: WorkspaceId, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Services, &WorkspaceId) -> stockroom_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.call(move |services| {
            let _ = services.workspaces.get(&workspace_id)?;
            f(services, &workspace_id)
        })
        .await
    }

    /// Publish a change to the subscribers of its workspace.
    pub(crate) fn publish(&self, event: ChangeEvent) {
        let workspace_id = event.workspace_id.clone();
        let _ = self.broadcaster.publish(&workspace_id, event);
    }
}
