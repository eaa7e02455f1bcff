//! # stockroom-store
//!
//! `SQLite` persistence for the Stockroom domain, plus the filesystem blob
//! store behind file attachments.
//!
//! - [`Database`]: pooled, migrated connection handle (`r2d2` + `rusqlite`).
//! - [`repositories`]: one `Sqlite*Repository` per domain repository trait.
//! - [`FilesystemStorage`]: [`FileStorage`](stockroom_core::attachment::FileStorage)
//!   backed by a directory.
//! - [`Repositories`]: every repository behind an `Arc<dyn ...>`, ready to hand
//!   to the domain services.

#![deny(unsafe_code)]

pub mod connection;
pub mod database;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod row_helpers;
pub mod storage;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use stockroom_core::attachment::{AttachmentRepository, FileRepository};
use stockroom_core::borrower::BorrowerRepository;
use stockroom_core::category::CategoryRepository;
use stockroom_core::container::ContainerRepository;
use stockroom_core::inventory::InventoryRepository;
use stockroom_core::item::ItemRepository;
use stockroom_core::label::LabelRepository;
use stockroom_core::loan::LoanRepository;
use stockroom_core::location::LocationRepository;
use stockroom_core::movement::MovementRepository;
use stockroom_core::workspace::WorkspaceRepository;

pub use connection::ConnectionConfig;
pub use database::Database;
pub use errors::StoreError;
pub use storage::FilesystemStorage;

use repositories::{
    SqliteAttachmentRepository, SqliteBorrowerRepository, SqliteCategoryRepository,
    SqliteContainerRepository, SqliteFileRepository, SqliteInventoryRepository,
    SqliteItemRepository, SqliteLabelRepository, SqliteLoanRepository, SqliteLocationRepository,
    SqliteMovementRepository, SqliteWorkspaceRepository,
};

/// All repositories over one database, as trait objects.
#[derive(Clone)]
pub struct Repositories {
    /// Workspaces.
    pub workspaces: Arc<dyn WorkspaceRepository>,
    /// Categories.
    pub categories: Arc<dyn CategoryRepository>,
    /// Locations.
    pub locations: Arc<dyn LocationRepository>,
    /// Containers.
    pub containers: Arc<dyn ContainerRepository>,
    /// Items.
    pub items: Arc<dyn ItemRepository>,
    /// Inventory records.
    pub inventory: Arc<dyn InventoryRepository>,
    /// Labels.
    pub labels: Arc<dyn LabelRepository>,
    /// File metadata.
    pub files: Arc<dyn FileRepository>,
    /// Attachments.
    pub attachments: Arc<dyn AttachmentRepository>,
    /// Movements.
    pub movements: Arc<dyn MovementRepository>,
    /// Borrowers.
    pub borrowers: Arc<dyn BorrowerRepository>,
    /// Loans.
    pub loans: Arc<dyn LoanRepository>,
}

impl Repositories {
    /// Build every repository over `db`.
    pub fn new(db: &Database) -> Self {
        Self {
            workspaces: Arc::new(SqliteWorkspaceRepository::new(db.clone())),
            categories: Arc::new(SqliteCategoryRepository::new(db.clone())),
            locations: Arc::new(SqliteLocationRepository::new(db.clone())),
            containers: Arc::new(SqliteContainerRepository::new(db.clone())),
            items: Arc::new(SqliteItemRepository::new(db.clone())),
            inventory: Arc::new(SqliteInventoryRepository::new(db.clone())),
            labels: Arc::new(SqliteLabelRepository::new(db.clone())),
            files: Arc::new(SqliteFileRepository::new(db.clone())),
            attachments: Arc::new(SqliteAttachmentRepository::new(db.clone())),
            movements: Arc::new(SqliteMovementRepository::new(db.clone())),
            borrowers: Arc::new(SqliteBorrowerRepository::new(db.clone())),
            loans: Arc::new(SqliteLoanRepository::new(db.clone())),
        }
    }
}
