//! `SQLite` implementations of the domain repository traits.
//!
//! Every query is scoped by `workspace_id`; a row from another workspace is
//! indistinguishable from a missing one.

mod attachment;
mod borrower;
mod category;
mod container;
mod file;
mod inventory;
mod item;
mod label;
mod loan;
mod location;
mod movement;
mod workspace;

pub use attachment::SqliteAttachmentRepository;
pub use borrower::SqliteBorrowerRepository;
pub use category::SqliteCategoryRepository;
pub use container::SqliteContainerRepository;
pub use file::SqliteFileRepository;
pub use inventory::SqliteInventoryRepository;
pub use item::SqliteItemRepository;
pub use label::SqliteLabelRepository;
pub use loan::SqliteLoanRepository;
pub use location::SqliteLocationRepository;
pub use movement::SqliteMovementRepository;
pub use workspace::SqliteWorkspaceRepository;
