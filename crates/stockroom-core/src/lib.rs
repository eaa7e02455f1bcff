//! # stockroom-core
//!
//! Domain layer of the Stockroom inventory tracker.
//!
//! Every domain concept lives in its own module and follows the same shape:
//!
//! - **Entity**: a validated domain object. Constructors and mutators reject
//!   invalid input with [`DomainError::Validation`].
//! - **Repository trait**: the persistence seam. All lookups are scoped to a
//!   [`WorkspaceId`]; the `SQLite` implementations live in `stockroom-store`.
//! - **Service**: orchestrates one or more repositories and enforces the
//!   cross-entity rules (primary attachment, loan/stock status, movements).
//!
//! [`events::ChangeEvent`] is the workspace-scoped notification the HTTP layer
//! publishes after each successful mutation.

#![deny(unsafe_code)]

#[macro_use]
mod enums;

pub mod attachment;
pub mod borrower;
pub mod category;
pub mod container;
pub mod errors;
pub mod events;
pub mod hierarchy;
pub mod ids;
pub mod inventory;
pub mod item;
pub mod label;
pub mod loan;
pub mod location;
pub mod movement;
pub mod pagination;
pub mod patch;
pub mod validate;
pub mod workspace;

pub use errors::{DomainError, Result};
pub use events::ChangeEvent;
pub use ids::{
    AttachmentId, BorrowerId, CategoryId, ContainerId, FileId, InventoryId, ItemId, LabelId,
    LoanId, LocationId, MovementId, WorkspaceId,
};
pub use pagination::{Page, PageRequest};
