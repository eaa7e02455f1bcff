//! Route handlers, one module per resource.
//!
//! Every mutation publishes a [`stockroom_core::ChangeEvent`] after the
//! service call succeeds.

pub(crate) mod attachments;
pub(crate) mod borrowers;
pub(crate) mod categories;
pub(crate) mod containers;
pub(crate) mod events;
pub(crate) mod files;
pub(crate) mod inventory;
pub(crate) mod items;
pub(crate) mod labels;
pub(crate) mod loans;
pub(crate) mod locations;
pub(crate) mod movements;
pub(crate) mod workspaces;

use axum::Json;
use axum::http::StatusCode;
use serde::Deserialize;
use stockroom_core::PageRequest;

/// `?limit=&offset=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageQuery {
    pub(crate) fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.offset)
    }
}

/// `201 Created` with the entity as body.
pub(crate) fn created<T>(entity: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(entity))
}
