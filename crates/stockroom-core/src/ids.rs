//! Branded ID newtypes for type safety.
//!
//! Every entity has a distinct ID type wrapping a `String`, so an item ID can
//! never be passed where a location ID is expected. New IDs are UUID v7
//! (time-ordered) generated via [`uuid::Uuid::now_v7`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

fn new_v7() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v7())
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Tenant boundary. Every other entity belongs to exactly one workspace.
    WorkspaceId
}

branded_id! {
    /// Item category (hierarchical).
    CategoryId
}

branded_id! {
    /// Physical location (room, shelf, ...), hierarchical.
    LocationId
}

branded_id! {
    /// Box, bin or drawer placed at a location.
    ContainerId
}

branded_id! {
    /// Catalog item (what a thing is).
    ItemId
}

branded_id! {
    /// Inventory record (how many of an item sit where).
    InventoryId
}

branded_id! {
    /// Label that can be attached to items.
    LabelId
}

branded_id! {
    /// Attachment linking a file or external reference to an item.
    AttachmentId
}

branded_id! {
    /// Uploaded file blob metadata.
    FileId
}

branded_id! {
    /// Immutable movement audit record.
    MovementId
}

branded_id! {
    /// Person who borrows inventory.
    BorrowerId
}

branded_id! {
    /// Loan of inventory to a borrower.
    LoanId
}
