//! Domain error type shared by entities, repositories and services.
//!
//! The HTTP layer maps each variant to a status code, so the variants are
//! deliberately coarse: callers match on the kind, not on the message.

use thiserror::Error;

/// Errors produced by the domain layer.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input failed an entity or service invariant.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Offending field (or `"reference"` for cross-entity checks).
        field: String,
        /// Human-readable reason.
        message: String,
    },

    /// Entity does not exist in the requested workspace.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"item"`.
        entity: &'static str,
        /// The ID that was looked up.
        id: String,
    },

    /// Operation conflicts with current state (uniqueness, dependents, status).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence or blob storage failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Build a [`DomainError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a [`DomainError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Build a [`DomainError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Machine-readable code for this variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_FAILED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// Convenience type alias for domain results.
pub type Result<T> = std::result::Result<T, DomainError>;
