//! Domain error types shared by the goal, tracking, profile and journal stores.

use thiserror::Error;
use uuid::Uuid;

use crate::goals::progress::ProgressError;

/// Errors raised by dashboard operations.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Input was malformed or violated a constraint. `field` names the first
    /// offending field so the API can report it verbatim.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// A leaf mutation addressed a stale index.
    #[error(transparent)]
    Progress(#[from] ProgressError),

    /// Stored data violates an internal invariant.
    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Result type for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;
