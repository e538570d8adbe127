//! Error types for the schema store

use formkit_schema::{EditError, ImportError, PathError};

use crate::persist::PersistError;

/// Main store error type
///
/// Every failed store call leaves schema, history and persisted state as
/// they were.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Structural edit rejected
    #[error("edit rejected: {0}")]
    Edit(#[from] EditError),

    /// Imported schema rejected
    #[error("schema rejected: {0}")]
    Validation(#[from] ImportError),

    /// Malformed field path
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    /// Persistence backend failed
    #[error("persistence failed: {0}")]
    Persist(#[from] PersistError),

    /// Render view could not be produced
    #[error("render failed: {0}")]
    Render(#[source] serde_json::Error),
}

impl StoreError {
    /// Check if a path or field did not resolve
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Edit(e) if e.is_not_found())
    }

    /// Check if a name collided with a sibling
    #[inline]
    #[must_use]
    pub fn is_name_conflict(&self) -> bool {
        matches!(self, Self::Edit(e) if e.is_name_conflict())
    }

    /// Check if user input was rejected (as opposed to a backend failure)
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Edit(_) | Self::Validation(_) | Self::Path(_))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
