//! Workspace-specific error types.

use super::ValidationError;
use crate::store::StoreError;

/// Errors that can occur while opening or managing workspaces and items.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// Input rejected before reaching the store
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Workspace '{id}' does not exist")]
    NotFound { id: String },

    #[error("Workspace '{id}' already exists")]
    AlreadyExists { id: String },

    #[error("Workspace '{id}' is locked")]
    Locked { id: String },

    #[error("Wrong password")]
    WrongPassword,

    #[error("Item '{id}' does not exist")]
    ItemNotFound { id: String },

    /// Stored record could not be decoded
    #[error("Failed to decode record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
