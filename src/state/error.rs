//! State management-specific error types.

/// Errors that can occur during state operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// No workspace is open
    #[error("No workspace is open")]
    WorkspaceNotOpen,

    /// No item is open in the current view
    #[error("No item is open")]
    ItemNotOpen,

    /// Admin actions need an admin workspace
    #[error("This workspace has no admin rights")]
    NotAdmin,

    /// Nothing is selected for the requested action
    #[error("Nothing selected")]
    NothingSelected,

    /// Deadline input could not be parsed
    #[error("Invalid deadline '{0}': use dd/mm/yyyy or yyyy-mm-dd")]
    InvalidDeadline(String),

    /// Network thread is gone
    #[error("Failed to send request: {0}")]
    Dispatch(String),
}
