//! Application-wide error types.
//!
//! Every module keeps its own `thiserror` enum; this module folds them into
//! a single top-level type for the binary boundary.

pub use crate::board::BoardError;
pub use crate::config::ConfigError;
pub use crate::state::StateError;
pub use crate::store::StoreError;
pub use crate::workspace::WorkspaceError;

/// Main application error type.
///
/// This is the top-level error type that encompasses all error types
/// in the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Document store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Board editing errors
    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    /// Workspace and item errors
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// State management errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Logger initialization errors
    #[error("Logger error: {0}")]
    Logger(String),

    /// Runtime creation errors
    #[error("Failed to create runtime: {0}")]
    RuntimeCreation(String),
}

/// Convenience type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::StaleMoveError;
    use crate::workspace::ValidationError;

    #[test]
    fn test_app_error_from_config_error() {
        let config_error = ConfigError::StoreNotConfigured;
        let app_error: AppError = config_error.into();
        assert!(matches!(app_error, AppError::Config(_)));
        assert!(app_error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_app_error_from_store_error() {
        let app_error: AppError = StoreError::Closed.into();
        assert!(matches!(app_error, AppError::Store(_)));
        assert!(app_error.to_string().contains("Store error"));
    }

    #[test]
    fn test_app_error_from_board_error() {
        let board_error: BoardError = StaleMoveError::new("t1", "A").into();
        let app_error: AppError = board_error.into();
        assert!(matches!(app_error, AppError::Board(_)));
        assert!(app_error.to_string().contains("t1"));
    }

    #[test]
    fn test_app_error_from_workspace_error() {
        let workspace_error: WorkspaceError = ValidationError::ContainsSlash.into();
        let app_error: AppError = workspace_error.into();
        assert!(matches!(app_error, AppError::Workspace(_)));
        assert!(app_error.to_string().contains("'/'"));
    }

    #[test]
    fn test_app_error_from_state_error() {
        let state_error = StateError::WorkspaceNotOpen;
        let app_error: AppError = state_error.into();
        assert!(matches!(app_error, AppError::State(_)));
        assert!(app_error.to_string().contains("State error"));
    }

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        assert!(matches!(app_error, AppError::Io(_)));
        assert!(app_error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_app_error_terminal() {
        let error = AppError::Terminal("Terminal error".to_string());
        assert!(error.to_string().contains("Terminal error"));
    }
}
