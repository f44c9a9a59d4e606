//! Board-specific error types.

/// A move referenced an entity that is no longer where the move expected it,
/// usually because a remote snapshot changed the board mid-drag.
///
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Stale move: '{moved_id}' is not in {expected_in}")]
pub struct StaleMoveError {
    pub moved_id: String,
    pub expected_in: String,
}

impl StaleMoveError {
    pub fn new(moved_id: &str, expected_in: &str) -> StaleMoveError {
        StaleMoveError {
            moved_id: moved_id.to_owned(),
            expected_in: expected_in.to_owned(),
        }
    }
}

/// Errors that can occur while operating on a board.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// No board is loaded
    #[error("No board loaded")]
    NotLoaded,

    /// Column does not exist
    #[error("Column not found: {id}")]
    ColumnNotFound { id: String },

    /// Task does not exist
    #[error("Task not found: {id}")]
    TaskNotFound { id: String },

    /// Move no longer applies to the current board
    #[error(transparent)]
    StaleMove(#[from] StaleMoveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_error_display() {
        let error = BoardError::ColumnNotFound {
            id: "column-9".to_string(),
        };
        assert!(error.to_string().contains("column-9"));

        let error: BoardError = StaleMoveError::new("t1", "column A").into();
        assert!(matches!(error, BoardError::StaleMove(_)));
        assert!(error.to_string().contains("t1"));
        assert!(error.to_string().contains("column A"));
    }
}
