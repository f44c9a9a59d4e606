//! Kanban board subsystem.
//!
//! This module contains the pieces behind drag-and-drop reordering:
//! - `BoardStore` holds the open board and applies optimistic patches
//! - `DragController` turns pointer input into move instructions
//! - `resolver` computes new orderings without touching the board

mod drag;
mod error;
mod geometry;
pub mod resolver;
mod store;

pub use drag::{
    nudge, Direction, DragController, DragItem, DragOutcome, DropTarget, MoveInstruction,
    DEFAULT_ACTIVATION_DISTANCE,
};
pub use error::{BoardError, StaleMoveError};
pub use geometry::{Bounds, ColumnZone, DropLayout, Point, TaskZone};
pub use store::BoardStore;
