use super::{admin, board, home, items, note, whiteboard, workspace, Frame};
use crate::state::{State, View};
use ratatui::layout::Rect;

/// Render main widget according to state.
///
pub fn main(frame: &mut Frame, size: Rect, state: &mut State) {
    match state.current_view() {
        View::Home => home::home(frame, size, state),
        View::Workspace => workspace::workspace(frame, size, state),
        View::Items(kind) => items::items(frame, size, state, kind),
        View::Board => board::board(frame, size, state),
        View::Note => note::note(frame, size, state),
        View::Whiteboard => whiteboard::whiteboard(frame, size, state),
        View::Admin => admin::admin(frame, size, state),
    }
}
