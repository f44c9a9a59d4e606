use super::{footer, header, log, main, popup, Frame};
use crate::state::State;
use ratatui::layout::{Constraint, Direction, Layout};

const HEADER_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 2;
const LOG_HEIGHT: u16 = 8;

/// Render all widgets according to state.
///
pub fn all(frame: &mut Frame, state: &mut State) {
    let size = frame.size();
    let mut constraints = vec![Constraint::Length(HEADER_HEIGHT), Constraint::Min(0)];
    if state.is_log_visible() {
        constraints.push(Constraint::Length(LOG_HEIGHT));
    }
    constraints.push(Constraint::Length(FOOTER_HEIGHT));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(size);

    header(frame, rows[0], state);
    main(frame, rows[1], state);
    if state.is_log_visible() {
        log(frame, rows[2], state);
    }
    footer(frame, rows[rows.len() - 1], state);
    popup(frame, rows[1], state);
}
