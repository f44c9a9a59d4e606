use super::Frame;
use crate::state::{NoteField, State, View};
use crate::sync::SyncStatus;
use crate::ui::widgets::styling;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

/// Key hints for the current view.
///
fn hints(state: &State) -> &'static str {
    if state.confirm().is_some() {
        return " y: confirm  n/Esc: cancel";
    }
    if state.prompt().is_some() {
        return " Enter: save  Tab: next field  Esc: cancel";
    }
    match state.current_view() {
        View::Home => " Enter: open  Ctrl+N: create  Tab: switch field  Esc: quit",
        View::Workspace => " j/k: navigate  Enter: open  ?: log  Esc: close workspace  q: quit",
        View::Items(_) => " j/k: navigate  Enter: open  a: new  d: delete  Esc: back  q: quit",
        View::Board => {
            " h/j/k/l: select  H/J/K/L: move card  </>: move column  a: card  n: column  \
             e: edit  r: rename column  t: title  d/D: delete  R: retry  drag with mouse  Esc: back"
        }
        View::Note => match state.note_editor().map(|n| n.focus()) {
            Some(NoteField::Title) => " Type the title  Enter/Tab: edit content  Esc: back",
            _ => " Type to edit  Tab: edit title  Esc: back",
        },
        View::Whiteboard => " t: rename  R: retry  Esc: back  q: quit",
        View::Admin => " j/k: navigate  l: lock  a: admin  d: delete  r: refresh  Esc: back",
    }
}

fn status_style(status: SyncStatus) -> Style {
    match status {
        SyncStatus::Saved => styling::info_text_style(),
        SyncStatus::Unsaved | SyncStatus::Discarded => styling::error_text_style(),
        _ => styling::muted_text_style(),
    }
}

/// Render footer widget: sync status, status message and key hints.
///
pub fn footer(frame: &mut Frame, size: Rect, state: &State) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(size);

    let mut spans = vec![];
    if let Some(status) = state.open_item_status() {
        spans.push(Span::styled(format!(" [{}]", status), status_style(status)));
    }
    if let Some(line) = state.status_line() {
        let style = if line.is_error {
            styling::error_text_style()
        } else {
            styling::info_text_style()
        };
        spans.push(Span::styled(format!(" {}", line.message), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[0]);
    frame.render_widget(
        Paragraph::new(Span::styled(hints(state), styling::muted_text_style())),
        rows[1],
    );
}
