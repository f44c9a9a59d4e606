use super::Frame;
use crate::state::{HomeField, State};
use crate::ui::widgets::styling;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const FORM_WIDTH: u16 = 50;
const FORM_HEIGHT: u16 = 11;

/// Render the workspace id and password form.
///
pub fn home(frame: &mut Frame, size: Rect, state: &State) {
    let form = state.home_form();
    let area = centered(size, FORM_WIDTH, FORM_HEIGHT);
    let block = Block::default()
        .title(Span::styled(
            " Open a workspace ",
            styling::active_block_title_style(),
        ))
        .borders(Borders::ALL)
        .border_style(styling::active_block_border_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let masked = "*".repeat(form.password.value().chars().count());
    field(
        frame,
        rows[0],
        "Workspace",
        form.workspace_id.value(),
        form.field == HomeField::WorkspaceId,
    );
    field(
        frame,
        rows[1],
        "Password (optional)",
        &masked,
        form.field == HomeField::Password,
    );
    if let Some(error) = &form.error {
        frame.render_widget(
            Paragraph::new(Span::styled(error.as_str(), styling::error_text_style()))
                .alignment(Alignment::Center),
            rows[2],
        );
    }
}

fn field(frame: &mut Frame, size: Rect, title: &str, value: &str, is_active: bool) {
    let border_style = if is_active {
        styling::active_block_border_style()
    } else {
        styling::normal_block_border_style()
    };
    let cursor = if is_active { "_" } else { "" };
    let paragraph = Paragraph::new(Line::from(vec![
        Span::raw(value.to_owned()),
        Span::styled(cursor, styling::active_list_item_style()),
    ]))
    .block(
        Block::default()
            .title(title.to_owned())
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(paragraph, size);
}

/// Return a rect of at most the given size centered in `r`.
///
pub fn centered(r: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}
