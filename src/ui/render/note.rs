use super::Frame;
use crate::state::{NoteField, State};
use crate::ui::widgets::styling;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Render the note editor: title line, content area and tags.
///
pub fn note(frame: &mut Frame, size: Rect, state: &mut State) {
    let editor = match state.note_editor_mut() {
        Some(editor) => editor,
        None => {
            frame.render_widget(
                Paragraph::new("Loading note...")
                    .alignment(Alignment::Center)
                    .style(styling::muted_text_style()),
                size,
            );
            return;
        }
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(size);

    let focus = editor.focus();
    let border = |field: NoteField| {
        if focus == field {
            styling::active_block_border_style()
        } else {
            styling::normal_block_border_style()
        }
    };

    let cursor = if focus == NoteField::Title { "_" } else { "" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(editor.title().to_owned(), styling::active_block_title_style()),
            Span::styled(cursor, styling::active_list_item_style()),
        ]))
        .block(
            Block::default()
                .title("Title")
                .borders(Borders::ALL)
                .border_style(border(NoteField::Title)),
        ),
        rows[0],
    );

    let tags = if editor.tags().is_empty() {
        String::new()
    } else {
        format!(" #{}", editor.tags().join(" #"))
    };
    let content_border = border(NoteField::Content);
    let area = editor.content_area_mut();
    area.set_block(
        Block::default()
            .title("Content")
            .borders(Borders::ALL)
            .border_style(content_border),
    );
    frame.render_widget(area.widget(), rows[1]);
    frame.render_widget(
        Paragraph::new(Span::styled(tags, styling::muted_text_style())),
        rows[2],
    );
}
