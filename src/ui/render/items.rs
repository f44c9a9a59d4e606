use super::Frame;
use crate::model::{BoardSummary, ItemKind, Note, Whiteboard};
use crate::state::State;
use crate::store::Document;
use crate::ui::widgets::styling;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

const PREVIEW_LENGTH: usize = 40;

/// Title and one-line summary of a listed item.
///
fn describe(kind: ItemKind, document: &Document) -> (String, String) {
    match kind {
        ItemKind::Kanban => {
            let summary = BoardSummary::from_document(document);
            (
                summary.title,
                format!(
                    "{} columns, {} cards",
                    summary.column_count, summary.task_count
                ),
            )
        }
        ItemKind::Note => match Note::from_document(document) {
            Ok(note) => {
                let preview: String = note
                    .content
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .chars()
                    .take(PREVIEW_LENGTH)
                    .collect();
                let tags = if note.tags.is_empty() {
                    String::new()
                } else {
                    format!(" #{}", note.tags.join(" #"))
                };
                (note.title, format!("{}{}", preview, tags))
            }
            Err(_) => (document.id.clone(), "unreadable".to_string()),
        },
        ItemKind::Whiteboard => match Whiteboard::from_document(document) {
            Ok(whiteboard) => (
                whiteboard.title.clone(),
                format!("{} elements", whiteboard.element_count()),
            ),
            Err(_) => (document.id.clone(), "unreadable".to_string()),
        },
    }
}

/// Render the live list of one item kind, newest first.
///
pub fn items(frame: &mut Frame, size: Rect, state: &mut State, kind: ItemKind) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", state.current_view().title()),
            styling::active_block_title_style(),
        ))
        .borders(Borders::ALL)
        .border_style(styling::active_block_border_style());

    let documents = state.items(kind);
    if documents.is_empty() {
        let text = Paragraph::new(format!(
            "No {} yet. Press a to create one.",
            state.current_view().title().to_lowercase()
        ))
            .block(block)
            .alignment(Alignment::Center)
            .style(styling::muted_text_style());
        frame.render_widget(text, size);
        return;
    }

    let rows: Vec<ListItem> = documents
        .iter()
        .map(|document| {
            let (title, detail) = describe(kind, document);
            let title = if title.trim().is_empty() {
                "Untitled".to_string()
            } else {
                title
            };
            let created = document
                .create_time
                .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(title, styling::current_list_item_style()),
                Span::raw("  "),
                Span::styled(detail, styling::normal_text_style()),
                Span::raw("  "),
                Span::styled(created, styling::muted_text_style()),
            ]))
        })
        .collect();
    let list = List::new(rows)
        .block(block)
        .highlight_style(styling::active_list_item_style())
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, size, state.items_list_state_mut());
}
