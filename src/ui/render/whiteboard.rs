use super::Frame;
use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Render a summary of the open whiteboard. Drawing needs a graphical
/// canvas, so the terminal only shows and renames it.
///
pub fn whiteboard(frame: &mut Frame, size: Rect, state: &State) {
    let whiteboard = match state.whiteboard() {
        Some(whiteboard) => whiteboard,
        None => {
            frame.render_widget(
                Paragraph::new("Loading whiteboard...")
                    .alignment(Alignment::Center)
                    .style(styling::muted_text_style()),
                size,
            );
            return;
        }
    };
    let updated = whiteboard
        .updated_at
        .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());
    let text = vec![
        Line::from(Span::styled(
            whiteboard.title.clone(),
            styling::active_block_title_style(),
        )),
        Line::from(""),
        Line::from(format!("{} drawn elements", whiteboard.element_count())),
        Line::from(Span::styled(
            format!("Last updated {}", updated),
            styling::muted_text_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Open this whiteboard in a graphical client to draw.",
            styling::muted_text_style(),
        )),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(styling::active_block_border_style()),
            ),
        size,
    );
}
