use super::Frame;
use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, List, ListItem},
};

/// Render the workspace menu.
///
pub fn workspace(frame: &mut Frame, size: Rect, state: &mut State) {
    let items: Vec<ListItem> = state
        .menu_entries()
        .iter()
        .map(|entry| ListItem::new(Span::raw(entry.label())))
        .collect();
    let title = state
        .workspace()
        .map(|w| format!(" {} ", w.name))
        .unwrap_or_default();
    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(title, styling::active_block_title_style()))
                .borders(Borders::ALL)
                .border_style(styling::active_block_border_style()),
        )
        .highlight_style(styling::active_list_item_style())
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, size, state.menu_list_state_mut());
}
