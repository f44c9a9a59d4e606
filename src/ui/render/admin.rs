use super::Frame;
use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

fn flag(set: bool, label: &'static str) -> Span<'static> {
    if set {
        Span::styled(label, styling::info_text_style())
    } else {
        Span::styled(label, styling::muted_text_style())
    }
}

/// Render every workspace with its lock and admin flags.
///
pub fn admin(frame: &mut Frame, size: Rect, state: &mut State) {
    let block = Block::default()
        .title(Span::styled(" Workspaces ", styling::active_block_title_style()))
        .borders(Borders::ALL)
        .border_style(styling::active_block_border_style());
    if state.admin_workspaces().is_empty() {
        frame.render_widget(
            Paragraph::new("No workspaces loaded. Press r to refresh.")
                .alignment(Alignment::Center)
                .style(styling::muted_text_style())
                .block(block),
            size,
        );
        return;
    }
    let rows: Vec<ListItem> = state
        .admin_workspaces()
        .iter()
        .map(|workspace| {
            let created = workspace
                .created_at
                .map(|t| t.format("%d/%m/%Y").to_string())
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<24}", workspace.id), styling::normal_text_style()),
                flag(workspace.is_locked, " locked "),
                flag(workspace.is_admin, " admin "),
                flag(workspace.password.is_some(), " password "),
                Span::styled(format!(" {}", created), styling::muted_text_style()),
            ]))
        })
        .collect();
    let list = List::new(rows)
        .block(block)
        .highlight_style(styling::active_list_item_style())
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, size, state.admin_list_state_mut());
}
