use super::Frame;
use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

const BANNER: &str = " syncho ";

/// Render the title bar: banner, workspace and current view.
///
pub fn header(frame: &mut Frame, size: Rect, state: &State) {
    let mut spans = vec![Span::styled(BANNER, styling::banner_style())];
    if let Some(workspace) = state.workspace() {
        spans.push(Span::raw(format!(" {} ", workspace.name)));
        if workspace.is_locked {
            spans.push(Span::styled("[locked] ", styling::muted_text_style()));
        }
        if workspace.is_admin {
            spans.push(Span::styled("[admin] ", styling::muted_text_style()));
        }
        spans.push(Span::styled("› ", styling::muted_text_style()));
    }
    spans.push(Span::styled(
        state.current_view().title(),
        styling::active_block_title_style(),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), size);
}
