use super::home::centered;
use super::Frame;
use crate::state::{CardField, Prompt, State};
use crate::ui::widgets::styling;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const POPUP_WIDTH: u16 = 60;

fn input_line(label: &str, value: &str, is_active: bool) -> Line<'static> {
    let style = if is_active {
        styling::active_list_item_style()
    } else {
        styling::normal_text_style()
    };
    let cursor = if is_active { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{:<10}", label), styling::muted_text_style()),
        Span::styled(value.to_owned(), style),
        Span::styled(cursor, styling::active_list_item_style()),
    ])
}

/// Render the open prompt or confirmation on top of the main view.
///
pub fn popup(frame: &mut Frame, size: Rect, state: &State) {
    if let Some(confirm) = state.confirm() {
        let area = centered(size, POPUP_WIDTH, 5);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(Span::styled(
                confirm.question(),
                styling::active_block_title_style(),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(" Confirm ")
                    .borders(Borders::ALL)
                    .border_style(styling::drop_target_border_style()),
            ),
            area,
        );
        return;
    }
    let prompt = match state.prompt() {
        Some(prompt) => prompt,
        None => return,
    };
    let lines = match prompt {
        Prompt::RenameBoard(input) | Prompt::RenameWhiteboard(input) => {
            vec![input_line("Title", input.value(), true)]
        }
        Prompt::RenameColumn { input, .. } => vec![input_line("Title", input.value(), true)],
        Prompt::EditCard(form) => vec![
            input_line(
                "Content",
                form.content.value(),
                form.field == CardField::Content,
            ),
            input_line(
                "Assignee",
                form.assignee.value(),
                form.field == CardField::Assignee,
            ),
            input_line(
                "Deadline",
                form.deadline.value(),
                form.field == CardField::Deadline,
            ),
        ],
    };
    let area = centered(size, POPUP_WIDTH, lines.len() as u16 + 2);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(format!(" {} ", prompt.title()))
                .borders(Borders::ALL)
                .border_style(styling::active_block_border_style()),
        ),
        area,
    );
}
