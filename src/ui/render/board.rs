use super::Frame;
use crate::board::{Bounds, ColumnZone, DragItem, DropLayout, DropTarget, TaskZone};
use crate::model::{Board, Task};
use crate::state::State;
use crate::ui::widgets::styling;
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const COLUMN_WIDTH: u16 = 30;
const CARD_HEIGHT: u16 = 4;
/// Rows at the top of a column that act as its drag handle: the titled
/// border and the card count line.
const HEADER_HEIGHT: u16 = 2;

/// Window of `count` slots of size `slot` that fits in `span`, scrolled so
/// that `selected` is visible. Returns the first visible index and how many
/// are shown.
///
fn visible_window(span: u16, slot: u16, count: usize, selected: usize) -> (usize, usize) {
    let fits = ((span / slot.max(1)) as usize).max(1);
    let shown = fits.min(count);
    let first = selected.min(count.saturating_sub(1)).saturating_sub(fits - 1);
    (first, shown)
}

/// Areas of the visible columns, keyed by their position in the board.
///
fn column_areas(area: Rect, count: usize, selected: usize) -> Vec<(usize, Rect)> {
    let (first, shown) = visible_window(area.width, COLUMN_WIDTH, count, selected);
    (0..shown)
        .map(|slot| {
            let x = area.x + slot as u16 * COLUMN_WIDTH;
            let width = COLUMN_WIDTH.min(area.right().saturating_sub(x));
            (
                first + slot,
                Rect {
                    x,
                    y: area.y,
                    width,
                    height: area.height,
                },
            )
        })
        .collect()
}

/// Areas of the visible cards inside a column body.
///
fn card_areas(body: Rect, count: usize, selected: usize) -> Vec<(usize, Rect)> {
    let (first, shown) = visible_window(body.height, CARD_HEIGHT, count, selected);
    (0..shown)
        .map(|slot| {
            let y = body.y + slot as u16 * CARD_HEIGHT;
            (
                first + slot,
                Rect {
                    x: body.x,
                    y,
                    width: body.width,
                    height: CARD_HEIGHT.min(body.bottom().saturating_sub(y)),
                },
            )
        })
        .filter(|(_, rect)| rect.height > 0)
        .collect()
}

/// Intersect drag bounds with the drawable area.
///
fn clip(bounds: Bounds, area: Rect) -> Option<Rect> {
    let left = bounds.x.max(area.x as i32);
    let top = bounds.y.max(area.y as i32);
    let right = (bounds.x + bounds.width).min(area.right() as i32);
    let bottom = (bounds.y + bounds.height).min(area.bottom() as i32);
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect {
        x: left as u16,
        y: top as u16,
        width: (right - left) as u16,
        height: (bottom - top) as u16,
    })
}

fn card_lines(task: &Task, now: DateTime<Utc>) -> Vec<Line<'static>> {
    let content = if task.content.trim().is_empty() {
        Span::styled("(empty card)", styling::muted_text_style())
    } else {
        Span::styled(task.content.clone(), styling::normal_text_style())
    };
    let mut meta = vec![];
    if let Some(assignee) = &task.assignee {
        meta.push(Span::styled(
            format!("@{} ", assignee),
            styling::info_text_style(),
        ));
    }
    if let Some(label) = task.deadline_label(now) {
        let style = if task.is_overdue(now) {
            styling::error_text_style()
        } else {
            styling::muted_text_style()
        };
        meta.push(Span::styled(label, style));
    }
    vec![Line::from(content), Line::from(meta)]
}

/// Render the open kanban board and record where every column and card
/// was drawn, so pointer drags can resolve their targets.
///
pub fn board(frame: &mut Frame, size: Rect, state: &mut State) {
    let board = match state.board() {
        Some(board) => board.clone(),
        None => {
            state.drop_layout_mut().clear();
            frame.render_widget(
                Paragraph::new("Loading board...")
                    .alignment(Alignment::Center)
                    .style(styling::muted_text_style()),
                size,
            );
            return;
        }
    };
    let selected_column = state.column_index();
    let selected_task = state.task_index();
    let dragged = state.drag().dragged().cloned().filter(|_| state.drag().is_dragging());
    let target = state.drag().target().cloned();
    let drag_bounds = state.drag().drag_bounds();
    let now = Utc::now();

    let title_block = Block::default()
        .title(Span::styled(
            format!(" {} ", board.title),
            styling::active_block_title_style(),
        ))
        .borders(Borders::TOP)
        .border_style(styling::normal_block_border_style());
    let area = title_block.inner(size);
    frame.render_widget(title_block, size);

    let columns: Vec<_> = board.ordered_columns().collect();
    if columns.is_empty() {
        state.drop_layout_mut().clear();
        frame.render_widget(
            Paragraph::new("No columns. Press n to add one.")
                .alignment(Alignment::Center)
                .style(styling::muted_text_style()),
            area,
        );
        return;
    }

    let mut layout = DropLayout::default();
    for (index, column_area) in column_areas(area, columns.len(), selected_column) {
        let column = columns[index];
        let is_selected = index == selected_column;
        let is_target = matches!(&target, Some(DropTarget::Column(id)) if *id == column.id);
        let is_dragged = matches!(&dragged, Some(DragItem::Column(id)) if *id == column.id);
        let border_style = if is_target {
            styling::drop_target_border_style()
        } else if is_dragged {
            styling::muted_text_style()
        } else if is_selected {
            styling::active_block_border_style()
        } else {
            styling::normal_block_border_style()
        };
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", column.title),
                styling::active_block_title_style(),
            ))
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(column_area);
        frame.render_widget(block, column_area);

        let tasks = board.tasks_in(&column.id);
        let count_line = Rect {
            height: inner.height.min(1),
            ..inner
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("{} cards", tasks.len()),
                styling::muted_text_style(),
            )),
            count_line,
        );
        let body = Rect {
            y: inner.y + count_line.height,
            height: inner.height - count_line.height,
            ..inner
        };

        let focus = if is_selected { selected_task } else { 0 };
        let mut zones = vec![];
        for (task_index, card_area) in card_areas(body, tasks.len(), focus) {
            let task = tasks[task_index];
            let is_card_selected = is_selected && task_index == selected_task;
            let is_card_target = matches!(&target, Some(DropTarget::Task(id)) if *id == task.id);
            let is_card_dragged = matches!(&dragged, Some(DragItem::Task(id)) if *id == task.id);
            let style = if is_card_target {
                styling::drop_target_border_style()
            } else if is_card_dragged {
                styling::muted_text_style()
            } else if is_card_selected {
                styling::active_block_border_style()
            } else {
                styling::normal_block_border_style()
            };
            frame.render_widget(
                Paragraph::new(card_lines(task, now)).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(style),
                ),
                card_area,
            );
            zones.push(TaskZone {
                task_id: task.id.clone(),
                bounds: card_area.into(),
            });
        }

        layout.columns.push(ColumnZone {
            column_id: column.id.clone(),
            bounds: column_area.into(),
            header: Rect {
                height: HEADER_HEIGHT.min(column_area.height),
                ..column_area
            }
            .into(),
            tasks: zones,
        });
    }

    if let (Some(item), Some(bounds)) = (&dragged, drag_bounds) {
        if let Some(ghost) = clip(bounds, size) {
            render_ghost(frame, ghost, item, &board);
        }
    }
    *state.drop_layout_mut() = layout;
}

fn render_ghost(frame: &mut Frame, area: Rect, item: &DragItem, board: &Board) {
    let label = match item {
        DragItem::Column(id) => board
            .columns
            .get(id)
            .map(|c| c.title.clone())
            .unwrap_or_default(),
        DragItem::Task(id) => board
            .tasks
            .get(id)
            .map(|t| t.content.clone())
            .unwrap_or_default(),
    };
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(label)
            .style(styling::drag_ghost_style())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(styling::drop_target_border_style()),
            ),
        area,
    );
}
