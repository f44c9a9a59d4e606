//! Drag session state machine.
//!
//! A session starts with a press on a drag handle (a card or a column
//! header), activates once the pointer travels the activation distance and
//! ends with a drop or a cancel. Nothing on the board changes while a drag is
//! in flight; the only output is the `MoveInstruction` produced on drop.

use super::geometry::{Bounds, DropLayout, Point};
use crate::model::Board;
use log::*;

/// Default pointer travel, in cells, before a press becomes a drag.
///
pub const DEFAULT_ACTIVATION_DISTANCE: u16 = 2;

/// Entity being dragged.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragItem {
    Column(String),
    Task(String),
}

impl DragItem {
    pub fn id(&self) -> &str {
        match self {
            DragItem::Column(id) | DragItem::Task(id) => id,
        }
    }
}

/// Candidate the dragged entity is currently over.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropTarget {
    Column(String),
    Task(String),
}

/// Placement resolved from a finished drag (or a keyboard move).
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveInstruction {
    Column {
        moved_id: String,
        dest_index: i64,
    },
    Task {
        moved_id: String,
        source_column: String,
        dest_column: String,
        dest_index: i64,
    },
}

/// How a drag session ended.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    /// Released before activation.
    Click(DragItem),
    Dropped(MoveInstruction),
    Cancelled,
}

/// Keyboard move directions.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Debug, PartialEq)]
enum Phase {
    Idle,
    Pressed {
        item: DragItem,
        origin: Point,
        bounds: Bounds,
    },
    Dragging {
        item: DragItem,
        origin: Point,
        bounds: Bounds,
        pointer: Point,
        target: Option<DropTarget>,
    },
}

/// Tracks one pointer drag at a time.
///
#[derive(Clone, Debug, PartialEq)]
pub struct DragController {
    activation_distance: f64,
    phase: Phase,
}

impl Default for DragController {
    fn default() -> Self {
        DragController::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

impl DragController {
    pub fn new(activation_distance: u16) -> DragController {
        DragController {
            activation_distance: activation_distance as f64,
            phase: Phase::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// Entity of an active drag.
    ///
    pub fn dragged(&self) -> Option<&DragItem> {
        match &self.phase {
            Phase::Dragging { item, .. } => Some(item),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&DropTarget> {
        match &self.phase {
            Phase::Dragging { target, .. } => target.as_ref(),
            _ => None,
        }
    }

    /// Rectangle of the dragged entity at the current pointer position.
    ///
    pub fn drag_bounds(&self) -> Option<Bounds> {
        match &self.phase {
            Phase::Dragging {
                origin,
                bounds,
                pointer,
                ..
            } => Some(bounds.translate(pointer.x - origin.x, pointer.y - origin.y)),
            _ => None,
        }
    }

    /// Begin a session with a press on a drag handle drawn at `bounds`.
    ///
    pub fn press(&mut self, item: DragItem, at: Point, bounds: Bounds) {
        self.phase = Phase::Pressed {
            item,
            origin: at,
            bounds,
        };
    }

    /// Track pointer movement. Returns whether the drag view changed.
    ///
    pub fn pointer_move(&mut self, at: Point, layout: &DropLayout) -> bool {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        let (next, changed) = match phase {
            Phase::Idle => (Phase::Idle, false),
            Phase::Pressed {
                item,
                origin,
                bounds,
            } => {
                if origin.distance(&at) >= self.activation_distance {
                    debug!("Drag activated for {:?}.", item);
                    let target = closest_target(&item, origin, bounds, at, layout);
                    (
                        Phase::Dragging {
                            item,
                            origin,
                            bounds,
                            pointer: at,
                            target,
                        },
                        true,
                    )
                } else {
                    (
                        Phase::Pressed {
                            item,
                            origin,
                            bounds,
                        },
                        false,
                    )
                }
            }
            Phase::Dragging {
                item,
                origin,
                bounds,
                pointer,
                target,
            } => {
                let new_target = closest_target(&item, origin, bounds, at, layout);
                let changed = pointer != at || new_target != target;
                (
                    Phase::Dragging {
                        item,
                        origin,
                        bounds,
                        pointer: at,
                        target: new_target,
                    },
                    changed,
                )
            }
        };
        self.phase = next;
        changed
    }

    /// End the session at `at`. Returns `None` when no session was active.
    ///
    pub fn release(&mut self, at: Point, layout: &DropLayout, board: &Board) -> Option<DragOutcome> {
        self.pointer_move(at, layout);
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => None,
            Phase::Pressed { item, .. } => Some(DragOutcome::Click(item)),
            Phase::Dragging { item, target, .. } => {
                let outcome = match target {
                    Some(target) => resolve_drop(&item, &target, layout, board)
                        .map(DragOutcome::Dropped)
                        .unwrap_or(DragOutcome::Cancelled),
                    None => DragOutcome::Cancelled,
                };
                debug!("Drag of {:?} ended: {:?}", item, outcome);
                Some(outcome)
            }
        }
    }

    /// Abort the session. Returns `Cancelled` when a drag was active.
    ///
    pub fn cancel(&mut self) -> Option<DragOutcome> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Dragging { .. } => Some(DragOutcome::Cancelled),
            _ => None,
        }
    }
}

/// Pick the candidate whose rectangle's corners lie closest to the dragged
/// rectangle's corners. Ties keep the earliest candidate.
///
fn closest_target(
    item: &DragItem,
    origin: Point,
    bounds: Bounds,
    pointer: Point,
    layout: &DropLayout,
) -> Option<DropTarget> {
    let dragged = bounds.translate(pointer.x - origin.x, pointer.y - origin.y);
    let candidates: Vec<(DropTarget, Bounds)> = match item {
        DragItem::Task(task_id) => match layout.column_at(pointer) {
            Some(zone) => std::iter::once((DropTarget::Column(zone.column_id.clone()), zone.bounds))
                .chain(
                    zone.tasks
                        .iter()
                        .filter(|task| &task.task_id != task_id)
                        .map(|task| (DropTarget::Task(task.task_id.clone()), task.bounds)),
                )
                .collect(),
            None => vec![],
        },
        DragItem::Column(_) => layout
            .columns
            .iter()
            .map(|zone| (DropTarget::Column(zone.column_id.clone()), zone.bounds))
            .collect(),
    };

    let mut best: Option<(DropTarget, f64)> = None;
    for (target, candidate) in candidates {
        let distance = dragged.corner_distance(&candidate);
        let closer = best.as_ref().map(|(_, d)| distance < *d).unwrap_or(true);
        if closer {
            best = Some((target, distance));
        }
    }
    best.map(|(target, _)| target)
}

/// Column a task belongs to, preferring the current board over the layout of
/// the last frame.
///
fn owning_column(task_id: &str, layout: &DropLayout, board: &Board) -> Option<String> {
    board.column_of(task_id).map(str::to_owned).or_else(|| {
        layout
            .columns
            .iter()
            .find(|zone| zone.tasks.iter().any(|t| t.task_id == task_id))
            .map(|zone| zone.column_id.clone())
    })
}

/// Turn a drop on a target into a placement. Dropping a column on itself is
/// a no-op and yields `None`.
///
fn resolve_drop(
    item: &DragItem,
    target: &DropTarget,
    layout: &DropLayout,
    board: &Board,
) -> Option<MoveInstruction> {
    match item {
        DragItem::Column(moved_id) => {
            let over = match target {
                DropTarget::Column(id) => id.clone(),
                DropTarget::Task(id) => owning_column(id, layout, board)?,
            };
            if &over == moved_id {
                return None;
            }
            let dest_index = board.column_index(&over)?;
            Some(MoveInstruction::Column {
                moved_id: moved_id.clone(),
                dest_index: dest_index as i64,
            })
        }
        DragItem::Task(moved_id) => {
            let source_column = owning_column(moved_id, layout, board)?;
            let (dest_column, dest_index) = match target {
                DropTarget::Task(over_id) => {
                    let dest_column = owning_column(over_id, layout, board)?;
                    let index = board
                        .columns
                        .get(&dest_column)
                        .and_then(|c| c.task_ids.iter().position(|id| id == over_id))?;
                    (dest_column, index as i64)
                }
                DropTarget::Column(column_id) => {
                    let len = board.columns.get(column_id)?.task_ids.len();
                    (column_id.clone(), len as i64)
                }
            };
            Some(MoveInstruction::Task {
                moved_id: moved_id.clone(),
                source_column,
                dest_column,
                dest_index,
            })
        }
    }
}

/// Keyboard equivalent of a drag: move the item one step in a direction.
/// Columns move left and right; tasks move up and down within their column
/// or into the neighbouring column (appended at the end).
///
pub fn nudge(board: &Board, item: &DragItem, direction: Direction) -> Option<MoveInstruction> {
    match item {
        DragItem::Column(moved_id) => {
            let index = board.column_index(moved_id)? as i64;
            let dest_index = match direction {
                Direction::Left if index > 0 => index - 1,
                Direction::Right if (index as usize) + 1 < board.column_count() => index + 1,
                _ => return None,
            };
            Some(MoveInstruction::Column {
                moved_id: moved_id.clone(),
                dest_index,
            })
        }
        DragItem::Task(moved_id) => {
            let source_column = board.column_of(moved_id)?.to_owned();
            let column_index = board.column_index(&source_column)?;
            let position = board.columns.get(&source_column)?
                .task_ids
                .iter()
                .position(|id| id == moved_id)?;
            let (dest_column, dest_index) = match direction {
                Direction::Up if position > 0 => (source_column.clone(), position as i64 - 1),
                Direction::Down
                    if position + 1 < board.columns.get(&source_column)?.task_ids.len() =>
                {
                    (source_column.clone(), position as i64 + 1)
                }
                Direction::Left if column_index > 0 => {
                    let dest = board.column_order[column_index - 1].clone();
                    let len = board.columns.get(&dest)?.task_ids.len() as i64;
                    (dest, len)
                }
                Direction::Right if column_index + 1 < board.column_count() => {
                    let dest = board.column_order[column_index + 1].clone();
                    let len = board.columns.get(&dest)?.task_ids.len() as i64;
                    (dest, len)
                }
                _ => return None,
            };
            Some(MoveInstruction::Task {
                moved_id: moved_id.clone(),
                source_column,
                dest_column,
                dest_index,
            })
        }
    }
}
