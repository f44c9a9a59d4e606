use super::resolver::{move_column, move_task_across_columns, move_task_within_column};
use super::{BoardError, MoveInstruction};
use crate::app::NetworkEventSender;
use crate::events::network::Event as NetworkEvent;
use crate::model::{Board, BoardPatch, Column, Task, TaskUpdate};
use crate::sync::PersistMode;
use chrono::{DateTime, Utc};
use log::*;

/// Authoritative in-process copy of the open board.
///
/// Local edits are applied optimistically and handed to the network thread
/// for persistence; remote snapshots replace the whole board.
pub struct BoardStore {
    board: Option<Board>,
    net_sender: Option<NetworkEventSender>,
}

impl BoardStore {
    pub fn new(net_sender: Option<NetworkEventSender>) -> BoardStore {
        BoardStore {
            board: None,
            net_sender,
        }
    }

    /// Return the loaded board.
    ///
    pub fn state(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn board_id(&self) -> Option<&str> {
        self.board.as_ref().map(|b| b.id.as_str())
    }

    /// Drop the loaded board when its view closes.
    ///
    pub fn clear(&mut self) {
        self.board = None;
    }

    /// Replace the board with the latest remote snapshot. No field merge.
    ///
    pub fn apply_remote_patch(&mut self, board: Board) {
        let problems = board.violations();
        if !problems.is_empty() {
            warn!(
                "Snapshot of board {} breaks containment: {}",
                board.id,
                problems.join("; ")
            );
        }
        self.board = Some(board);
    }

    /// Merge a patch into the board and schedule its persistence. A failure
    /// to persist never rolls the optimistic state back.
    ///
    pub fn apply_local_patch(&mut self, patch: BoardPatch, mode: PersistMode) -> Result<(), BoardError> {
        let board = self.board.as_mut().ok_or(BoardError::NotLoaded)?;
        board.apply_patch(&patch);
        let id = board.id.clone();
        if let Some(sender) = &self.net_sender {
            if let Err(e) = sender.send(NetworkEvent::PersistBoard { id, patch, mode }) {
                error!("Failed to schedule board persistence: {}", e);
            }
        }
        Ok(())
    }

    fn board(&self) -> Result<&Board, BoardError> {
        self.board.as_ref().ok_or(BoardError::NotLoaded)
    }

    fn column(&self, column_id: &str) -> Result<&Column, BoardError> {
        self.board()?
            .columns
            .get(column_id)
            .ok_or_else(|| BoardError::ColumnNotFound {
                id: column_id.to_owned(),
            })
    }

    /// Append a new empty column. Returns its id.
    ///
    pub fn add_column(&mut self, now: DateTime<Utc>) -> Result<String, BoardError> {
        let board = self.board()?;
        let id = board.next_column_id(now);
        let mut columns = board.columns.clone();
        columns.insert(id.clone(), Column::new(&id, Board::default_column_title()));
        let mut column_order = board.column_order.clone();
        column_order.push(id.clone());
        self.apply_local_patch(
            BoardPatch {
                columns: Some(columns),
                column_order: Some(column_order),
                ..BoardPatch::default()
            },
            PersistMode::Immediate,
        )?;
        info!("Added column {}.", id);
        Ok(id)
    }

    /// Remove a column together with every task it lists.
    ///
    pub fn delete_column(&mut self, column_id: &str) -> Result<(), BoardError> {
        let removed = self.column(column_id)?.task_ids.clone();
        let board = self.board()?;
        let mut columns = board.columns.clone();
        columns.remove(column_id);
        let column_order: Vec<String> = board
            .column_order
            .iter()
            .filter(|id| *id != column_id)
            .cloned()
            .collect();
        let mut tasks = board.tasks.clone();
        for task_id in &removed {
            tasks.remove(task_id);
        }
        self.apply_local_patch(
            BoardPatch {
                columns: Some(columns),
                column_order: Some(column_order),
                tasks: Some(tasks),
                ..BoardPatch::default()
            },
            PersistMode::Immediate,
        )?;
        info!("Deleted column {} and {} task(s).", column_id, removed.len());
        Ok(())
    }

    pub fn rename_column(&mut self, column_id: &str, title: &str) -> Result<(), BoardError> {
        self.column(column_id)?;
        let mut columns = self.board()?.columns.clone();
        if let Some(column) = columns.get_mut(column_id) {
            column.title = title.to_owned();
        }
        self.apply_local_patch(
            BoardPatch {
                columns: Some(columns),
                ..BoardPatch::default()
            },
            PersistMode::Debounced,
        )
    }

    /// Append an empty task to a column. Returns its id so the caller can
    /// open it for editing.
    ///
    pub fn add_task(&mut self, column_id: &str, now: DateTime<Utc>) -> Result<String, BoardError> {
        self.column(column_id)?;
        let board = self.board()?;
        let id = board.next_task_id(now);
        let mut tasks = board.tasks.clone();
        tasks.insert(id.clone(), Task::new(&id));
        let mut columns = board.columns.clone();
        if let Some(column) = columns.get_mut(column_id) {
            column.task_ids.push(id.clone());
        }
        self.apply_local_patch(
            BoardPatch {
                tasks: Some(tasks),
                columns: Some(columns),
                ..BoardPatch::default()
            },
            PersistMode::Immediate,
        )?;
        info!("Added task {} to column {}.", id, column_id);
        Ok(id)
    }

    /// Remove a task from its column and from the task map in one patch.
    ///
    pub fn delete_task(&mut self, task_id: &str) -> Result<(), BoardError> {
        let board = self.board()?;
        if !board.tasks.contains_key(task_id) {
            return Err(BoardError::TaskNotFound {
                id: task_id.to_owned(),
            });
        }
        let mut tasks = board.tasks.clone();
        tasks.remove(task_id);
        let mut columns = board.columns.clone();
        for column in columns.values_mut() {
            column.task_ids.retain(|id| id != task_id);
        }
        self.apply_local_patch(
            BoardPatch {
                tasks: Some(tasks),
                columns: Some(columns),
                ..BoardPatch::default()
            },
            PersistMode::Immediate,
        )?;
        info!("Deleted task {}.", task_id);
        Ok(())
    }

    pub fn update_task(&mut self, task_id: &str, update: &TaskUpdate) -> Result<(), BoardError> {
        let mut tasks = self.board()?.tasks.clone();
        let task = tasks
            .get_mut(task_id)
            .ok_or_else(|| BoardError::TaskNotFound {
                id: task_id.to_owned(),
            })?;
        task.apply(update);
        self.apply_local_patch(
            BoardPatch {
                tasks: Some(tasks),
                ..BoardPatch::default()
            },
            PersistMode::Debounced,
        )
    }

    pub fn rename_board(&mut self, title: &str) -> Result<(), BoardError> {
        self.apply_local_patch(
            BoardPatch {
                title: Some(title.to_owned()),
                ..BoardPatch::default()
            },
            PersistMode::Debounced,
        )
    }

    /// Apply a resolved drag (or keyboard move). A move that no longer fits
    /// the board fails with `StaleMove` and leaves the board untouched.
    ///
    pub fn apply_move(&mut self, instruction: &MoveInstruction) -> Result<(), BoardError> {
        let board = self.board()?;
        let patch = match instruction {
            MoveInstruction::Column {
                moved_id,
                dest_index,
            } => BoardPatch {
                column_order: Some(move_column(&board.column_order, moved_id, *dest_index)?),
                ..BoardPatch::default()
            },
            MoveInstruction::Task {
                moved_id,
                source_column,
                dest_column,
                dest_index,
            } => {
                let source = self.column(source_column)?;
                let mut columns = board.columns.clone();
                if source_column == dest_column {
                    let task_ids = move_task_within_column(&source.task_ids, moved_id, *dest_index)?;
                    if let Some(column) = columns.get_mut(source_column) {
                        column.task_ids = task_ids;
                    }
                } else {
                    let dest = self.column(dest_column)?;
                    let (new_source, new_dest) = move_task_across_columns(
                        &source.task_ids,
                        &dest.task_ids,
                        moved_id,
                        *dest_index,
                    )?;
                    if let Some(column) = columns.get_mut(source_column) {
                        column.task_ids = new_source;
                    }
                    if let Some(column) = columns.get_mut(dest_column) {
                        column.task_ids = new_dest;
                    }
                }
                BoardPatch {
                    columns: Some(columns),
                    ..BoardPatch::default()
                }
            }
        };
        debug!("Applying move {:?}.", instruction);
        self.apply_local_patch(patch, PersistMode::Immediate)
    }
}
