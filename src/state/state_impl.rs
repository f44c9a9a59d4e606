use crate::app::NetworkEventSender;
use crate::board::{
    nudge, BoardError, BoardStore, Direction, DragController, DragItem, DragOutcome, DropLayout,
    MoveInstruction, Point,
};
use crate::events::network::Event as NetworkEvent;
use crate::logger::LogBuffer;
use crate::model::{Board, ItemKind, Note, Whiteboard, WhiteboardPatch, Workspace};
use crate::store::Document;
use crate::sync::{SyncEvent, SyncStatus};
use crate::workspace::{sort_newest_first, validate_workspace_id};
use chrono::Utc;
use crossterm::event::KeyEvent;
use log::*;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::collections::HashMap;
use std::fmt::Display;

use super::editor::{CardForm, HomeForm, LineInput, NoteEditor, Prompt};
use super::navigation::{Confirm, MenuEntry, View};
use super::StateError;

/// Item shown by the current item view.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenItem {
    pub id: String,
    pub kind: ItemKind,
}

/// Message shown at the bottom of the screen.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub message: String,
    pub is_error: bool,
}

/// Houses data representative of application state.
///
pub struct State {
    net_sender: Option<NetworkEventSender>,
    log_buffer: LogBuffer,
    terminal_size: Rect,
    view_stack: Vec<View>,
    show_log: bool,
    status_line: Option<StatusLine>,
    home: HomeForm,
    workspace: Option<Workspace>,
    menu_list_state: ListState,
    items: HashMap<ItemKind, Vec<Document>>,
    items_list_state: ListState,
    open_item: Option<OpenItem>,
    board: BoardStore,
    drag: DragController,
    drop_layout: DropLayout,
    column_index: usize,
    task_index: usize,
    prompt: Option<Prompt>,
    confirm: Option<Confirm>,
    note: Option<NoteEditor>,
    whiteboard: Option<Whiteboard>,
    sync_statuses: HashMap<String, SyncStatus>,
    admin_workspaces: Vec<Workspace>,
    admin_list_state: ListState,
}

/// Defines default application state.
///
impl Default for State {
    fn default() -> State {
        State {
            net_sender: None,
            log_buffer: crate::logger::log_buffer(),
            terminal_size: Rect::default(),
            view_stack: vec![View::Home],
            show_log: false,
            status_line: None,
            home: HomeForm::default(),
            workspace: None,
            menu_list_state: ListState::default(),
            items: HashMap::new(),
            items_list_state: ListState::default(),
            open_item: None,
            board: BoardStore::new(None),
            drag: DragController::default(),
            drop_layout: DropLayout::default(),
            column_index: 0,
            task_index: 0,
            prompt: None,
            confirm: None,
            note: None,
            whiteboard: None,
            sync_statuses: HashMap::new(),
            admin_workspaces: vec![],
            admin_list_state: ListState::default(),
        }
    }
}

impl State {
    /// Return new state wired to the network thread.
    ///
    pub fn new(
        net_sender: NetworkEventSender,
        log_buffer: LogBuffer,
        activation_distance: u16,
    ) -> State {
        State {
            net_sender: Some(net_sender.clone()),
            log_buffer,
            board: BoardStore::new(Some(net_sender)),
            drag: DragController::new(activation_distance),
            ..State::default()
        }
    }

    /// Hand an event to the network thread.
    ///
    fn dispatch(&mut self, event: NetworkEvent) {
        let result = match &self.net_sender {
            Some(sender) => sender.send(event).map_err(|e| e.to_string()),
            None => Ok(()),
        };
        if let Err(message) = result {
            error!("Failed to send network event: {}", message);
            self.set_error(StateError::Dispatch(message));
        }
    }

    // Status line and log panel

    pub fn set_info(&mut self, message: impl Display) {
        self.status_line = Some(StatusLine {
            message: message.to_string(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, message: impl Display) {
        self.status_line = Some(StatusLine {
            message: message.to_string(),
            is_error: true,
        });
    }

    pub fn clear_status(&mut self) {
        self.status_line = None;
    }

    pub fn status_line(&self) -> Option<&StatusLine> {
        self.status_line.as_ref()
    }

    pub fn toggle_log(&mut self) {
        self.show_log = !self.show_log;
    }

    pub fn is_log_visible(&self) -> bool {
        self.show_log
    }

    /// The newest `limit` log lines, oldest first.
    ///
    pub fn log_lines(&self, limit: usize) -> Vec<String> {
        match self.log_buffer.lock() {
            Ok(buffer) => {
                let skip = buffer.len().saturating_sub(limit);
                buffer.iter().skip(skip).cloned().collect()
            }
            Err(_) => vec![],
        }
    }

    pub fn set_terminal_size(&mut self, size: Rect) {
        self.terminal_size = size;
    }

    pub fn terminal_size(&self) -> Rect {
        self.terminal_size
    }

    // Navigation

    pub fn current_view(&self) -> View {
        self.view_stack.last().copied().unwrap_or(View::Home)
    }

    fn push_view(&mut self, view: View) {
        if self.current_view() != view {
            self.view_stack.push(view);
        }
    }

    /// Leave the current view, tearing down whatever it had open.
    ///
    pub fn back(&mut self) {
        match self.current_view() {
            View::Home => return,
            View::Board | View::Note | View::Whiteboard => self.close_item(),
            View::Items(kind) => self.dispatch(NetworkEvent::UnwatchItems { kind }),
            View::Workspace => {
                self.dispatch(NetworkEvent::CloseWorkspace);
                self.workspace = None;
                self.items.clear();
                self.sync_statuses.clear();
            }
            View::Admin => (),
        }
        self.view_stack.pop();
        if self.view_stack.is_empty() {
            self.view_stack.push(View::Home);
        }
    }

    fn close_item(&mut self) {
        if let Some(item) = self.open_item.take() {
            self.dispatch(NetworkEvent::CloseItem { id: item.id });
        }
        self.board.clear();
        self.drag.cancel();
        self.drop_layout.clear();
        self.note = None;
        self.whiteboard = None;
        self.prompt = None;
        self.confirm = None;
    }

    // Home

    pub fn home_form(&self) -> &HomeForm {
        &self.home
    }

    pub fn home_form_mut(&mut self) -> &mut HomeForm {
        &mut self.home
    }

    /// Fill the id field, e.g. with the last opened workspace.
    ///
    pub fn prefill_workspace(&mut self, id: &str) {
        self.home.workspace_id = LineInput::new(id);
    }

    /// Open (or create) the workspace typed in the home form. Invalid ids
    /// are rejected inline without a request.
    ///
    pub fn submit_home(&mut self, create: bool) {
        let id = match validate_workspace_id(self.home.workspace_id.value()) {
            Ok(id) => id,
            Err(e) => {
                self.home.error = Some(e.to_string());
                return;
            }
        };
        self.home.error = None;
        if create {
            self.set_info(format!("Creating workspace '{}'...", id));
            self.dispatch(NetworkEvent::CreateWorkspace { id });
        } else {
            self.set_info(format!("Opening workspace '{}'...", id));
            let password = self.home.password();
            self.dispatch(NetworkEvent::OpenWorkspace { id, password });
        }
    }

    pub fn set_home_error(&mut self, message: impl Display) {
        self.home.error = Some(message.to_string());
        self.clear_status();
    }

    // Workspace

    pub fn workspace_opened(&mut self, workspace: Workspace) {
        self.set_info(format!("Opened workspace '{}'", workspace.name));
        self.home.error = None;
        self.home.password.clear();
        self.workspace = Some(workspace);
        self.view_stack = vec![View::Home, View::Workspace];
        self.menu_list_state.select(Some(0));
    }

    pub fn workspace(&self) -> Option<&Workspace> {
        self.workspace.as_ref()
    }

    pub fn workspace_id(&self) -> Option<&str> {
        self.workspace.as_ref().map(|w| w.id.as_str())
    }

    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        MenuEntry::entries(self.workspace.as_ref().map(|w| w.is_admin).unwrap_or(false))
    }

    pub fn menu_list_state_mut(&mut self) -> &mut ListState {
        &mut self.menu_list_state
    }

    pub fn next_menu_entry(&mut self) {
        let len = self.menu_entries().len();
        step(&mut self.menu_list_state, len, true);
    }

    pub fn previous_menu_entry(&mut self) {
        let len = self.menu_entries().len();
        step(&mut self.menu_list_state, len, false);
    }

    pub fn select_menu_entry(&mut self) {
        let entries = self.menu_entries();
        let entry = match self.menu_list_state.selected().and_then(|i| entries.get(i)) {
            Some(entry) => *entry,
            None => return,
        };
        match entry.view() {
            View::Items(kind) => {
                self.items_list_state.select(Some(0));
                self.dispatch(NetworkEvent::WatchItems { kind });
            }
            View::Admin => {
                self.admin_list_state.select(Some(0));
                self.dispatch(NetworkEvent::ListWorkspaces);
            }
            _ => (),
        }
        self.push_view(entry.view());
    }

    // Item lists

    pub fn set_items(&mut self, kind: ItemKind, mut documents: Vec<Document>) {
        sort_newest_first(&mut documents);
        let len = documents.len();
        self.items.insert(kind, documents);
        if self.current_view() == View::Items(kind) {
            clamp(&mut self.items_list_state, len);
        }
    }

    pub fn items(&self, kind: ItemKind) -> &[Document] {
        self.items.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn items_list_state_mut(&mut self) -> &mut ListState {
        &mut self.items_list_state
    }

    fn listed_kind(&self) -> Option<ItemKind> {
        match self.current_view() {
            View::Items(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn next_item(&mut self) {
        if let Some(kind) = self.listed_kind() {
            let len = self.items(kind).len();
            step(&mut self.items_list_state, len, true);
        }
    }

    pub fn previous_item(&mut self) {
        if let Some(kind) = self.listed_kind() {
            let len = self.items(kind).len();
            step(&mut self.items_list_state, len, false);
        }
    }

    pub fn selected_item(&self) -> Option<&Document> {
        let kind = self.listed_kind()?;
        self.items(kind).get(self.items_list_state.selected()?)
    }

    pub fn open_selected_item(&mut self) {
        let (id, kind) = match (self.selected_item(), self.listed_kind()) {
            (Some(doc), Some(kind)) => (doc.id.clone(), kind),
            _ => return,
        };
        self.set_info("Loading...");
        self.dispatch(NetworkEvent::OpenItem { id, kind });
    }

    pub fn create_item(&mut self) {
        if let Some(kind) = self.listed_kind() {
            self.set_info(format!("Creating {}...", kind));
            self.dispatch(NetworkEvent::CreateItem { kind });
        }
    }

    pub fn request_delete_item(&mut self) {
        let (id, kind) = match (self.selected_item(), self.listed_kind()) {
            (Some(doc), Some(kind)) => (doc.id.clone(), kind),
            _ => return,
        };
        self.confirm = Some(Confirm::DeleteItem { id, kind });
    }

    // Open item

    pub fn open_item(&self) -> Option<&OpenItem> {
        self.open_item.as_ref()
    }

    /// Show a freshly fetched item.
    ///
    pub fn item_loaded(&mut self, kind: ItemKind, document: Document) {
        if let Some(previous) = &self.open_item {
            if previous.id != document.id {
                self.close_item();
            }
        }
        self.open_item = Some(OpenItem {
            id: document.id.clone(),
            kind,
        });
        if let Err(e) = self.apply_snapshot(kind, &document) {
            warn!("Failed to decode {} {}: {}", kind, document.id, e);
            self.set_error(format!("Failed to open {}: {}", kind, e));
            self.close_item();
            return;
        }
        self.column_index = 0;
        self.task_index = 0;
        self.clear_status();
        self.push_view(View::for_item(kind));
    }

    /// The item is gone: leave its view if it is open.
    ///
    pub fn item_missing(&mut self, id: &str) {
        self.set_error("This item no longer exists");
        let is_open = self.open_item.as_ref().map(|i| i.id == id).unwrap_or(false);
        if is_open {
            self.back();
        }
    }

    fn apply_snapshot(&mut self, kind: ItemKind, document: &Document) -> Result<(), serde_json::Error> {
        match kind {
            ItemKind::Kanban => {
                let board = Board::from_fields(&document.id, &document.fields)?;
                self.board.apply_remote_patch(board);
                self.after_board_change();
            }
            ItemKind::Note => {
                let note = Note::from_document(document)?;
                let saving = self
                    .sync_statuses
                    .get(&document.id)
                    .map(SyncStatus::has_local_changes)
                    .unwrap_or(false);
                let same_note = self.note.as_ref().map(|e| e.id == note.id).unwrap_or(false);
                if !same_note {
                    self.note = Some(NoteEditor::from_note(&note));
                } else if saving {
                    debug!("Keeping local edits of note {} over snapshot.", note.id);
                } else if let Some(editor) = self.note.as_mut() {
                    editor.replace(&note);
                }
            }
            ItemKind::Whiteboard => {
                self.whiteboard = Some(Whiteboard::from_document(document)?);
            }
        }
        Ok(())
    }

    /// Replace the open board with a freshly fetched copy.
    ///
    pub fn board_resynced(&mut self, board: Board) {
        if self.board.board_id() == Some(board.id.as_str()) {
            self.board.apply_remote_patch(board);
            self.after_board_change();
        }
    }

    // Sync events

    /// Apply one notification from the sync side.
    ///
    pub fn apply_sync_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Status { key, status } => {
                if status == SyncStatus::Unsaved {
                    self.set_error("Changes could not be saved (R to retry)");
                }
                self.sync_statuses.insert(key, status);
            }
            SyncEvent::Document { key, document } => {
                let kind = match &self.open_item {
                    Some(item) if item.id == key => item.kind,
                    _ => {
                        debug!("Ignoring snapshot of closed item {}.", key);
                        return;
                    }
                };
                match document {
                    Some(document) => {
                        if let Err(e) = self.apply_snapshot(kind, &document) {
                            warn!("Ignoring undecodable snapshot of {}: {}", key, e);
                        }
                    }
                    None => {
                        warn!("{} {} was deleted remotely.", kind, key);
                        self.item_missing(&key);
                    }
                }
            }
            SyncEvent::Query { kind, documents } => self.set_items(kind, documents),
            SyncEvent::SubscriptionError { key, message } => {
                self.set_error(format!("Live updates for {} failed: {}", key, message));
            }
        }
    }

    pub fn sync_status(&self, key: &str) -> Option<SyncStatus> {
        self.sync_statuses.get(key).copied()
    }

    pub fn open_item_status(&self) -> Option<SyncStatus> {
        self.open_item.as_ref().and_then(|item| self.sync_status(&item.id))
    }

    pub fn retry_unsaved(&mut self) {
        self.dispatch(NetworkEvent::RetryUnsaved);
    }

    // Board

    pub fn board(&self) -> Option<&Board> {
        self.board.state()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn drop_layout_mut(&mut self) -> &mut DropLayout {
        &mut self.drop_layout
    }

    pub fn column_index(&self) -> usize {
        self.column_index
    }

    pub fn task_index(&self) -> usize {
        self.task_index
    }

    pub fn selected_column_id(&self) -> Option<String> {
        self.board()?.column_order.get(self.column_index).cloned()
    }

    pub fn selected_task_id(&self) -> Option<String> {
        let board = self.board()?;
        let column = board.columns.get(board.column_order.get(self.column_index)?)?;
        column.task_ids.get(self.task_index).cloned()
    }

    fn after_board_change(&mut self) {
        let stale = match (self.drag.dragged(), self.board.state()) {
            (Some(DragItem::Task(id)), Some(board)) => !board.tasks.contains_key(id),
            (Some(DragItem::Column(id)), Some(board)) => !board.columns.contains_key(id),
            _ => false,
        };
        if stale {
            debug!("Dragged entity vanished from the board; cancelling drag.");
            self.drag.cancel();
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let (columns, tasks) = match self.board() {
            Some(board) => {
                let columns = board.column_count();
                let index = self.column_index.min(columns.saturating_sub(1));
                let tasks = board
                    .column_order
                    .get(index)
                    .and_then(|id| board.columns.get(id))
                    .map(|c| c.task_ids.len())
                    .unwrap_or(0);
                (columns, tasks)
            }
            None => (0, 0),
        };
        self.column_index = self.column_index.min(columns.saturating_sub(1));
        self.task_index = self.task_index.min(tasks.saturating_sub(1));
    }

    /// Put the selection on an entity, wherever it is now.
    ///
    fn select(&mut self, item: &DragItem) {
        let found = self.board().and_then(|board| match item {
            DragItem::Column(id) => board.column_index(id).map(|c| (c, 0)),
            DragItem::Task(id) => {
                let column = board.column_of(id)?;
                let position = board.columns.get(column)?.task_ids.iter().position(|t| t == id)?;
                Some((board.column_index(column)?, position))
            }
        });
        if let Some((column, task)) = found {
            self.column_index = column;
            self.task_index = task;
        }
    }

    pub fn next_column(&mut self) {
        self.column_index += 1;
        self.clamp_selection();
    }

    pub fn previous_column(&mut self) {
        self.column_index = self.column_index.saturating_sub(1);
        self.clamp_selection();
    }

    pub fn next_task(&mut self) {
        self.task_index += 1;
        self.clamp_selection();
    }

    pub fn previous_task(&mut self) {
        self.task_index = self.task_index.saturating_sub(1);
        self.clamp_selection();
    }

    fn report(&mut self, error: BoardError) {
        warn!("Board edit failed: {}", error);
        self.set_error(error);
    }

    /// Apply a move from a drop or a keyboard nudge. Moves that no longer
    /// fit the board trigger a re-sync.
    ///
    pub fn apply_move(&mut self, instruction: &MoveInstruction) {
        match self.board.apply_move(instruction) {
            Ok(()) => {
                let moved = match instruction {
                    MoveInstruction::Column { moved_id, .. } => DragItem::Column(moved_id.clone()),
                    MoveInstruction::Task { moved_id, .. } => DragItem::Task(moved_id.clone()),
                };
                self.select(&moved);
            }
            Err(
                e @ (BoardError::StaleMove(_)
                | BoardError::ColumnNotFound { .. }
                | BoardError::TaskNotFound { .. }),
            ) => {
                warn!("Discarding move: {}", e);
                self.set_error("The board changed; move discarded");
                if let Some(id) = self.board.board_id().map(str::to_owned) {
                    self.dispatch(NetworkEvent::ResyncBoard { id });
                }
            }
            Err(e) => self.report(e),
        }
    }

    pub fn move_selected_task(&mut self, direction: Direction) {
        let task_id = match self.selected_task_id() {
            Some(id) => id,
            None => return,
        };
        let instruction = self
            .board()
            .and_then(|board| nudge(board, &DragItem::Task(task_id), direction));
        if let Some(instruction) = instruction {
            self.apply_move(&instruction);
        }
    }

    pub fn move_selected_column(&mut self, direction: Direction) {
        let column_id = match self.selected_column_id() {
            Some(id) => id,
            None => return,
        };
        let instruction = self
            .board()
            .and_then(|board| nudge(board, &DragItem::Column(column_id), direction));
        if let Some(instruction) = instruction {
            self.apply_move(&instruction);
        }
    }

    /// Add a card to the selected column and open its edit form.
    ///
    pub fn add_task(&mut self) {
        let column_id = match self.selected_column_id() {
            Some(id) => id,
            None => {
                self.set_error("Add a column first");
                return;
            }
        };
        match self.board.add_task(&column_id, Utc::now()) {
            Ok(task_id) => {
                self.select(&DragItem::Task(task_id.clone()));
                self.open_card_form(&task_id);
            }
            Err(e) => self.report(e),
        }
    }

    pub fn add_column(&mut self) {
        match self.board.add_column(Utc::now()) {
            Ok(column_id) => {
                self.select(&DragItem::Column(column_id.clone()));
                self.prompt = Some(Prompt::RenameColumn {
                    column_id,
                    input: LineInput::new(Board::default_column_title()),
                });
            }
            Err(e) => self.report(e),
        }
    }

    fn open_card_form(&mut self, task_id: &str) {
        if let Some(task) = self.board().and_then(|b| b.tasks.get(task_id)) {
            self.prompt = Some(Prompt::EditCard(CardForm::from_task(task)));
        }
    }

    pub fn start_edit_task(&mut self) {
        if let Some(task_id) = self.selected_task_id() {
            self.open_card_form(&task_id);
        }
    }

    pub fn start_rename_column(&mut self) {
        let column = self
            .selected_column_id()
            .and_then(|id| self.board().and_then(|b| b.columns.get(&id)).cloned());
        if let Some(column) = column {
            self.prompt = Some(Prompt::RenameColumn {
                column_id: column.id.clone(),
                input: LineInput::new(&column.title),
            });
        }
    }

    pub fn start_rename_board(&mut self) {
        if let Some(title) = self.board().map(|b| b.title.clone()) {
            self.prompt = Some(Prompt::RenameBoard(LineInput::new(&title)));
        }
    }

    pub fn delete_selected_task(&mut self) {
        if let Some(task_id) = self.selected_task_id() {
            if let Err(e) = self.board.delete_task(&task_id) {
                self.report(e);
            }
            self.clamp_selection();
        }
    }

    pub fn request_delete_column(&mut self) {
        if let Some(column_id) = self.selected_column_id() {
            self.confirm = Some(Confirm::DeleteColumn(column_id));
        }
    }

    // Pointer drag

    /// Press on the board: starts a drag session when a handle is hit.
    ///
    pub fn mouse_down(&mut self, x: u16, y: u16) {
        if self.current_view() != View::Board || self.prompt.is_some() || self.confirm.is_some() {
            return;
        }
        let point = Point::new(x as i32, y as i32);
        if let Some((item, bounds)) = self.drop_layout.handle_at(point) {
            self.drag.press(item, point, bounds);
        }
    }

    pub fn mouse_drag(&mut self, x: u16, y: u16) {
        self.drag
            .pointer_move(Point::new(x as i32, y as i32), &self.drop_layout);
    }

    pub fn mouse_up(&mut self, x: u16, y: u16) {
        let point = Point::new(x as i32, y as i32);
        let outcome = match self.board.state() {
            Some(board) => self.drag.release(point, &self.drop_layout, board),
            None => self.drag.cancel(),
        };
        match outcome {
            Some(DragOutcome::Dropped(instruction)) => self.apply_move(&instruction),
            Some(DragOutcome::Click(item)) => self.select(&item),
            Some(DragOutcome::Cancelled) | None => (),
        }
    }

    /// Abort an active drag. Returns whether one was active.
    ///
    pub fn cancel_drag(&mut self) -> bool {
        matches!(self.drag.cancel(), Some(DragOutcome::Cancelled))
    }

    // Prompt and confirmation

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn prompt_mut(&mut self) -> Option<&mut Prompt> {
        self.prompt.as_mut()
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Apply the open prompt. An invalid card form stays open.
    ///
    pub fn submit_prompt(&mut self) {
        let prompt = match self.prompt.take() {
            Some(prompt) => prompt,
            None => return,
        };
        let result = match prompt {
            Prompt::RenameBoard(input) if !input.is_blank() => {
                self.board.rename_board(input.value().trim())
            }
            Prompt::RenameColumn { column_id, input } if !input.is_blank() => {
                self.board.rename_column(&column_id, input.value().trim())
            }
            Prompt::RenameWhiteboard(input) if !input.is_blank() => {
                self.rename_whiteboard(input.value().trim());
                Ok(())
            }
            Prompt::EditCard(form) => match form.to_update() {
                Ok(update) => self.board.update_task(&form.task_id, &update),
                Err(e) => {
                    self.set_error(e);
                    self.prompt = Some(Prompt::EditCard(form));
                    return;
                }
            },
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.report(e);
        }
    }

    pub fn confirm(&self) -> Option<&Confirm> {
        self.confirm.as_ref()
    }

    pub fn cancel_confirm(&mut self) {
        self.confirm = None;
    }

    pub fn accept_confirm(&mut self) {
        match self.confirm.take() {
            Some(Confirm::DeleteColumn(column_id)) => {
                if let Err(e) = self.board.delete_column(&column_id) {
                    self.report(e);
                }
                self.clamp_selection();
            }
            Some(Confirm::DeleteItem { id, kind }) => {
                self.set_info(format!("Deleting {}...", kind));
                self.dispatch(NetworkEvent::DeleteItem { id });
            }
            Some(Confirm::DeleteWorkspace(id)) => {
                self.dispatch(NetworkEvent::DeleteWorkspace { id });
            }
            None => (),
        }
    }

    // Note

    pub fn note_editor(&self) -> Option<&NoteEditor> {
        self.note.as_ref()
    }

    pub fn note_editor_mut(&mut self) -> Option<&mut NoteEditor> {
        self.note.as_mut()
    }

    pub fn toggle_note_focus(&mut self) {
        if let Some(editor) = self.note.as_mut() {
            editor.toggle_focus();
        }
    }

    /// Feed a key to the note editor and persist the change.
    ///
    pub fn note_input(&mut self, key: KeyEvent) {
        let change = self
            .note
            .as_mut()
            .and_then(|editor| editor.input(key).map(|patch| (editor.id.clone(), patch)));
        if let Some((id, patch)) = change {
            // Marked here so a snapshot racing the persist keeps the edit.
            self.sync_statuses.insert(id.clone(), SyncStatus::Pending);
            self.dispatch(NetworkEvent::PersistNote { id, patch });
        }
    }

    // Whiteboard

    pub fn whiteboard(&self) -> Option<&Whiteboard> {
        self.whiteboard.as_ref()
    }

    pub fn start_rename_whiteboard(&mut self) {
        if let Some(title) = self.whiteboard.as_ref().map(|w| w.title.clone()) {
            self.prompt = Some(Prompt::RenameWhiteboard(LineInput::new(&title)));
        }
    }

    fn rename_whiteboard(&mut self, title: &str) {
        let patch = WhiteboardPatch {
            title: Some(title.to_owned()),
            ..WhiteboardPatch::default()
        };
        let id = match self.whiteboard.as_mut() {
            Some(whiteboard) => {
                whiteboard.apply_patch(&patch);
                whiteboard.id.clone()
            }
            None => return,
        };
        self.dispatch(NetworkEvent::PersistWhiteboard { id, patch });
    }

    // Admin

    pub fn set_admin_workspaces(&mut self, workspaces: Vec<Workspace>) {
        let len = workspaces.len();
        self.admin_workspaces = workspaces;
        clamp(&mut self.admin_list_state, len);
    }

    pub fn admin_workspaces(&self) -> &[Workspace] {
        &self.admin_workspaces
    }

    pub fn admin_list_state_mut(&mut self) -> &mut ListState {
        &mut self.admin_list_state
    }

    pub fn next_admin_workspace(&mut self) {
        step(&mut self.admin_list_state, self.admin_workspaces.len(), true);
    }

    pub fn previous_admin_workspace(&mut self) {
        step(&mut self.admin_list_state, self.admin_workspaces.len(), false);
    }

    fn selected_admin_workspace(&self) -> Option<&Workspace> {
        self.admin_workspaces.get(self.admin_list_state.selected()?)
    }

    pub fn toggle_selected_lock(&mut self) {
        if let Some(ws) = self.selected_admin_workspace() {
            let event = NetworkEvent::SetWorkspaceLocked {
                id: ws.id.clone(),
                locked: !ws.is_locked,
            };
            self.dispatch(event);
        }
    }

    pub fn toggle_selected_admin(&mut self) {
        if let Some(ws) = self.selected_admin_workspace() {
            let event = NetworkEvent::SetWorkspaceAdmin {
                id: ws.id.clone(),
                admin: !ws.is_admin,
            };
            self.dispatch(event);
        }
    }

    pub fn request_delete_workspace(&mut self) {
        if let Some(id) = self.selected_admin_workspace().map(|w| w.id.clone()) {
            self.confirm = Some(Confirm::DeleteWorkspace(id));
        }
    }

    pub fn refresh_admin(&mut self) {
        self.dispatch(NetworkEvent::ListWorkspaces);
    }
}

/// Move a list selection one step, wrapping around.
///
fn step(list_state: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        list_state.select(None);
        return;
    }
    let current = list_state.selected().unwrap_or(0).min(len - 1);
    let next = if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    };
    list_state.select(Some(next));
}

fn clamp(list_state: &mut ListState, len: usize) {
    if len == 0 {
        list_state.select(None);
    } else {
        let current = list_state.selected().unwrap_or(0);
        list_state.select(Some(current.min(len - 1)));
    }
}
