use crate::board::Direction;
use crate::state::{State, View};
use anyhow::Result;
use crossterm::{
    event,
    event::{
        Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
};
use log::*;
use std::{sync::mpsc, thread, time::Duration};

/// Specify terminal event poll rate in milliseconds.
///
const TICK_RATE_IN_MS: u64 = 60;

/// Specify different terminal event types.
///
#[derive(Debug)]
pub enum Event {
    Input(KeyEvent),
    Mouse(MouseEvent),
    Tick,
}

/// Specify struct for managing terminal events channel.
///
pub struct Handler {
    rx: mpsc::Receiver<Event>,
    _tx: mpsc::Sender<Event>,
}

impl Handler {
    /// Return new instance after spawning new input polling thread.
    ///
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let tx_clone = tx.clone();
        thread::spawn(move || loop {
            let tick_rate = Duration::from_millis(TICK_RATE_IN_MS);
            match event::poll(tick_rate) {
                Ok(true) => {
                    let forwarded = match event::read() {
                        Ok(CrosstermEvent::Key(key)) => tx_clone.send(Event::Input(key)),
                        Ok(CrosstermEvent::Mouse(mouse)) => tx_clone.send(Event::Mouse(mouse)),
                        Ok(_) => Ok(()),
                        Err(e) => {
                            error!("Failed to read terminal event: {}", e);
                            break;
                        }
                    };
                    if forwarded.is_err() {
                        break;
                    }
                }
                Ok(false) => (),
                Err(e) => {
                    error!("Failed to poll terminal events: {}", e);
                    break;
                }
            }
            if tx_clone.send(Event::Tick).is_err() {
                break;
            }
        });
        Handler { rx, _tx: tx }
    }

    /// Receive next terminal event and handle it accordingly. Returns result
    /// with value true if should continue or false if exit was requested.
    ///
    pub fn handle_next(&self, state: &mut State) -> Result<bool> {
        match self.rx.recv()? {
            Event::Input(key) => Ok(handle_key(state, key)),
            Event::Mouse(mouse) => {
                handle_mouse(state, mouse);
                Ok(true)
            }
            Event::Tick => Ok(true),
        }
    }
}

impl Default for Handler {
    fn default() -> Self {
        Handler::new()
    }
}

/// Route a key press. Returns false when exit was requested.
///
pub fn handle_key(state: &mut State, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return true;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        debug!("Processing exit terminal event '{:?}'...", key);
        return false;
    }
    if state.confirm().is_some() {
        handle_confirm_key(state, key);
        return true;
    }
    if state.prompt().is_some() {
        handle_prompt_key(state, key);
        return true;
    }
    match state.current_view() {
        View::Home => return handle_home_key(state, key),
        View::Note => {
            handle_note_key(state, key);
            return true;
        }
        _ => (),
    }
    match key.code {
        KeyCode::Char('q') => {
            debug!("Processing exit terminal event '{:?}'...", key);
            return false;
        }
        KeyCode::Char('?') => state.toggle_log(),
        KeyCode::Esc => {
            if !(state.current_view() == View::Board && state.cancel_drag()) {
                state.back();
            }
        }
        _ => match state.current_view() {
            View::Workspace => handle_workspace_key(state, key),
            View::Items(_) => handle_items_key(state, key),
            View::Board => handle_board_key(state, key),
            View::Whiteboard => handle_whiteboard_key(state, key),
            View::Admin => handle_admin_key(state, key),
            View::Home | View::Note => (),
        },
    }
    true
}

fn handle_confirm_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => state.accept_confirm(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => state.cancel_confirm(),
        _ => (),
    }
}

fn handle_prompt_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => state.cancel_prompt(),
        KeyCode::Enter => state.submit_prompt(),
        KeyCode::Tab => {
            if let Some(prompt) = state.prompt_mut() {
                prompt.next_field();
            }
        }
        KeyCode::Backspace => {
            if let Some(prompt) = state.prompt_mut() {
                prompt.input_mut().pop();
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(prompt) = state.prompt_mut() {
                prompt.input_mut().push(c);
            }
        }
        _ => (),
    }
}

fn handle_home_key(state: &mut State, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            debug!("Processing exit terminal event '{:?}'...", key);
            return false;
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
            state.home_form_mut().next_field()
        }
        KeyCode::Enter => state.submit_home(false),
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.submit_home(true)
        }
        KeyCode::Backspace => {
            state.home_form_mut().active_mut().pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.home_form_mut().error = None;
            state.home_form_mut().active_mut().push(c);
        }
        _ => (),
    }
    true
}

fn handle_note_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => state.back(),
        KeyCode::Tab => state.toggle_note_focus(),
        _ => state.note_input(key),
    }
}

fn handle_workspace_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.next_menu_entry(),
        KeyCode::Char('k') | KeyCode::Up => state.previous_menu_entry(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => state.select_menu_entry(),
        _ => debug!("Skipping processing of terminal event '{:?}'...", key),
    }
}

fn handle_items_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.next_item(),
        KeyCode::Char('k') | KeyCode::Up => state.previous_item(),
        KeyCode::Enter => state.open_selected_item(),
        KeyCode::Char('a') => state.create_item(),
        KeyCode::Char('d') => state.request_delete_item(),
        _ => debug!("Skipping processing of terminal event '{:?}'...", key),
    }
}

fn handle_board_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => state.previous_column(),
        KeyCode::Char('l') | KeyCode::Right => state.next_column(),
        KeyCode::Char('j') | KeyCode::Down => state.next_task(),
        KeyCode::Char('k') | KeyCode::Up => state.previous_task(),
        KeyCode::Char('H') => state.move_selected_task(Direction::Left),
        KeyCode::Char('L') => state.move_selected_task(Direction::Right),
        KeyCode::Char('J') => state.move_selected_task(Direction::Down),
        KeyCode::Char('K') => state.move_selected_task(Direction::Up),
        KeyCode::Char('<') => state.move_selected_column(Direction::Left),
        KeyCode::Char('>') => state.move_selected_column(Direction::Right),
        KeyCode::Char('a') => state.add_task(),
        KeyCode::Char('n') => state.add_column(),
        KeyCode::Char('e') | KeyCode::Enter => state.start_edit_task(),
        KeyCode::Char('r') => state.start_rename_column(),
        KeyCode::Char('t') => state.start_rename_board(),
        KeyCode::Char('d') => state.delete_selected_task(),
        KeyCode::Char('D') => state.request_delete_column(),
        KeyCode::Char('R') => state.retry_unsaved(),
        _ => debug!("Skipping processing of terminal event '{:?}'...", key),
    }
}

fn handle_whiteboard_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Char('t') => state.start_rename_whiteboard(),
        KeyCode::Char('R') => state.retry_unsaved(),
        _ => debug!("Skipping processing of terminal event '{:?}'...", key),
    }
}

fn handle_admin_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.next_admin_workspace(),
        KeyCode::Char('k') | KeyCode::Up => state.previous_admin_workspace(),
        KeyCode::Char('l') => state.toggle_selected_lock(),
        KeyCode::Char('a') => state.toggle_selected_admin(),
        KeyCode::Char('d') => state.request_delete_workspace(),
        KeyCode::Char('r') => state.refresh_admin(),
        _ => debug!("Skipping processing of terminal event '{:?}'...", key),
    }
}

/// Route left-button pointer events to the board drag session.
///
pub fn handle_mouse(state: &mut State, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => state.mouse_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => state.mouse_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => state.mouse_up(mouse.column, mouse.row),
        _ => (),
    }
}
