//! User interface module.
//!
//! This module handles all UI rendering using the `ratatui` library, including:
//! - Terminal layout (header, body, log panel, footer)
//! - View rendering (home, item lists, board, note, whiteboard, admin)
//! - Popups for prompts and confirmations
//! - Styling shared by the views

type Frame<'a> = ratatui::Frame<'a>;

mod render;
mod widgets;

pub use render::render;
