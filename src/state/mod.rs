//! Application state management module.
//!
//! This module contains the state behind the terminal client:
//! - Main `State` struct that holds all view data
//! - Navigation types (View, MenuEntry, Confirm)
//! - Form and editor types (HomeForm, CardForm, Prompt, NoteEditor)
//! - State error handling

mod editor;
mod error;
mod navigation;

pub use editor::{
    parse_deadline, CardField, CardForm, HomeField, HomeForm, LineInput, NoteEditor, NoteField,
    Prompt,
};
pub use error::StateError;
pub use navigation::{Confirm, MenuEntry, View};

// State struct and its methods are in state_impl.rs
#[path = "state_impl.rs"]
mod state_impl;

pub use state_impl::{OpenItem, State, StatusLine};
