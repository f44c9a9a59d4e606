//! Terminal client for Syncho workspaces: kanban boards, notes and
//! whiteboards kept in a shared document store.

pub mod app;
pub mod board;
pub mod config;
pub mod error;
pub mod events;
pub mod logger;
pub mod model;
pub mod state;
pub mod store;
pub mod sync;
pub mod ui;
pub mod workspace;
