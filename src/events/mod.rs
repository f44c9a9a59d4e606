//! Event handling module.
//!
//! This module contains handlers for different types of events:
//! - Network events: workspace, item and persistence requests
//! - Sync events: snapshots and save status pushed from the store side
//! - Terminal events: keyboard and mouse input

pub mod network;
pub mod sync;
pub mod terminal;
