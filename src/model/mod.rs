//! Persisted record shapes.
//!
//! This module contains the typed records stored in the document store:
//! - Kanban boards with their columns and tasks
//! - Notes and whiteboards
//! - Workspaces (the top-level "Syncho" container)

mod board;
mod item;
mod workspace;

pub use board::{Board, BoardPatch, Column, Task, TaskUpdate, BOARD_TYPE};
pub use item::{
    newest_first, BoardSummary, ItemKind, Note, NotePatch, Whiteboard, WhiteboardPatch,
};
pub use workspace::Workspace;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Encode a timestamp the way records store it (RFC 3339, millisecond
/// precision, `Z` suffix).
///
pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Accept RFC 3339 strings or epoch milliseconds; anything else reads as
/// absent rather than failing the whole record.
///
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    })
}

/// Read an empty (or whitespace-only) string as `None`.
///
pub(crate) fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
