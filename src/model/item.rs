use super::{lenient_timestamp, timestamp_value, Board};
use crate::store::{Document, Fields};
use chrono::{DateTime, Utc};
use fake::Dummy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

const DEFAULT_NOTE_TITLE: &str = "Untitled note";
const DEFAULT_WHITEBOARD_TITLE: &str = "Untitled whiteboard";

/// Kinds of item stored in a workspace's item collection, keyed by the
/// `type` field.
///
#[derive(Clone, Copy, Debug, Dummy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Kanban,
    Note,
    Whiteboard,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Kanban => "kanban",
            ItemKind::Note => "note",
            ItemKind::Whiteboard => "whiteboard",
        }
    }

    /// Debounce bucket: whiteboards save on the slower timer.
    ///
    pub fn is_whiteboard(&self) -> bool {
        matches!(self, ItemKind::Whiteboard)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defines note data structure.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update of a note.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Defines whiteboard data structure. The drawing itself is an opaque
/// document owned by the drawing surface.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Whiteboard {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub board_data: Option<Value>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_data: Option<Value>,
}

/// Row shown in the board list.
///
#[derive(Clone, Debug, Dummy, PartialEq)]
pub struct BoardSummary {
    pub id: String,
    pub title: String,
    pub task_count: usize,
    pub column_count: usize,
    pub created_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Decode a note from a stored document.
    ///
    pub fn from_document(doc: &Document) -> Result<Note, serde_json::Error> {
        let mut note: Note = serde_json::from_value(Value::Object(doc.fields.clone()))?;
        note.id = doc.id.clone();
        Ok(note)
    }

    /// Fields of a freshly created note.
    ///
    pub fn create_fields(now: DateTime<Utc>) -> Fields {
        let mut fields = Fields::new();
        fields.insert("type".to_string(), Value::from(ItemKind::Note.as_str()));
        fields.insert("title".to_string(), Value::from(DEFAULT_NOTE_TITLE));
        fields.insert("content".to_string(), Value::from(""));
        fields.insert("tags".to_string(), Value::Array(vec![]));
        fields.insert("createdAt".to_string(), timestamp_value(now));
        fields.insert("updatedAt".to_string(), timestamp_value(now));
        fields
    }

    pub fn apply_patch(&mut self, patch: &NotePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
    }
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }

    pub fn to_fields(&self) -> Fields {
        to_fields(self)
    }
}

impl Whiteboard {
    pub fn from_document(doc: &Document) -> Result<Whiteboard, serde_json::Error> {
        let mut whiteboard: Whiteboard =
            serde_json::from_value(Value::Object(doc.fields.clone()))?;
        whiteboard.id = doc.id.clone();
        Ok(whiteboard)
    }

    pub fn create_fields(now: DateTime<Utc>) -> Fields {
        let mut fields = Fields::new();
        fields.insert(
            "type".to_string(),
            Value::from(ItemKind::Whiteboard.as_str()),
        );
        fields.insert("title".to_string(), Value::from(DEFAULT_WHITEBOARD_TITLE));
        fields.insert("boardData".to_string(), Value::Null);
        fields.insert("createdAt".to_string(), timestamp_value(now));
        fields.insert("updatedAt".to_string(), timestamp_value(now));
        fields
    }

    /// Number of drawn elements, when the drawing document carries an
    /// `elements` array.
    ///
    pub fn element_count(&self) -> usize {
        self.board_data
            .as_ref()
            .and_then(|data| data.get("elements"))
            .and_then(Value::as_array)
            .map(|elements| elements.len())
            .unwrap_or(0)
    }

    pub fn apply_patch(&mut self, patch: &WhiteboardPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(board_data) = &patch.board_data {
            self.board_data = Some(board_data.clone());
        }
    }
}

impl WhiteboardPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.board_data.is_none()
    }

    pub fn to_fields(&self) -> Fields {
        to_fields(self)
    }
}

impl BoardSummary {
    /// Summarize a stored board document. Undecodable documents still get a
    /// row so they can be opened or deleted.
    ///
    pub fn from_document(doc: &Document) -> BoardSummary {
        match Board::from_fields(&doc.id, &doc.fields) {
            Ok(board) => BoardSummary {
                id: doc.id.clone(),
                title: board.title.clone(),
                task_count: board.task_count(),
                column_count: board.column_count(),
                created_at: board.created_at,
            },
            Err(_) => BoardSummary {
                id: doc.id.clone(),
                title: doc.id.clone(),
                task_count: 0,
                column_count: 0,
                created_at: None,
            },
        }
    }
}

/// Order by creation time, newest first; records without a timestamp sink
/// to the bottom.
///
pub fn newest_first(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn to_fields<T: Serialize>(patch: &T) -> Fields {
    match serde_json::to_value(patch) {
        Ok(Value::Object(map)) => map,
        _ => Fields::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn doc(id: &str, fields: Value) -> Document {
        Document {
            id: id.to_string(),
            fields: fields.as_object().cloned().unwrap_or_default(),
            create_time: None,
            update_time: None,
        }
    }

    #[test]
    fn item_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ItemKind::Kanban).unwrap(), json!("kanban"));
        assert_eq!(ItemKind::Whiteboard.to_string(), "whiteboard");
        assert!(ItemKind::Whiteboard.is_whiteboard());
    }

    #[test]
    fn new_note_fields() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let fields = Note::create_fields(now);
        assert_eq!(fields["type"], json!("note"));
        assert_eq!(fields["title"], json!("Untitled note"));
        assert_eq!(fields["tags"], json!([]));

        let note = Note::from_document(&doc("n1", Value::Object(fields))).unwrap();
        assert_eq!(note.id, "n1");
        assert_eq!(note.created_at, Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()));
    }

    #[test]
    fn note_patch_fields_skip_absent_values() {
        let patch = NotePatch {
            content: Some("hello".to_string()),
            ..NotePatch::default()
        };
        assert_eq!(Value::Object(patch.to_fields()), json!({ "content": "hello" }));
    }

    #[test]
    fn whiteboard_counts_elements() {
        let whiteboard = Whiteboard::from_document(&doc(
            "w1",
            json!({ "title": "Flows", "boardData": { "elements": [{}, {}, {}] } }),
        ))
        .unwrap();
        assert_eq!(whiteboard.element_count(), 3);

        let empty =
            Whiteboard::from_document(&doc("w2", Value::Object(Whiteboard::create_fields(Utc::now()))))
                .unwrap();
        assert_eq!(empty.element_count(), 0);
        assert_eq!(empty.title, "Untitled whiteboard");
    }

    #[test]
    fn board_summary_counts_tasks_and_columns() {
        let board = Board::new_default("b1");
        let summary = BoardSummary::from_document(&doc(
            "b1",
            Value::Object(board.to_create_fields(Utc::now())),
        ));
        assert_eq!(summary.column_count, 3);
        assert_eq!(summary.task_count, 0);
        assert_eq!(summary.title, "New kanban board");
    }

    #[test]
    fn newest_first_puts_missing_timestamps_last() {
        let old = Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        let new = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let mut stamps = vec![None, old, new];
        stamps.sort_by(newest_first);
        assert_eq!(stamps, vec![new, old, None]);
    }
}
