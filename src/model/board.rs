use super::{empty_string_as_none, lenient_timestamp, timestamp_value};
use crate::store::Fields;
use chrono::{DateTime, Utc};
use fake::Dummy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Value of the `type` field on kanban board records.
///
pub const BOARD_TYPE: &str = "kanban";

const DEFAULT_BOARD_TITLE: &str = "New kanban board";
const DEFAULT_COLUMN_TITLE: &str = "New column";
const DEFAULT_COLUMNS: [(&str, &str); 3] = [
    ("column-1", "To do"),
    ("column-2", "In progress"),
    ("column-3", "Done"),
];
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Defines task (card) data structure.
///
#[derive(Clone, Debug, Dummy, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial update of a task. `None` leaves the field untouched.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskUpdate {
    pub content: Option<String>,
    pub assignee: Option<Option<String>>,
    pub deadline: Option<Option<DateTime<Utc>>>,
}

/// Defines column data structure.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
}

/// Defines kanban board data structure.
///
/// Columns and tasks are keyed maps; `column_order` and each column's
/// `task_ids` carry the display order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub column_order: Vec<String>,
    #[serde(default)]
    pub columns: BTreeMap<String, Column>,
    #[serde(default)]
    pub tasks: BTreeMap<String, Task>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Shallow, top-level patch of a board record. Every present field
/// replaces the stored field wholesale.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_order: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<BTreeMap<String, Column>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<BTreeMap<String, Task>>,
}

impl Task {
    /// Return a new task with empty content.
    ///
    pub fn new(id: &str) -> Task {
        Task {
            id: id.to_owned(),
            content: String::new(),
            assignee: None,
            deadline: None,
        }
    }

    /// Apply a partial update in place.
    ///
    pub fn apply(&mut self, update: &TaskUpdate) {
        if let Some(content) = &update.content {
            self.content = content.clone();
        }
        if let Some(assignee) = &update.assignee {
            self.assignee = assignee.clone().filter(|a| !a.trim().is_empty());
        }
        if let Some(deadline) = update.deadline {
            self.deadline = deadline;
        }
    }

    /// Whole days until the deadline, rounded up.
    ///
    fn days_until_deadline(&self, now: DateTime<Utc>) -> Option<i64> {
        let deadline = self.deadline?;
        let millis = (deadline - now).num_milliseconds() as f64;
        Some((millis / MILLIS_PER_DAY).ceil() as i64)
    }

    /// Whether the deadline has passed.
    ///
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.deadline.map(|d| d < now).unwrap_or(false)
    }

    /// Human label for the deadline relative to `now`.
    ///
    pub fn deadline_label(&self, now: DateTime<Utc>) -> Option<String> {
        let days = self.days_until_deadline(now)?;
        let label = match days {
            d if d < 0 => "Overdue".to_string(),
            0 => "Today".to_string(),
            1 => "Tomorrow".to_string(),
            _ => self.deadline?.format("%d/%m/%Y").to_string(),
        };
        Some(label)
    }
}

impl Column {
    /// Return a new empty column.
    ///
    pub fn new(id: &str, title: &str) -> Column {
        Column {
            id: id.to_owned(),
            title: title.to_owned(),
            task_ids: vec![],
        }
    }
}

impl Board {
    /// Return the board every new kanban document starts from: three
    /// columns and no tasks.
    ///
    pub fn new_default(id: &str) -> Board {
        let mut board = Board {
            id: id.to_owned(),
            title: DEFAULT_BOARD_TITLE.to_string(),
            ..Board::default()
        };
        for (column_id, title) in DEFAULT_COLUMNS {
            board.column_order.push(column_id.to_string());
            board
                .columns
                .insert(column_id.to_string(), Column::new(column_id, title));
        }
        board
    }

    /// Decode a board from stored fields.
    ///
    pub fn from_fields(id: &str, fields: &Fields) -> Result<Board, serde_json::Error> {
        let mut board: Board = serde_json::from_value(Value::Object(fields.clone()))?;
        board.id = id.to_owned();
        Ok(board)
    }

    /// Encode the full record for creation, including its `type` tag and
    /// timestamps.
    ///
    pub fn to_create_fields(&self, now: DateTime<Utc>) -> Fields {
        let mut fields = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Fields::new(),
        };
        fields.insert("type".to_string(), Value::String(BOARD_TYPE.to_string()));
        fields.insert("createdAt".to_string(), timestamp_value(now));
        fields.insert("updatedAt".to_string(), timestamp_value(now));
        fields
    }

    /// Return the columns in display order, skipping dangling ids.
    ///
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_order
            .iter()
            .filter_map(move |id| self.columns.get(id))
    }

    /// Return the tasks of a column in display order, skipping dangling ids.
    ///
    pub fn tasks_in(&self, column_id: &str) -> Vec<&Task> {
        self.columns
            .get(column_id)
            .map(|column| {
                column
                    .task_ids
                    .iter()
                    .filter_map(|id| self.tasks.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Return the id of the column whose list holds the task.
    ///
    pub fn column_of(&self, task_id: &str) -> Option<&str> {
        self.ordered_columns()
            .find(|column| column.task_ids.iter().any(|id| id == task_id))
            .map(|column| column.id.as_str())
    }

    /// Return the position of a column in the display order.
    ///
    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.column_order.iter().position(|id| id == column_id)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_order.len()
    }

    /// Return a fresh column id derived from the clock, suffixed when the
    /// plain id is already in use.
    ///
    pub fn next_column_id(&self, now: DateTime<Utc>) -> String {
        unique_id("column", now, |id| self.columns.contains_key(id))
    }

    /// Return a fresh task id derived from the clock.
    ///
    pub fn next_task_id(&self, now: DateTime<Utc>) -> String {
        unique_id("task", now, |id| self.tasks.contains_key(id))
    }

    /// Title given to columns created from the board view.
    ///
    pub fn default_column_title() -> &'static str {
        DEFAULT_COLUMN_TITLE
    }

    /// Shallow-merge a patch into the board.
    ///
    pub fn apply_patch(&mut self, patch: &BoardPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(column_order) = &patch.column_order {
            self.column_order = column_order.clone();
        }
        if let Some(columns) = &patch.columns {
            self.columns = columns.clone();
        }
        if let Some(tasks) = &patch.tasks {
            self.tasks = tasks.clone();
        }
    }

    /// Describe every breach of the containment rules: ordered columns and
    /// listed tasks must exist, and a task belongs to one column at most.
    ///
    pub fn violations(&self) -> Vec<String> {
        let mut problems = vec![];
        for column_id in &self.column_order {
            if !self.columns.contains_key(column_id) {
                problems.push(format!("column '{}' is ordered but missing", column_id));
            }
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for column in self.columns.values() {
            for task_id in &column.task_ids {
                if !self.tasks.contains_key(task_id) {
                    problems.push(format!(
                        "task '{}' listed in column '{}' is missing",
                        task_id, column.id
                    ));
                }
                if !seen.insert(task_id.as_str()) {
                    problems.push(format!("task '{}' is listed more than once", task_id));
                }
            }
        }
        problems
    }
}

impl BoardPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.column_order.is_none()
            && self.columns.is_none()
            && self.tasks.is_none()
    }

    /// Encode the patch as top-level document fields.
    ///
    pub fn to_fields(&self) -> Fields {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Fields::new(),
        }
    }
}

fn unique_id<F>(prefix: &str, now: DateTime<Utc>, taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let base = format!("{}-{}", prefix, now.timestamp_millis());
    if !taken(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use fake::{Fake, Faker};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_default_has_three_empty_columns() {
        let board = Board::new_default("b1");
        assert_eq!(board.column_order, vec!["column-1", "column-2", "column-3"]);
        assert_eq!(board.columns["column-2"].title, "In progress");
        assert!(board.tasks.is_empty());
        assert!(board.violations().is_empty());
    }

    #[test]
    fn from_fields_reads_stored_record() {
        let fields = json!({
            "type": "kanban",
            "title": "Sprint",
            "columnOrder": ["A"],
            "columns": { "A": { "id": "A", "title": "Todo", "taskIds": ["t1"] } },
            "tasks": { "t1": { "id": "t1", "content": "write", "assignee": "", "deadline": null } },
            "createdAt": "2024-05-01T00:00:00.000Z"
        });
        let fields = fields.as_object().unwrap().clone();
        let board = Board::from_fields("b1", &fields).unwrap();
        assert_eq!(board.id, "b1");
        assert_eq!(board.title, "Sprint");
        assert_eq!(board.tasks_in("A")[0].content, "write");
        assert!(board.tasks["t1"].assignee.is_none());
        assert!(board.created_at.is_some());
    }

    #[test]
    fn to_create_fields_tags_type_and_timestamps() {
        let fields = Board::new_default("b1").to_create_fields(now());
        assert_eq!(fields["type"], json!("kanban"));
        assert_eq!(fields["createdAt"], json!("2024-05-10T12:00:00.000Z"));
        assert_eq!(fields["columnOrder"], json!(["column-1", "column-2", "column-3"]));
        assert!(fields.get("id").is_none());
    }

    #[test]
    fn tasks_in_skips_dangling_ids() {
        let mut board = Board::new_default("b1");
        board
            .columns
            .get_mut("column-1")
            .unwrap()
            .task_ids
            .extend(["t1".to_string(), "ghost".to_string()]);
        board.tasks.insert("t1".to_string(), Task::new("t1"));
        assert_eq!(board.tasks_in("column-1").len(), 1);
        assert_eq!(board.violations().len(), 1);
    }

    #[test]
    fn violations_report_duplicate_membership() {
        let mut board = Board::new_default("b1");
        board.tasks.insert("t1".to_string(), Task::new("t1"));
        for column_id in ["column-1", "column-2"] {
            board
                .columns
                .get_mut(column_id)
                .unwrap()
                .task_ids
                .push("t1".to_string());
        }
        let problems = board.violations();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("more than once"));
    }

    #[test]
    fn next_ids_avoid_collisions() {
        let mut board = Board::new_default("b1");
        let first = board.next_task_id(now());
        board.tasks.insert(first.clone(), Task::new(&first));
        let second = board.next_task_id(now());
        assert_ne!(first, second);
        assert!(second.starts_with(&first));
    }

    #[test]
    fn apply_patch_replaces_only_present_fields() {
        let mut board = Board::new_default("b1");
        board.apply_patch(&BoardPatch {
            title: Some("Renamed".to_string()),
            ..BoardPatch::default()
        });
        assert_eq!(board.title, "Renamed");
        assert_eq!(board.column_count(), 3);
    }

    #[test]
    fn patch_fields_only_carry_present_keys() {
        let patch = BoardPatch {
            column_order: Some(vec!["b".to_string(), "a".to_string()]),
            ..BoardPatch::default()
        };
        let fields = patch.to_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["columnOrder"], json!(["b", "a"]));
        assert!(BoardPatch::default().is_empty());
    }

    #[test]
    fn task_apply_clears_blank_assignee() {
        let mut task: Task = Faker.fake();
        task.apply(&TaskUpdate {
            content: Some("ship it".to_string()),
            assignee: Some(Some(" ".to_string())),
            deadline: Some(None),
        });
        assert_eq!(task.content, "ship it");
        assert!(task.assignee.is_none());
        assert!(task.deadline.is_none());
    }

    #[test]
    fn deadline_labels() {
        let mut task = Task::new("t1");
        assert!(task.deadline_label(now()).is_none());

        task.deadline = Some(now() - Duration::days(2));
        assert_eq!(task.deadline_label(now()).unwrap(), "Overdue");
        assert!(task.is_overdue(now()));

        task.deadline = Some(now() - Duration::hours(1));
        assert_eq!(task.deadline_label(now()).unwrap(), "Today");

        task.deadline = Some(now() + Duration::hours(20));
        assert_eq!(task.deadline_label(now()).unwrap(), "Tomorrow");

        task.deadline = Some(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
        assert_eq!(task.deadline_label(now()).unwrap(), "01/06/2024");
        assert!(!task.is_overdue(now()));
    }
}
