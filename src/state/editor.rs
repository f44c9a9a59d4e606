//! Form and editor state for text input.

use super::StateError;
use crate::model::{Note, NotePatch, Task, TaskUpdate};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::TextArea;

const DEADLINE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// Single-line text input.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineInput {
    value: String,
}

impl LineInput {
    pub fn new(value: &str) -> LineInput {
        LineInput {
            value: value.to_owned(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    /// Remove the last character. Returns whether there was one.
    ///
    pub fn pop(&mut self) -> bool {
        self.value.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HomeField {
    WorkspaceId,
    Password,
}

/// Workspace id and password form of the home view.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HomeForm {
    pub workspace_id: LineInput,
    pub password: LineInput,
    pub field: HomeField,
    pub error: Option<String>,
}

impl Default for HomeForm {
    fn default() -> Self {
        HomeForm {
            workspace_id: LineInput::default(),
            password: LineInput::default(),
            field: HomeField::WorkspaceId,
            error: None,
        }
    }
}

impl HomeForm {
    pub fn active_mut(&mut self) -> &mut LineInput {
        match self.field {
            HomeField::WorkspaceId => &mut self.workspace_id,
            HomeField::Password => &mut self.password,
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            HomeField::WorkspaceId => HomeField::Password,
            HomeField::Password => HomeField::WorkspaceId,
        };
    }

    /// Password to send, if one was typed.
    ///
    pub fn password(&self) -> Option<String> {
        if self.password.value().is_empty() {
            None
        } else {
            Some(self.password.value().to_owned())
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardField {
    Content,
    Assignee,
    Deadline,
}

/// Edit form for one card.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardForm {
    pub task_id: String,
    pub field: CardField,
    pub content: LineInput,
    pub assignee: LineInput,
    pub deadline: LineInput,
}

impl CardForm {
    pub fn from_task(task: &Task) -> CardForm {
        CardForm {
            task_id: task.id.clone(),
            field: CardField::Content,
            content: LineInput::new(&task.content),
            assignee: LineInput::new(task.assignee.as_deref().unwrap_or_default()),
            deadline: LineInput::new(
                &task
                    .deadline
                    .map(|d| d.format("%d/%m/%Y").to_string())
                    .unwrap_or_default(),
            ),
        }
    }

    pub fn active_mut(&mut self) -> &mut LineInput {
        match self.field {
            CardField::Content => &mut self.content,
            CardField::Assignee => &mut self.assignee,
            CardField::Deadline => &mut self.deadline,
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            CardField::Content => CardField::Assignee,
            CardField::Assignee => CardField::Deadline,
            CardField::Deadline => CardField::Content,
        };
    }

    /// Turn the form into a task update. Every field is sent; a blank
    /// assignee or deadline clears it.
    ///
    pub fn to_update(&self) -> Result<TaskUpdate, StateError> {
        let assignee = if self.assignee.is_blank() {
            None
        } else {
            Some(self.assignee.value().trim().to_owned())
        };
        Ok(TaskUpdate {
            content: Some(self.content.value().to_owned()),
            assignee: Some(assignee),
            deadline: Some(parse_deadline(self.deadline.value())?),
        })
    }
}

/// Parse a deadline typed as a calendar date. Blank means no deadline.
///
pub fn parse_deadline(raw: &str) -> Result<Option<DateTime<Utc>>, StateError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    DEADLINE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Some(Utc.from_utc_datetime(&naive)))
        .ok_or_else(|| StateError::InvalidDeadline(raw.to_owned()))
}

/// Modal input over the current view.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prompt {
    RenameBoard(LineInput),
    RenameColumn { column_id: String, input: LineInput },
    RenameWhiteboard(LineInput),
    EditCard(CardForm),
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::RenameBoard(_) => "Rename board",
            Prompt::RenameColumn { .. } => "Rename column",
            Prompt::RenameWhiteboard(_) => "Rename whiteboard",
            Prompt::EditCard(_) => "Edit card",
        }
    }

    /// Field receiving typed characters.
    ///
    pub fn input_mut(&mut self) -> &mut LineInput {
        match self {
            Prompt::RenameBoard(input)
            | Prompt::RenameColumn { input, .. }
            | Prompt::RenameWhiteboard(input) => input,
            Prompt::EditCard(form) => form.active_mut(),
        }
    }

    pub fn next_field(&mut self) {
        if let Prompt::EditCard(form) = self {
            form.next_field();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteField {
    Title,
    Content,
}

/// Editor of the open note.
///
pub struct NoteEditor {
    pub id: String,
    title: LineInput,
    content: TextArea<'static>,
    tags: Vec<String>,
    focus: NoteField,
}

impl NoteEditor {
    pub fn from_note(note: &Note) -> NoteEditor {
        NoteEditor {
            id: note.id.clone(),
            title: LineInput::new(&note.title),
            content: TextArea::from(note.content.lines().collect::<Vec<_>>()),
            tags: note.tags.clone(),
            focus: NoteField::Content,
        }
    }

    /// Take the text of a newer snapshot, keeping the focus.
    ///
    pub fn replace(&mut self, note: &Note) {
        self.title = LineInput::new(&note.title);
        self.content = TextArea::from(note.content.lines().collect::<Vec<_>>());
        self.tags = note.tags.clone();
    }

    pub fn title(&self) -> &str {
        self.title.value()
    }

    pub fn content(&self) -> String {
        self.content.lines().join("\n")
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn focus(&self) -> NoteField {
        self.focus
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            NoteField::Title => NoteField::Content,
            NoteField::Content => NoteField::Title,
        };
    }

    pub fn content_area_mut(&mut self) -> &mut TextArea<'static> {
        &mut self.content
    }

    /// Feed a key to the focused field. Returns the patch to persist when
    /// the text changed.
    ///
    pub fn input(&mut self, key: KeyEvent) -> Option<NotePatch> {
        match self.focus {
            NoteField::Title => {
                match key.code {
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.title.push(c)
                    }
                    KeyCode::Backspace => {
                        if !self.title.pop() {
                            return None;
                        }
                    }
                    KeyCode::Enter => {
                        self.focus = NoteField::Content;
                        return None;
                    }
                    _ => return None,
                }
                Some(NotePatch {
                    title: Some(self.title.value().to_owned()),
                    ..NotePatch::default()
                })
            }
            NoteField::Content => {
                if self.content.input(key) {
                    Some(NotePatch {
                        content: Some(self.content()),
                        ..NotePatch::default()
                    })
                } else {
                    None
                }
            }
        }
    }
}
