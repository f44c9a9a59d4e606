use super::{lenient_timestamp, timestamp_value};
use crate::store::{Document, Fields};
use chrono::{DateTime, Utc};
use fake::Dummy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Defines workspace data structure.
///
/// The password is stored in plaintext and only gates the client.
#[derive(Clone, Debug, Default, Dummy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Workspace {
    /// Fields of a freshly created workspace, named after its id.
    ///
    pub fn create_fields(id: &str, now: DateTime<Utc>) -> Fields {
        let mut fields = Fields::new();
        fields.insert("id".to_string(), Value::from(id));
        fields.insert("name".to_string(), Value::from(id));
        fields.insert("isLocked".to_string(), Value::Bool(false));
        fields.insert("isAdmin".to_string(), Value::Bool(false));
        fields.insert("createdAt".to_string(), timestamp_value(now));
        fields.insert("updatedAt".to_string(), timestamp_value(now));
        fields
    }

    pub fn from_document(doc: &Document) -> Result<Workspace, serde_json::Error> {
        let mut workspace: Workspace = serde_json::from_value(Value::Object(doc.fields.clone()))?;
        if workspace.id.is_empty() {
            workspace.id = doc.id.clone();
        }
        if workspace.name.is_empty() {
            workspace.name = workspace.id.clone();
        }
        Ok(workspace)
    }

    /// Whether the given password opens this workspace. A workspace without
    /// a password (or with an empty one) opens with anything.
    ///
    pub fn password_matches(&self, given: Option<&str>) -> bool {
        match self.password.as_deref() {
            None | Some("") => true,
            Some(expected) => given == Some(expected),
        }
    }
}
