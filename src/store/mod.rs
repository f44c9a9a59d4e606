//! Document store collaborator.
//!
//! Persistence, query and fan-out to other clients are delegated to an
//! external document database. This module defines the narrow interface the
//! client needs from it, plus two implementations:
//! - `MemoryStore`, an in-process store with push notifications
//! - `FirestoreStore`, a REST client for the hosted database

mod error;
mod firestore;
mod memory;

pub use error::{StoreError, StoreResult};
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Top-level fields of a stored document.
///
pub type Fields = serde_json::Map<String, Value>;

/// Name of the root collection holding one document per workspace.
///
pub const WORKSPACES: &str = "storages";

/// Name of the per-workspace subcollection holding boards, notes and
/// whiteboards.
///
pub const ITEMS: &str = "items";

/// Address of a single document.
///
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocPath {
    Workspace(String),
    Item { workspace: String, item: String },
}

impl DocPath {
    pub fn workspace(id: &str) -> DocPath {
        DocPath::Workspace(id.to_owned())
    }

    pub fn item(workspace: &str, item: &str) -> DocPath {
        DocPath::Item {
            workspace: workspace.to_owned(),
            item: item.to_owned(),
        }
    }

    /// Return the collection the document lives in.
    ///
    pub fn collection(&self) -> CollectionPath {
        match self {
            DocPath::Workspace(_) => CollectionPath::Workspaces,
            DocPath::Item { workspace, .. } => CollectionPath::Items(workspace.clone()),
        }
    }

    /// Return the document id (last path segment).
    ///
    pub fn id(&self) -> &str {
        match self {
            DocPath::Workspace(id) => id,
            DocPath::Item { item, .. } => item,
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocPath::Workspace(id) => write!(f, "{}/{}", WORKSPACES, id),
            DocPath::Item { workspace, item } => {
                write!(f, "{}/{}/{}/{}", WORKSPACES, workspace, ITEMS, item)
            }
        }
    }
}

/// Address of a collection.
///
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionPath {
    Workspaces,
    Items(String),
}

impl CollectionPath {
    pub fn items(workspace: &str) -> CollectionPath {
        CollectionPath::Items(workspace.to_owned())
    }

    /// Return the path of a document in this collection.
    ///
    pub fn doc(&self, id: &str) -> DocPath {
        match self {
            CollectionPath::Workspaces => DocPath::workspace(id),
            CollectionPath::Items(workspace) => DocPath::item(workspace, id),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionPath::Workspaces => f.write_str(WORKSPACES),
            CollectionPath::Items(workspace) => {
                write!(f, "{}/{}/{}", WORKSPACES, workspace, ITEMS)
            }
        }
    }
}

/// A stored document and its server timestamps.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

/// Equality filter on a top-level field.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Filter {
        Filter {
            field: field.to_owned(),
            value: value.into(),
        }
    }

    /// Whether the document satisfies the filter.
    ///
    pub fn matches(&self, fields: &Fields) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

/// A long-lived stream of snapshots. The producing task (if any) stops when
/// the subscription is dropped.
///
pub struct Subscription<T> {
    receiver: UnboundedReceiver<StoreResult<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T> Subscription<T> {
    /// Return a subscription and the sender feeding it.
    ///
    pub fn channel() -> (UnboundedSender<StoreResult<T>>, Subscription<T>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (
            sender,
            Subscription {
                receiver,
                task: None,
            },
        )
    }

    /// Tie a producing task to the subscription lifetime.
    ///
    pub fn with_task(mut self, task: JoinHandle<()>) -> Subscription<T> {
        self.task = Some(task);
        self
    }

    /// Wait for the next snapshot. `None` once the producer has gone away.
    ///
    pub async fn next(&mut self) -> Option<StoreResult<T>> {
        self.receiver.recv().await
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Snapshot of a single document; `None` when it does not exist.
///
pub type DocumentSubscription = Subscription<Option<Document>>;

/// Snapshot of every document matching a query.
///
pub type QuerySubscription = Subscription<Vec<Document>>;

/// Operations the client needs from the document database.
///
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create the document unless it exists. Returns whether it was created.
    ///
    async fn create_if_absent(&self, path: &DocPath, fields: Fields) -> StoreResult<bool>;

    /// Add a document with a generated id and return the id.
    ///
    async fn add(&self, collection: &CollectionPath, fields: Fields) -> StoreResult<String>;

    async fn get(&self, path: &DocPath) -> StoreResult<Option<Document>>;

    /// Merge top-level fields into an existing document.
    ///
    async fn update(&self, path: &DocPath, fields: Fields) -> StoreResult<()>;

    async fn delete(&self, path: &DocPath) -> StoreResult<()>;

    /// Return documents in the collection matching every filter.
    ///
    async fn query(
        &self,
        collection: &CollectionPath,
        filters: &[Filter],
    ) -> StoreResult<Vec<Document>>;

    async fn subscribe_document(&self, path: &DocPath) -> StoreResult<DocumentSubscription>;

    async fn subscribe_query(
        &self,
        collection: &CollectionPath,
        filters: &[Filter],
    ) -> StoreResult<QuerySubscription>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paths_render_as_collection_segments() {
        assert_eq!(DocPath::workspace("team").to_string(), "storages/team");
        assert_eq!(
            DocPath::item("team", "b1").to_string(),
            "storages/team/items/b1"
        );
        assert_eq!(CollectionPath::items("team").to_string(), "storages/team/items");
        assert_eq!(
            CollectionPath::items("team").doc("n1"),
            DocPath::item("team", "n1")
        );
        assert_eq!(DocPath::item("team", "n1").collection(), CollectionPath::items("team"));
        assert_eq!(DocPath::item("team", "n1").id(), "n1");
    }

    #[test]
    fn filter_matches_equal_values_only() {
        let fields = json!({ "type": "note", "title": "x" }).as_object().cloned().unwrap();
        assert!(Filter::eq("type", "note").matches(&fields));
        assert!(!Filter::eq("type", "kanban").matches(&fields));
        assert!(!Filter::eq("missing", "note").matches(&fields));
    }

    #[tokio::test]
    async fn dropping_subscription_aborts_its_task() {
        let (sender, subscription) = Subscription::<u32>::channel();
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        });
        let subscription = subscription.with_task(task);
        drop(subscription);
        assert!(sender.send(Ok(1)).is_err());
    }
}
