//! Workspaces and the items they contain.
//!
//! A workspace is a named container stored at `storages/{id}`; its boards,
//! notes and whiteboards live in the `items` subcollection. Access checks
//! (lock flag, password) happen on the client only.

mod error;
mod validation;

pub use error::{WorkspaceError, WorkspaceResult};
pub use validation::{validate_workspace_id, ValidationError};

use crate::model::{newest_first, Board, BoardSummary, ItemKind, Note, Whiteboard, Workspace};
use crate::store::{CollectionPath, DocPath, Document, DocumentStore, Fields, Filter, StoreError};
use chrono::{DateTime, Utc};
use log::*;
use serde_json::Value;
use std::sync::Arc;

/// Creation time of a stored record: its `createdAt` field, else the
/// server's create time.
///
pub fn created_at(doc: &Document) -> Option<DateTime<Utc>> {
    doc.fields
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|t| t.with_timezone(&Utc))
        .or(doc.create_time)
}

/// Sort stored records newest first.
///
pub fn sort_newest_first(docs: &mut [Document]) {
    docs.sort_by(|a, b| newest_first(&created_at(a), &created_at(b)));
}

/// Manages workspace records.
///
#[derive(Clone)]
pub struct WorkspaceService {
    store: Arc<dyn DocumentStore>,
}

impl WorkspaceService {
    pub fn new(store: Arc<dyn DocumentStore>) -> WorkspaceService {
        WorkspaceService { store }
    }

    /// Create a new, unlocked workspace.
    ///
    pub async fn create(&self, raw_id: &str) -> WorkspaceResult<Workspace> {
        let id = validate_workspace_id(raw_id)?;
        let path = DocPath::workspace(&id);
        let created = self
            .store
            .create_if_absent(&path, Workspace::create_fields(&id, Utc::now()))
            .await?;
        if !created {
            return Err(WorkspaceError::AlreadyExists { id });
        }
        info!("Created workspace {}.", id);
        self.fetch(&id).await
    }

    /// Open an existing workspace, enforcing its lock and password.
    ///
    pub async fn open(&self, raw_id: &str, password: Option<&str>) -> WorkspaceResult<Workspace> {
        let id = validate_workspace_id(raw_id)?;
        let workspace = self.fetch(&id).await?;
        if workspace.is_locked {
            warn!("Refused to open locked workspace {}.", id);
            return Err(WorkspaceError::Locked { id });
        }
        if !workspace.password_matches(password) {
            return Err(WorkspaceError::WrongPassword);
        }
        info!("Opened workspace {}.", id);
        Ok(workspace)
    }

    async fn fetch(&self, id: &str) -> WorkspaceResult<Workspace> {
        let doc = self
            .store
            .get(&DocPath::workspace(id))
            .await?
            .ok_or_else(|| WorkspaceError::NotFound { id: id.to_owned() })?;
        Ok(Workspace::from_document(&doc)?)
    }

    /// Every workspace, newest first.
    ///
    pub async fn list_all(&self) -> WorkspaceResult<Vec<Workspace>> {
        let mut docs = self.store.query(&CollectionPath::Workspaces, &[]).await?;
        sort_newest_first(&mut docs);
        let mut workspaces = vec![];
        for doc in &docs {
            match Workspace::from_document(doc) {
                Ok(workspace) => workspaces.push(workspace),
                Err(e) => warn!("Skipping unreadable workspace {}: {}", doc.id, e),
            }
        }
        Ok(workspaces)
    }

    pub async fn set_locked(&self, id: &str, locked: bool) -> WorkspaceResult<()> {
        self.set_flag(id, "isLocked", locked).await
    }

    pub async fn set_admin(&self, id: &str, admin: bool) -> WorkspaceResult<()> {
        self.set_flag(id, "isAdmin", admin).await
    }

    async fn set_flag(&self, id: &str, field: &str, value: bool) -> WorkspaceResult<()> {
        let mut fields = Fields::new();
        fields.insert(field.to_string(), Value::Bool(value));
        fields.insert(
            "updatedAt".to_string(),
            crate::model::timestamp_value(Utc::now()),
        );
        match self.store.update(&DocPath::workspace(id), fields).await {
            Ok(()) => {
                info!("Set {} = {} on workspace {}.", field, value, id);
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => Err(WorkspaceError::NotFound { id: id.to_owned() }),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the workspace record. Its items are left in place.
    ///
    pub async fn delete(&self, id: &str) -> WorkspaceResult<()> {
        self.store.delete(&DocPath::workspace(id)).await?;
        info!("Deleted workspace {}.", id);
        Ok(())
    }

    /// Whether the workspace grants the admin page.
    ///
    pub async fn is_admin(&self, id: &str) -> WorkspaceResult<bool> {
        Ok(self.fetch(id).await?.is_admin)
    }
}

/// Manages the items of one workspace.
///
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn DocumentStore>,
    workspace: String,
}

impl ItemService {
    pub fn new(store: Arc<dyn DocumentStore>, workspace: &str) -> ItemService {
        ItemService {
            store,
            workspace: workspace.to_owned(),
        }
    }

    fn items(&self) -> CollectionPath {
        CollectionPath::items(&self.workspace)
    }

    /// Create a board with the default columns.
    ///
    pub async fn create_board(&self) -> WorkspaceResult<Board> {
        let now = Utc::now();
        let mut board = Board::new_default("");
        let id = self
            .store
            .add(&self.items(), board.to_create_fields(now))
            .await?;
        board.id = id;
        board.created_at = Some(now);
        board.updated_at = Some(now);
        info!("Created board {} in workspace {}.", board.id, self.workspace);
        Ok(board)
    }

    pub async fn create_note(&self) -> WorkspaceResult<String> {
        let id = self
            .store
            .add(&self.items(), Note::create_fields(Utc::now()))
            .await?;
        info!("Created note {} in workspace {}.", id, self.workspace);
        Ok(id)
    }

    pub async fn create_whiteboard(&self) -> WorkspaceResult<String> {
        let id = self
            .store
            .add(&self.items(), Whiteboard::create_fields(Utc::now()))
            .await?;
        info!("Created whiteboard {} in workspace {}.", id, self.workspace);
        Ok(id)
    }

    /// Delete an item. Tasks and columns are embedded and go with it.
    ///
    pub async fn delete_item(&self, id: &str) -> WorkspaceResult<()> {
        self.store.delete(&self.items().doc(id)).await?;
        info!("Deleted item {} from workspace {}.", id, self.workspace);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> WorkspaceResult<Document> {
        self.store
            .get(&self.items().doc(id))
            .await?
            .ok_or_else(|| WorkspaceError::ItemNotFound { id: id.to_owned() })
    }

    pub async fn get_board(&self, id: &str) -> WorkspaceResult<Board> {
        let doc = self.get(id).await?;
        Ok(Board::from_fields(&doc.id, &doc.fields)?)
    }

    /// Items of one kind, newest first.
    ///
    pub async fn list(&self, kind: ItemKind) -> WorkspaceResult<Vec<Document>> {
        let mut docs = self
            .store
            .query(&self.items(), &[Filter::eq("type", kind.as_str())])
            .await?;
        sort_newest_first(&mut docs);
        Ok(docs)
    }

    pub async fn list_boards(&self) -> WorkspaceResult<Vec<BoardSummary>> {
        Ok(self
            .list(ItemKind::Kanban)
            .await?
            .iter()
            .map(BoardSummary::from_document)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use serde_json::json;

    fn services() -> (Arc<MemoryStore>, WorkspaceService) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), WorkspaceService::new(store))
    }

    #[tokio::test]
    async fn create_then_open() -> WorkspaceResult<()> {
        let (_, service) = services();
        let created = service.create("  team ").await?;
        assert_eq!(created.id, "team");
        assert!(!created.is_locked);

        let opened = service.open("team", None).await?;
        assert_eq!(opened.name, "team");
        Ok(())
    }

    #[tokio::test]
    async fn create_twice_is_rejected() -> WorkspaceResult<()> {
        let (_, service) = services();
        service.create("team").await?;
        assert!(matches!(
            service.create("team").await,
            Err(WorkspaceError::AlreadyExists { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn generated_ids_are_listed() -> WorkspaceResult<()> {
        let (_, service) = services();
        let id = uuid::Uuid::new_v4().to_string();
        service.create(&id).await?;
        let all = service.list_all().await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_id_never_reaches_the_store() {
        let (store, service) = services();
        assert!(matches!(
            service.open("   ", None).await,
            Err(WorkspaceError::Validation(ValidationError::Blank))
        ));
        assert!(matches!(
            service.create("a/b").await,
            Err(WorkspaceError::Validation(ValidationError::ContainsSlash))
        ));
        assert!(store
            .query(&CollectionPath::Workspaces, &[])
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn open_enforces_lock_and_password() -> WorkspaceResult<()> {
        let (store, service) = services();
        assert!(matches!(
            service.open("ghost", None).await,
            Err(WorkspaceError::NotFound { .. })
        ));

        service.create("team").await?;
        service.set_locked("team", true).await?;
        assert!(matches!(
            service.open("team", None).await,
            Err(WorkspaceError::Locked { .. })
        ));

        service.set_locked("team", false).await?;
        let mut fields = Fields::new();
        fields.insert("password".to_string(), json!("s3cret"));
        store.update(&DocPath::workspace("team"), fields).await?;
        assert!(matches!(
            service.open("team", Some("guess")).await,
            Err(WorkspaceError::WrongPassword)
        ));
        assert!(service.open("team", Some("s3cret")).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn admin_flag_round_trip() -> WorkspaceResult<()> {
        let (_, service) = services();
        service.create("team").await?;
        assert!(!service.is_admin("team").await?);
        service.set_admin("team", true).await?;
        assert!(service.is_admin("team").await?);
        assert!(matches!(
            service.set_admin("ghost", true).await,
            Err(WorkspaceError::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn list_all_and_delete() -> WorkspaceResult<()> {
        let (_, service) = services();
        service.create("one").await?;
        service.create("two").await?;
        assert_eq!(service.list_all().await?.len(), 2);
        service.delete("one").await?;
        let remaining = service.list_all().await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "two");
        Ok(())
    }

    #[tokio::test]
    async fn items_are_created_listed_and_deleted() -> WorkspaceResult<()> {
        let store = Arc::new(MemoryStore::new());
        let items = ItemService::new(store.clone(), "team");
        let board = items.create_board().await?;
        let note = items.create_note().await?;
        items.create_whiteboard().await?;

        let boards = items.list_boards().await?;
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].id, board.id);
        assert_eq!(boards[0].column_count, 3);
        assert_eq!(items.list(ItemKind::Note).await?.len(), 1);
        assert_eq!(items.list(ItemKind::Whiteboard).await?.len(), 1);

        let loaded = items.get_board(&board.id).await?;
        assert_eq!(loaded.column_order, board.column_order);

        items.delete_item(&note).await?;
        assert!(items.list(ItemKind::Note).await?.is_empty());
        assert!(matches!(
            items.get_board("missing").await,
            Err(WorkspaceError::ItemNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn sorting_uses_created_at_then_server_time() {
        let now = Utc::now();
        let doc = |id: &str, created: Option<DateTime<Utc>>, server: Option<DateTime<Utc>>| {
            let mut fields = Fields::new();
            if let Some(at) = created {
                fields.insert("createdAt".to_string(), crate::model::timestamp_value(at));
            }
            Document {
                id: id.to_string(),
                fields,
                create_time: server,
                update_time: None,
            }
        };
        let mut docs = vec![
            doc("old", Some(now - Duration::days(2)), None),
            doc("undated", None, None),
            doc("server", None, Some(now - Duration::days(1))),
            doc("new", Some(now), None),
        ];
        sort_newest_first(&mut docs);
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "server", "old", "undated"]);
    }
}
