use crate::model::{BoardPatch, ItemKind, NotePatch, WhiteboardPatch, Workspace};
use crate::state::{State, StateError};
use crate::store::DocumentStore;
use crate::sync::{PersistMode, SyncAdapter, SyncConfig, SyncEventSender};
use crate::workspace::{ItemService, WorkspaceError, WorkspaceService};
use anyhow::Result;
use log::*;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Specify different network event types.
///
#[derive(Debug, Clone)]
pub enum Event {
    OpenWorkspace {
        id: String,
        password: Option<String>,
    },
    CreateWorkspace {
        id: String,
    },
    CloseWorkspace,
    WatchItems {
        kind: ItemKind,
    },
    UnwatchItems {
        kind: ItemKind,
    },
    CreateItem {
        kind: ItemKind,
    },
    OpenItem {
        id: String,
        kind: ItemKind,
    },
    CloseItem {
        id: String,
    },
    DeleteItem {
        id: String,
    },
    PersistBoard {
        id: String,
        patch: BoardPatch,
        mode: PersistMode,
    },
    PersistNote {
        id: String,
        patch: NotePatch,
    },
    PersistWhiteboard {
        id: String,
        patch: WhiteboardPatch,
    },
    ResyncBoard {
        id: String,
    },
    RetryUnsaved,
    ListWorkspaces,
    SetWorkspaceLocked {
        id: String,
        locked: bool,
    },
    SetWorkspaceAdmin {
        id: String,
        admin: bool,
    },
    DeleteWorkspace {
        id: String,
    },
}

/// Services bound to the open workspace.
///
struct Session {
    is_admin: bool,
    items: ItemService,
    sync: SyncAdapter,
}

/// Specify struct for managing state with network events.
///
pub struct Handler<'a> {
    state: &'a Arc<Mutex<State>>,
    store: Arc<dyn DocumentStore>,
    workspaces: WorkspaceService,
    sync_config: SyncConfig,
    sync_events: SyncEventSender,
    session: Option<Session>,
}

impl<'a> Handler<'a> {
    /// Return new instance with reference to state. Sync notifications of
    /// every opened workspace go to `sync_events`.
    ///
    pub fn new(
        state: &'a Arc<Mutex<State>>,
        store: Arc<dyn DocumentStore>,
        sync_config: SyncConfig,
        sync_events: SyncEventSender,
    ) -> Self {
        Handler {
            state,
            workspaces: WorkspaceService::new(Arc::clone(&store)),
            store,
            sync_config,
            sync_events,
            session: None,
        }
    }

    /// Handle network events by type. Failures are also shown on the status
    /// line.
    ///
    pub async fn handle(&mut self, event: Event) -> Result<()> {
        debug!("Processing network event '{:?}'...", event);
        let result = match event {
            Event::OpenWorkspace { id, password } => self.open_workspace(id, password).await,
            Event::CreateWorkspace { id } => self.create_workspace(id).await,
            Event::CloseWorkspace => {
                if self.session.take().is_some() {
                    info!("Closed workspace.");
                }
                Ok(())
            }
            Event::WatchItems { kind } => self.session().map(|s| s.sync.watch_items(kind)),
            Event::UnwatchItems { kind } => self.session().map(|s| s.sync.unwatch_items(kind)),
            Event::CreateItem { kind } => self.create_item(kind).await,
            Event::OpenItem { id, kind } => self.open_item(id, kind).await,
            Event::CloseItem { id } => self.session().map(|s| s.sync.close(&id)),
            Event::DeleteItem { id } => self.delete_item(id).await,
            Event::PersistBoard { id, patch, mode } => self
                .session()
                .map(|s| s.sync.persist_board(&id, &patch, mode)),
            Event::PersistNote { id, patch } => {
                self.session().map(|s| s.sync.persist_note(&id, &patch))
            }
            Event::PersistWhiteboard { id, patch } => self
                .session()
                .map(|s| s.sync.persist_whiteboard(&id, &patch)),
            Event::ResyncBoard { id } => self.resync_board(id).await,
            Event::RetryUnsaved => self.retry_unsaved().await,
            Event::ListWorkspaces => self.list_workspaces().await,
            Event::SetWorkspaceLocked { id, locked } => {
                self.admin_action(self.workspaces.set_locked(&id, locked)).await
            }
            Event::SetWorkspaceAdmin { id, admin } => {
                self.admin_action(self.workspaces.set_admin(&id, admin)).await
            }
            Event::DeleteWorkspace { id } => {
                self.admin_action(self.workspaces.delete(&id)).await
            }
        };
        if let Err(e) = &result {
            self.state.lock().await.set_error(e);
        }
        result
    }

    fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| StateError::WorkspaceNotOpen.into())
    }

    /// Open a workspace. Refusals are shown inline on the home view.
    ///
    async fn open_workspace(&mut self, id: String, password: Option<String>) -> Result<()> {
        info!("Opening workspace '{}'...", id);
        match self.workspaces.open(&id, password.as_deref()).await {
            Ok(workspace) => {
                self.enter(workspace).await;
                Ok(())
            }
            Err(e @ WorkspaceError::Store(_)) => Err(e.into()),
            Err(e) => {
                warn!("Could not open workspace '{}': {}", id, e);
                self.state.lock().await.set_home_error(e);
                Ok(())
            }
        }
    }

    async fn create_workspace(&mut self, id: String) -> Result<()> {
        match self.workspaces.create(&id).await {
            Ok(workspace) => {
                self.enter(workspace).await;
                Ok(())
            }
            Err(e @ WorkspaceError::Store(_)) => Err(e.into()),
            Err(e) => {
                warn!("Could not create workspace '{}': {}", id, e);
                self.state.lock().await.set_home_error(e);
                Ok(())
            }
        }
    }

    /// Bind the item service and a fresh sync adapter to the workspace. The
    /// previous adapter, if any, is dropped and its tasks aborted.
    ///
    async fn enter(&mut self, workspace: Workspace) {
        self.session = Some(Session {
            is_admin: workspace.is_admin,
            items: ItemService::new(Arc::clone(&self.store), &workspace.id),
            sync: SyncAdapter::new(
                Arc::clone(&self.store),
                &workspace.id,
                self.sync_config.clone(),
                self.sync_events.clone(),
            ),
        });
        self.state.lock().await.workspace_opened(workspace);
    }

    async fn create_item(&self, kind: ItemKind) -> Result<()> {
        let items = &self.session()?.items;
        let id = match kind {
            ItemKind::Kanban => items.create_board().await?.id,
            ItemKind::Note => items.create_note().await?,
            ItemKind::Whiteboard => items.create_whiteboard().await?,
        };
        self.open_item(id, kind).await
    }

    /// Load an item into its view and start its live subscription.
    ///
    async fn open_item(&self, id: String, kind: ItemKind) -> Result<()> {
        let session = self.session()?;
        match session.items.get(&id).await {
            Ok(document) => {
                self.state.lock().await.item_loaded(kind, document);
                session.sync.subscribe(&id);
                Ok(())
            }
            Err(WorkspaceError::ItemNotFound { .. }) => {
                self.state.lock().await.item_missing(&id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_item(&self, id: String) -> Result<()> {
        let session = self.session()?;
        session.sync.close(&id);
        session.items.delete_item(&id).await?;
        self.state.lock().await.set_info("Deleted");
        Ok(())
    }

    /// Replace the open board with the stored copy after a stale move.
    ///
    async fn resync_board(&self, id: String) -> Result<()> {
        match self.session()?.items.get_board(&id).await {
            Ok(board) => {
                debug!("Re-synced board {}.", id);
                self.state.lock().await.board_resynced(board);
                Ok(())
            }
            Err(WorkspaceError::ItemNotFound { .. }) => {
                self.state.lock().await.item_missing(&id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn retry_unsaved(&self) -> Result<()> {
        let count = self.session()?.sync.retry_unsaved();
        let mut state = self.state.lock().await;
        if count == 0 {
            state.set_info("Nothing to retry");
        } else {
            state.set_info(format!("Retrying {} unsaved change(s)...", count));
        }
        Ok(())
    }

    fn require_admin(&self) -> Result<()> {
        if self.session()?.is_admin {
            Ok(())
        } else {
            Err(StateError::NotAdmin.into())
        }
    }

    async fn list_workspaces(&self) -> Result<()> {
        self.require_admin()?;
        let workspaces = self.workspaces.list_all().await?;
        info!("Received {} workspaces.", workspaces.len());
        self.state.lock().await.set_admin_workspaces(workspaces);
        Ok(())
    }

    /// Run an admin change, then refresh the workspace list.
    ///
    async fn admin_action<F>(&self, action: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<(), WorkspaceError>>,
    {
        self.require_admin()?;
        action.await?;
        self.list_workspaces().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::View;
    use crate::store::{CollectionPath, DocPath, Fields, MemoryStore};
    use tokio::sync::mpsc::unbounded_channel;
    use serde_json::json;

    struct Fixture {
        state: Arc<Mutex<State>>,
        store: Arc<MemoryStore>,
    }

    impl Fixture {
        fn new() -> Fixture {
            Fixture {
                state: Arc::new(Mutex::new(State::default())),
                store: Arc::new(MemoryStore::new()),
            }
        }

        fn handler(&self) -> Handler<'_> {
            let (tx, _rx) = unbounded_channel();
            Handler::new(&self.state, self.store.clone(), SyncConfig::default(), tx)
        }
    }

    #[tokio::test]
    async fn create_workspace_then_board() -> Result<()> {
        let fixture = Fixture::new();
        let mut handler = fixture.handler();
        handler
            .handle(Event::CreateWorkspace {
                id: "team".to_string(),
            })
            .await?;
        assert_eq!(
            fixture.state.lock().await.workspace_id(),
            Some("team")
        );

        handler
            .handle(Event::CreateItem {
                kind: ItemKind::Kanban,
            })
            .await?;
        let state = fixture.state.lock().await;
        assert_eq!(state.current_view(), View::Board);
        assert_eq!(state.board().unwrap().column_count(), 3);
        let stored = fixture
            .store
            .query(&CollectionPath::items("team"), &[])
            .await?;
        assert_eq!(stored.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn refused_open_is_shown_on_home_form() -> Result<()> {
        let fixture = Fixture::new();
        let mut handler = fixture.handler();
        handler
            .handle(Event::OpenWorkspace {
                id: "ghost".to_string(),
                password: None,
            })
            .await?;
        let state = fixture.state.lock().await;
        assert!(state.workspace().is_none());
        assert!(state.home_form().error.as_deref().unwrap().contains("ghost"));
        Ok(())
    }

    #[tokio::test]
    async fn item_events_need_an_open_workspace() {
        let fixture = Fixture::new();
        let mut handler = fixture.handler();
        let result = handler
            .handle(Event::CreateItem {
                kind: ItemKind::Note,
            })
            .await;
        assert!(result.is_err());
        assert!(fixture.state.lock().await.status_line().unwrap().is_error);
    }

    #[tokio::test]
    async fn opening_a_missing_item_reports_it() -> Result<()> {
        let fixture = Fixture::new();
        let mut handler = fixture.handler();
        handler
            .handle(Event::CreateWorkspace {
                id: "team".to_string(),
            })
            .await?;
        handler
            .handle(Event::OpenItem {
                id: "nope".to_string(),
                kind: ItemKind::Note,
            })
            .await?;
        let state = fixture.state.lock().await;
        assert_eq!(state.current_view(), View::Workspace);
        assert!(state.status_line().unwrap().message.contains("no longer exists"));
        Ok(())
    }

    #[tokio::test]
    async fn admin_events_need_an_admin_workspace() -> Result<()> {
        let fixture = Fixture::new();
        let mut handler = fixture.handler();
        handler
            .handle(Event::CreateWorkspace {
                id: "plain".to_string(),
            })
            .await?;
        assert!(handler.handle(Event::ListWorkspaces).await.is_err());

        let mut fields = Fields::new();
        fields.insert("isAdmin".to_string(), json!(true));
        fixture
            .store
            .update(&DocPath::workspace("plain"), fields)
            .await?;
        handler
            .handle(Event::OpenWorkspace {
                id: "plain".to_string(),
                password: None,
            })
            .await?;
        handler
            .handle(Event::SetWorkspaceLocked {
                id: "plain".to_string(),
                locked: true,
            })
            .await?;
        let state = fixture.state.lock().await;
        assert_eq!(state.admin_workspaces().len(), 1);
        assert!(state.admin_workspaces()[0].is_locked);
        Ok(())
    }
}
