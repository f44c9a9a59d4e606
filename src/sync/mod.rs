//! Sync adapter between local state and the document store.
//!
//! Local edits arrive as partial-field patches. Debounced patches are merged
//! per item and written once the item has been quiet for the debounce delay;
//! immediate patches (moves and structural edits) are written right away
//! together with whatever was still waiting. All writes go through a single
//! writer task so they reach the store in the order they were made. Remote
//! changes flow the other way as `SyncEvent`s.

mod retry;
mod scheduler;
mod status;

pub use retry::RetryPolicy;
pub use scheduler::Scheduler;
pub use status::{PersistMode, SyncStatus};

use crate::model::{timestamp_value, BoardPatch, ItemKind, NotePatch, WhiteboardPatch};
use crate::store::{
    CollectionPath, DocPath, Document, DocumentStore, Fields, Filter, StoreResult, Subscription,
};
use chrono::Utc;
use log::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Timing of persistence.
///
#[derive(Clone, Debug, PartialEq)]
pub struct SyncConfig {
    pub debounce: Duration,
    pub whiteboard_debounce: Duration,
    pub retry: RetryPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            debounce: Duration::from_millis(500),
            whiteboard_debounce: Duration::from_millis(1000),
            retry: RetryPolicy::default(),
        }
    }
}

/// Notifications from the sync side to the UI.
///
#[derive(Clone, Debug)]
pub enum SyncEvent {
    /// Latest snapshot of a subscribed item; `None` once it is deleted.
    Document {
        key: String,
        document: Option<Document>,
    },
    /// Latest result of an item list subscription.
    Query {
        kind: ItemKind,
        documents: Vec<Document>,
    },
    Status {
        key: String,
        status: SyncStatus,
    },
    SubscriptionError {
        key: String,
        message: String,
    },
}

pub type SyncEventSender = UnboundedSender<SyncEvent>;
pub type SyncEventReceiver = UnboundedReceiver<SyncEvent>;

struct Write {
    key: String,
    fields: Fields,
}

/// State shared with timer and writer tasks.
///
struct Shared {
    pending: Mutex<HashMap<String, Fields>>,
    unsaved: Mutex<HashMap<String, Fields>>,
    /// Taken on shutdown so the writer drains its queue and stops.
    writes: Mutex<Option<UnboundedSender<Write>>>,
    events: SyncEventSender,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn merge_into(target: &mut Fields, fields: Fields) {
    for (key, value) in fields {
        target.insert(key, value);
    }
}

impl Shared {
    fn emit(&self, event: SyncEvent) {
        if self.events.send(event).is_err() {
            debug!("Sync event dropped: receiver closed.");
        }
    }

    fn status(&self, key: &str, status: SyncStatus) {
        self.emit(SyncEvent::Status {
            key: key.to_owned(),
            status,
        });
    }

    fn merge_pending(&self, key: &str, fields: Fields) {
        let mut pending = lock(&self.pending);
        merge_into(pending.entry(key.to_owned()).or_default(), fields);
    }

    fn keep_unsaved(&self, key: &str, fields: Fields) {
        let mut unsaved = lock(&self.unsaved);
        merge_into(unsaved.entry(key.to_owned()).or_default(), fields);
    }

    /// Forget unsaved values for fields that have since been written.
    ///
    fn clear_unsaved(&self, key: &str, written: &Fields) {
        let mut unsaved = lock(&self.unsaved);
        if let Some(fields) = unsaved.get_mut(key) {
            fields.retain(|name, _| !written.contains_key(name));
            if fields.is_empty() {
                unsaved.remove(key);
            }
        }
    }

    fn enqueue(&self, key: &str, fields: Fields) {
        let write = Write {
            key: key.to_owned(),
            fields,
        };
        let sent = match lock(&self.writes).as_ref() {
            Some(writes) => writes.send(write).map_err(|e| e.0),
            None => Err(write),
        };
        if let Err(write) = sent {
            error!("Writer stopped; keeping edit to {} for retry.", key);
            self.keep_unsaved(key, write.fields);
            self.status(key, SyncStatus::Unsaved);
        }
    }

    /// Send the pending patch for a key to the writer. Returns whether there
    /// was one.
    ///
    fn flush(&self, key: &str) -> bool {
        let pending = lock(&self.pending).remove(key);
        match pending {
            Some(fields) if !fields.is_empty() => {
                self.enqueue(key, fields);
                true
            }
            _ => false,
        }
    }
}

/// Workspace-scoped bridge to the document store.
///
pub struct SyncAdapter {
    workspace: String,
    store: Arc<dyn DocumentStore>,
    config: SyncConfig,
    shared: Arc<Shared>,
    scheduler: Scheduler<String>,
    subscriptions: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl SyncAdapter {
    /// Start the writer task for a workspace. Must be called from within a
    /// tokio runtime.
    ///
    pub fn new(
        store: Arc<dyn DocumentStore>,
        workspace: &str,
        config: SyncConfig,
        events: SyncEventSender,
    ) -> SyncAdapter {
        let (writes, receiver) = unbounded_channel();
        let shared = Arc::new(Shared {
            pending: Mutex::new(HashMap::new()),
            unsaved: Mutex::new(HashMap::new()),
            writes: Mutex::new(Some(writes)),
            events,
        });
        tokio::spawn(run_writer(
            receiver,
            Arc::clone(&store),
            workspace.to_owned(),
            config.retry.clone(),
            Arc::clone(&shared),
        ));
        debug!("Sync adapter started for workspace {}.", workspace);
        SyncAdapter {
            workspace: workspace.to_owned(),
            store,
            config,
            shared,
            scheduler: Scheduler::new(),
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Persist a partial-field update of an item.
    ///
    pub fn persist(&self, key: &str, kind: ItemKind, fields: Fields, mode: PersistMode) {
        if fields.is_empty() {
            return;
        }
        match mode {
            PersistMode::Debounced => {
                self.shared.merge_pending(key, fields);
                self.shared.status(key, SyncStatus::Pending);
                let delay = if kind.is_whiteboard() {
                    self.config.whiteboard_debounce
                } else {
                    self.config.debounce
                };
                let shared = Arc::clone(&self.shared);
                let own_key = key.to_owned();
                self.scheduler.schedule(key.to_owned(), delay, async move {
                    shared.flush(&own_key);
                });
            }
            PersistMode::Immediate => {
                self.scheduler.cancel(&key.to_owned());
                self.shared.merge_pending(key, fields);
                self.shared.flush(key);
            }
        }
    }

    pub fn persist_board(&self, id: &str, patch: &BoardPatch, mode: PersistMode) {
        self.persist(id, ItemKind::Kanban, patch.to_fields(), mode);
    }

    pub fn persist_note(&self, id: &str, patch: &NotePatch) {
        self.persist(id, ItemKind::Note, patch.to_fields(), PersistMode::Debounced);
    }

    pub fn persist_whiteboard(&self, id: &str, patch: &WhiteboardPatch) {
        self.persist(
            id,
            ItemKind::Whiteboard,
            patch.to_fields(),
            PersistMode::Debounced,
        );
    }

    /// Whether an edit is waiting for its debounce timer.
    ///
    pub fn is_pending(&self, key: &str) -> bool {
        self.scheduler.is_pending(&key.to_owned())
    }

    pub fn has_unsaved(&self, key: &str) -> bool {
        lock(&self.shared.unsaved).contains_key(key)
    }

    /// Queue every patch whose retries ran out. Returns how many were queued.
    ///
    pub fn retry_unsaved(&self) -> usize {
        let unsaved: Vec<(String, Fields)> = lock(&self.shared.unsaved).drain().collect();
        for (key, fields) in &unsaved {
            info!("Retrying unsaved changes to {}.", key);
            self.shared.enqueue(key, fields.clone());
        }
        unsaved.len()
    }

    /// Open a live subscription to an item. Replaces any previous one for the
    /// same key.
    ///
    pub fn subscribe(&self, key: &str) {
        let store = Arc::clone(&self.store);
        let path = DocPath::item(&self.workspace, key);
        let events = self.shared.events.clone();
        let own_key = key.to_owned();
        let task = tokio::spawn(async move {
            match store.subscribe_document(&path).await {
                Ok(subscription) => {
                    forward(subscription, &events, &own_key, |document| {
                        SyncEvent::Document {
                            key: own_key.clone(),
                            document,
                        }
                    })
                    .await
                }
                Err(e) => subscription_failed(&events, &own_key, e.to_string()),
            }
        });
        self.replace_subscription(key, task);
    }

    /// Open a live subscription to the workspace's items of one kind.
    ///
    pub fn watch_items(&self, kind: ItemKind) {
        let store = Arc::clone(&self.store);
        let collection = CollectionPath::items(&self.workspace);
        let events = self.shared.events.clone();
        let key = items_key(kind);
        let own_key = key.clone();
        let task = tokio::spawn(async move {
            let filters = [Filter::eq("type", kind.as_str())];
            match store.subscribe_query(&collection, &filters).await {
                Ok(subscription) => {
                    forward(subscription, &events, &own_key, |documents| {
                        SyncEvent::Query { kind, documents }
                    })
                    .await
                }
                Err(e) => subscription_failed(&events, &own_key, e.to_string()),
            }
        });
        self.replace_subscription(&key, task);
    }

    pub fn unwatch_items(&self, kind: ItemKind) {
        if let Some(task) = lock(&self.subscriptions).remove(&items_key(kind)) {
            task.abort();
        }
    }

    fn replace_subscription(&self, key: &str, task: JoinHandle<()>) {
        if let Some(previous) = lock(&self.subscriptions).insert(key.to_owned(), task) {
            previous.abort();
        }
    }

    /// Tear down an item's view: stop its subscription and drop any edit
    /// still waiting for its timer. Writes already queued still land.
    ///
    pub fn close(&self, key: &str) {
        if let Some(task) = lock(&self.subscriptions).remove(key) {
            task.abort();
        }
        self.scheduler.cancel(&key.to_owned());
        if let Some(fields) = lock(&self.shared.pending).remove(key) {
            let names: Vec<&str> = fields.keys().map(String::as_str).collect();
            warn!(
                "Discarding pending edit to {} on close: {}",
                key,
                names.join(", ")
            );
        }
        debug!("Closed sync for {}.", key);
    }
}

/// Leaving a workspace stops its subscriptions but not its writes: edits
/// still waiting for their timer are flushed, and the writer finishes the
/// queue (retries included) before it exits.
///
impl Drop for SyncAdapter {
    fn drop(&mut self) {
        self.scheduler.cancel_all();
        for (_, task) in lock(&self.subscriptions).drain() {
            task.abort();
        }
        let keys: Vec<String> = lock(&self.shared.pending).keys().cloned().collect();
        for key in keys {
            if self.shared.flush(&key) {
                info!("Flushed pending edit to {} on shutdown.", key);
            }
        }
        lock(&self.shared.writes).take();
        debug!("Sync adapter for workspace {} stopped.", self.workspace);
    }
}

fn items_key(kind: ItemKind) -> String {
    format!("items:{}", kind)
}

fn subscription_failed(events: &SyncEventSender, key: &str, message: String) {
    warn!("Subscription to {} failed: {}", key, message);
    let _ = events.send(SyncEvent::SubscriptionError {
        key: key.to_owned(),
        message,
    });
}

/// Relay snapshots until the subscription ends or nobody listens.
///
async fn forward<T, F>(
    mut subscription: Subscription<T>,
    events: &SyncEventSender,
    key: &str,
    to_event: F,
) where
    F: Fn(T) -> SyncEvent,
{
    while let Some(snapshot) = subscription.next().await {
        let event = match snapshot {
            Ok(value) => to_event(value),
            Err(e) => SyncEvent::SubscriptionError {
                key: key.to_owned(),
                message: e.to_string(),
            },
        };
        if events.send(event).is_err() {
            break;
        }
    }
}

/// Apply queued writes one at a time, in order.
///
async fn run_writer(
    mut receiver: UnboundedReceiver<Write>,
    store: Arc<dyn DocumentStore>,
    workspace: String,
    policy: RetryPolicy,
    shared: Arc<Shared>,
) {
    while let Some(Write { key, mut fields }) = receiver.recv().await {
        fields.insert("updatedAt".to_string(), timestamp_value(Utc::now()));
        shared.status(&key, SyncStatus::Saving);
        let path = DocPath::item(&workspace, &key);
        let result: StoreResult<()> = policy
            .retry(
                &format!("save {}", path),
                || store.update(&path, fields.clone()),
                |attempt, _| shared.status(&key, SyncStatus::Retrying { attempt }),
            )
            .await;
        match result {
            Ok(()) => {
                debug!("Saved {} field(s) of {}.", fields.len(), path);
                shared.clear_unsaved(&key, &fields);
                shared.status(&key, SyncStatus::Saved);
            }
            Err(e) if retry::is_gone(&e) => {
                warn!("{} no longer exists; dropping its edit.", path);
                shared.status(&key, SyncStatus::Discarded);
            }
            Err(e) => {
                error!("Failed to save {}: {}", path, e);
                fields.remove("updatedAt");
                shared.keep_unsaved(&key, fields);
                shared.status(&key, SyncStatus::Unsaved);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Board;
    use crate::store::{DocumentSubscription, MemoryStore, QuerySubscription, StoreError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::{sleep, timeout, Instant};

    /// Memory store whose updates can be made to fail.
    struct FlakyStore {
        inner: MemoryStore,
        failures: AtomicU32,
        updates: AtomicU32,
    }

    impl FlakyStore {
        fn fail_next(&self, count: u32) {
            self.failures.store(count, Ordering::SeqCst);
        }

        fn updates(&self) -> u32 {
            self.updates.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn create_if_absent(&self, path: &DocPath, fields: Fields) -> StoreResult<bool> {
            self.inner.create_if_absent(path, fields).await
        }

        async fn add(&self, collection: &CollectionPath, fields: Fields) -> StoreResult<String> {
            self.inner.add(collection, fields).await
        }

        async fn get(&self, path: &DocPath) -> StoreResult<Option<Document>> {
            self.inner.get(path).await
        }

        async fn update(&self, path: &DocPath, fields: Fields) -> StoreResult<()> {
            let failing = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(StoreError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.update(path, fields).await
        }

        async fn delete(&self, path: &DocPath) -> StoreResult<()> {
            self.inner.delete(path).await
        }

        async fn query(
            &self,
            collection: &CollectionPath,
            filters: &[Filter],
        ) -> StoreResult<Vec<Document>> {
            self.inner.query(collection, filters).await
        }

        async fn subscribe_document(&self, path: &DocPath) -> StoreResult<DocumentSubscription> {
            self.inner.subscribe_document(path).await
        }

        async fn subscribe_query(
            &self,
            collection: &CollectionPath,
            filters: &[Filter],
        ) -> StoreResult<QuerySubscription> {
            self.inner.subscribe_query(collection, filters).await
        }
    }

    async fn setup() -> (Arc<FlakyStore>, SyncAdapter, SyncEventReceiver) {
        let memory = MemoryStore::new();
        memory
            .create_if_absent(
                &DocPath::item("team", "b1"),
                Board::new_default("b1").to_create_fields(Utc::now()),
            )
            .await
            .unwrap();
        let store = Arc::new(FlakyStore {
            inner: memory,
            failures: AtomicU32::new(0),
            updates: AtomicU32::new(0),
        });
        let (tx, rx) = unbounded_channel();
        let config = SyncConfig {
            retry: RetryPolicy {
                use_jitter: false,
                ..RetryPolicy::default()
            },
            ..SyncConfig::default()
        };
        let adapter = SyncAdapter::new(store.clone(), "team", config, tx);
        (store, adapter, rx)
    }

    /// Collect statuses for a key until the wanted one arrives.
    async fn wait_for(
        events: &mut SyncEventReceiver,
        key: &str,
        wanted: SyncStatus,
    ) -> Vec<SyncStatus> {
        let mut seen = vec![];
        timeout(Duration::from_secs(60), async {
            while let Some(event) = events.recv().await {
                if let SyncEvent::Status { key: k, status } = event {
                    if k == key {
                        seen.push(status);
                        if status == wanted {
                            break;
                        }
                    }
                }
            }
        })
        .await
        .expect("status never arrived");
        seen
    }

    async fn next_document(events: &mut SyncEventReceiver) -> Option<Document> {
        timeout(Duration::from_secs(60), async {
            loop {
                if let Some(SyncEvent::Document { document, .. }) = events.recv().await {
                    return document;
                }
            }
        })
        .await
        .expect("snapshot never arrived")
    }

    fn title(value: &str) -> BoardPatch {
        BoardPatch {
            title: Some(value.to_string()),
            ..BoardPatch::default()
        }
    }

    async fn stored(store: &FlakyStore) -> Fields {
        store
            .get(&DocPath::item("team", "b1"))
            .await
            .unwrap()
            .unwrap()
            .fields
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_coalesce_into_one_write() {
        let (store, adapter, mut events) = setup().await;
        let started = Instant::now();
        for value in ["a", "ab", "abc"] {
            adapter.persist_board("b1", &title(value), PersistMode::Debounced);
            sleep(Duration::from_millis(100)).await;
        }
        assert!(adapter.is_pending("b1"));

        let seen = wait_for(&mut events, "b1", SyncStatus::Saved).await;
        assert!(started.elapsed() >= Duration::from_millis(700));
        assert_eq!(seen.last(), Some(&SyncStatus::Saved));
        assert_eq!(store.updates(), 1);
        let fields = stored(&store).await;
        assert_eq!(fields["title"], json!("abc"));
        assert!(fields.contains_key("updatedAt"));
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_write_carries_pending_edit() {
        let (store, adapter, mut events) = setup().await;
        adapter.persist_board("b1", &title("renamed"), PersistMode::Debounced);
        let order = BoardPatch {
            column_order: Some(vec![
                "column-3".to_string(),
                "column-1".to_string(),
                "column-2".to_string(),
            ]),
            ..BoardPatch::default()
        };
        adapter.persist_board("b1", &order, PersistMode::Immediate);
        assert!(!adapter.is_pending("b1"));

        wait_for(&mut events, "b1", SyncStatus::Saved).await;
        sleep(Duration::from_secs(2)).await;
        assert_eq!(store.updates(), 1);
        let fields = stored(&store).await;
        assert_eq!(fields["title"], json!("renamed"));
        assert_eq!(fields["columnOrder"], json!(["column-3", "column-1", "column-2"]));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_mark_unsaved_until_manual_retry() {
        let (store, adapter, mut events) = setup().await;
        store.fail_next(4);
        adapter.persist_board("b1", &title("offline"), PersistMode::Immediate);

        let seen = wait_for(&mut events, "b1", SyncStatus::Unsaved).await;
        assert_eq!(
            seen,
            vec![
                SyncStatus::Saving,
                SyncStatus::Retrying { attempt: 1 },
                SyncStatus::Retrying { attempt: 2 },
                SyncStatus::Retrying { attempt: 3 },
                SyncStatus::Unsaved,
            ]
        );
        assert!(adapter.has_unsaved("b1"));
        assert_eq!(store.updates(), 0);

        assert_eq!(adapter.retry_unsaved(), 1);
        wait_for(&mut events, "b1", SyncStatus::Saved).await;
        assert!(!adapter.has_unsaved("b1"));
        assert_eq!(stored(&store).await["title"], json!("offline"));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_recovers() {
        let (store, adapter, mut events) = setup().await;
        store.fail_next(1);
        adapter.persist_board("b1", &title("flaky"), PersistMode::Immediate);
        let seen = wait_for(&mut events, "b1", SyncStatus::Saved).await;
        assert!(seen.contains(&SyncStatus::Retrying { attempt: 1 }));
        assert!(!adapter.has_unsaved("b1"));
    }

    #[tokio::test(start_paused = true)]
    async fn close_discards_pending_edit() {
        let (store, adapter, _events) = setup().await;
        adapter.persist_board("b1", &title("never"), PersistMode::Debounced);
        adapter.close("b1");
        assert!(!adapter.is_pending("b1"));
        sleep(Duration::from_secs(2)).await;
        assert_eq!(store.updates(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn later_save_supersedes_unsaved_field() {
        let (store, adapter, mut events) = setup().await;
        store.fail_next(4);
        adapter.persist_board("b1", &title("old"), PersistMode::Immediate);
        wait_for(&mut events, "b1", SyncStatus::Unsaved).await;
        assert!(adapter.has_unsaved("b1"));

        adapter.persist_board("b1", &title("new"), PersistMode::Immediate);
        wait_for(&mut events, "b1", SyncStatus::Saved).await;
        assert!(!adapter.has_unsaved("b1"));
        assert_eq!(adapter.retry_unsaved(), 0);
        assert_eq!(stored(&store).await["title"], json!("new"));
    }

    #[tokio::test(start_paused = true)]
    async fn later_save_keeps_other_unsaved_fields() {
        let (store, adapter, mut events) = setup().await;
        store.fail_next(4);
        let patch = BoardPatch {
            title: Some("old".to_string()),
            column_order: Some(vec!["column-2".to_string(), "column-1".to_string()]),
            ..BoardPatch::default()
        };
        adapter.persist_board("b1", &patch, PersistMode::Immediate);
        wait_for(&mut events, "b1", SyncStatus::Unsaved).await;

        adapter.persist_board("b1", &title("new"), PersistMode::Immediate);
        wait_for(&mut events, "b1", SyncStatus::Saved).await;
        assert!(adapter.has_unsaved("b1"));

        assert_eq!(adapter.retry_unsaved(), 1);
        wait_for(&mut events, "b1", SyncStatus::Saved).await;
        let fields = stored(&store).await;
        assert_eq!(fields["title"], json!("new"));
        assert_eq!(fields["columnOrder"], json!(["column-2", "column-1"]));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_adapter_finishes_retrying_write() {
        let (store, adapter, mut events) = setup().await;
        store.fail_next(1);
        adapter.persist_board("b1", &title("moved"), PersistMode::Immediate);
        wait_for(&mut events, "b1", SyncStatus::Retrying { attempt: 1 }).await;

        drop(adapter);
        wait_for(&mut events, "b1", SyncStatus::Saved).await;
        assert_eq!(store.updates(), 1);
        assert_eq!(stored(&store).await["title"], json!("moved"));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_adapter_flushes_debounced_edit() {
        let (store, adapter, mut events) = setup().await;
        adapter.persist_board("b1", &title("renamed"), PersistMode::Debounced);
        drop(adapter);

        wait_for(&mut events, "b1", SyncStatus::Saved).await;
        assert_eq!(store.updates(), 1);
        assert_eq!(stored(&store).await["title"], json!("renamed"));
    }

    #[tokio::test(start_paused = true)]
    async fn write_to_deleted_item_is_discarded() {
        let (_store, adapter, mut events) = setup().await;
        adapter.persist_board("gone", &title("x"), PersistMode::Immediate);
        let seen = wait_for(&mut events, "gone", SyncStatus::Discarded).await;
        assert_eq!(seen, vec![SyncStatus::Saving, SyncStatus::Discarded]);
        assert!(!adapter.has_unsaved("gone"));
    }

    #[tokio::test]
    async fn subscription_delivers_snapshots_including_own_echo() {
        let (_store, adapter, mut events) = setup().await;
        adapter.subscribe("b1");
        let first = next_document(&mut events).await.unwrap();
        assert_eq!(first.fields["title"], json!("New kanban board"));

        adapter.persist_board("b1", &title("echo"), PersistMode::Immediate);
        let echo = next_document(&mut events).await.unwrap();
        assert_eq!(echo.fields["title"], json!("echo"));
    }

    #[tokio::test]
    async fn item_watch_tracks_new_items() {
        let (store, adapter, mut events) = setup().await;
        adapter.watch_items(ItemKind::Kanban);
        let mut sizes = vec![];
        while sizes.len() < 2 {
            if let Some(SyncEvent::Query { kind, documents }) = events.recv().await {
                assert_eq!(kind, ItemKind::Kanban);
                sizes.push(documents.len());
                if sizes.len() == 1 {
                    store
                        .add(
                            &CollectionPath::items("team"),
                            Board::new_default("").to_create_fields(Utc::now()),
                        )
                        .await
                        .unwrap();
                }
            }
        }
        assert_eq!(sizes, vec![1, 2]);
    }
}
