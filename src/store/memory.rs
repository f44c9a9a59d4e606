use super::{
    CollectionPath, DocPath, Document, DocumentStore, DocumentSubscription, Fields, Filter,
    QuerySubscription, StoreError, StoreResult, Subscription,
};
use async_trait::async_trait;
use chrono::Utc;
use log::*;
use rand::{distributions::Alphanumeric, Rng};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::UnboundedSender;

const GENERATED_ID_LENGTH: usize = 20;

type DocSender = UnboundedSender<StoreResult<Option<Document>>>;
type QuerySender = UnboundedSender<StoreResult<Vec<Document>>>;

#[derive(Default)]
struct Inner {
    collections: BTreeMap<CollectionPath, BTreeMap<String, Document>>,
    document_watchers: Vec<(DocPath, DocSender)>,
    query_watchers: Vec<(CollectionPath, Vec<Filter>, QuerySender)>,
}

/// In-process document store. Every mutation pushes fresh snapshots to the
/// subscribers it affects, the way the hosted database does.
///
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Number of live subscriptions. Closed subscribers are pruned on the
    /// next notification.
    ///
    pub fn subscriber_count(&self) -> usize {
        let inner = self.lock();
        inner.document_watchers.len() + inner.query_watchers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn document(&self, path: &DocPath) -> Option<Document> {
        self.collections
            .get(&path.collection())
            .and_then(|docs| docs.get(path.id()))
            .cloned()
    }

    fn query(&self, collection: &CollectionPath, filters: &[Filter]) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| filters.iter().all(|f| f.matches(&doc.fields)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Push snapshots for a changed document and drop subscribers that have
    /// gone away.
    ///
    fn notify(&mut self, path: &DocPath) {
        let snapshot = self.document(path);
        self.document_watchers.retain(|(watched, sender)| {
            watched != path || sender.send(Ok(snapshot.clone())).is_ok()
        });

        let collection = path.collection();
        let mut watchers = std::mem::take(&mut self.query_watchers);
        watchers.retain(|(watched, filters, sender)| {
            *watched != collection || sender.send(Ok(self.query(watched, filters))).is_ok()
        });
        self.query_watchers = watchers;
    }
}

fn generated_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_ID_LENGTH)
        .map(char::from)
        .collect()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_if_absent(&self, path: &DocPath, fields: Fields) -> StoreResult<bool> {
        let mut inner = self.lock();
        if inner.document(path).is_some() {
            return Ok(false);
        }
        let now = Utc::now();
        inner.collections.entry(path.collection()).or_default().insert(
            path.id().to_owned(),
            Document {
                id: path.id().to_owned(),
                fields,
                create_time: Some(now),
                update_time: Some(now),
            },
        );
        debug!("Created document {} in memory.", path);
        inner.notify(path);
        Ok(true)
    }

    async fn add(&self, collection: &CollectionPath, fields: Fields) -> StoreResult<String> {
        let mut id = generated_id();
        while self.lock().document(&collection.doc(&id)).is_some() {
            id = generated_id();
        }
        self.create_if_absent(&collection.doc(&id), fields).await?;
        Ok(id)
    }

    async fn get(&self, path: &DocPath) -> StoreResult<Option<Document>> {
        Ok(self.lock().document(path))
    }

    async fn update(&self, path: &DocPath, fields: Fields) -> StoreResult<()> {
        let mut inner = self.lock();
        let doc = inner
            .collections
            .get_mut(&path.collection())
            .and_then(|docs| docs.get_mut(path.id()))
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })?;
        for (key, value) in fields {
            doc.fields.insert(key, value);
        }
        doc.update_time = Some(Utc::now());
        inner.notify(path);
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> StoreResult<()> {
        let mut inner = self.lock();
        let removed = inner
            .collections
            .get_mut(&path.collection())
            .and_then(|docs| docs.remove(path.id()));
        if removed.is_some() {
            debug!("Deleted document {} from memory.", path);
            inner.notify(path);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        filters: &[Filter],
    ) -> StoreResult<Vec<Document>> {
        Ok(self.lock().query(collection, filters))
    }

    async fn subscribe_document(&self, path: &DocPath) -> StoreResult<DocumentSubscription> {
        let (sender, subscription) = Subscription::channel();
        let mut inner = self.lock();
        // Initial snapshot, like the hosted listener.
        let _ = sender.send(Ok(inner.document(path)));
        inner.document_watchers.push((path.clone(), sender));
        Ok(subscription)
    }

    async fn subscribe_query(
        &self,
        collection: &CollectionPath,
        filters: &[Filter],
    ) -> StoreResult<QuerySubscription> {
        let (sender, subscription) = Subscription::channel();
        let mut inner = self.lock();
        let _ = sender.send(Ok(inner.query(collection, filters)));
        inner
            .query_watchers
            .push((collection.clone(), filters.to_vec(), sender));
        Ok(subscription)
    }
}
