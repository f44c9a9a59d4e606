//! REST client for the hosted document database.
//!
//! Documents are addressed below `{base_url}/storages/...`. The database has
//! no push channel over plain REST, so subscriptions poll at a fixed interval
//! and emit a snapshot whenever the document (or the set of matching
//! documents) changes its `updateTime`.

mod value;

use super::{
    CollectionPath, DocPath, Document, DocumentStore, DocumentSubscription, Fields, Filter,
    QuerySubscription, StoreError, StoreResult, Subscription, ITEMS, WORKSPACES,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::*;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_HOST: &str = "https://firestore.googleapis.com/v1";

/// Document store backed by the hosted database's REST API.
///
#[derive(Clone)]
pub struct FirestoreStore {
    client: Arc<Client>,
}

struct Client {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    poll_interval: Duration,
}

impl FirestoreStore {
    /// Returns a new instance rooted at the given documents URL.
    ///
    pub fn new(base_url: &str, api_key: Option<&str>, poll_interval: Duration) -> FirestoreStore {
        debug!("Initializing document store client for {}...", base_url);
        FirestoreStore {
            client: Arc::new(Client {
                http_client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_owned(),
                api_key: api_key.filter(|k| !k.is_empty()).map(str::to_owned),
                poll_interval,
            }),
        }
    }

    /// Return the documents URL of a project's default database.
    ///
    pub fn base_url_for(project_id: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            DEFAULT_HOST, project_id
        )
    }
}

impl Client {
    /// Append a document path to the base URL, percent-encoding each segment
    /// so ids holding `?`, `#`, `%` or spaces stay inside the path.
    ///
    fn url(&self, path: &str) -> String {
        if path.starts_with(':') {
            return format!("{}{}", self.base_url, path);
        }
        match reqwest::Url::parse(&self.base_url) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().extend(path.split('/'));
                }
                url.to_string()
            }
            Err(e) => {
                warn!("Invalid store URL '{}': {}", self.base_url, e);
                format!("{}/{}", self.base_url, path)
            }
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http_client.request(method, self.url(path));
        match &self.api_key {
            Some(key) => builder.query(&[("key", key)]),
            None => builder,
        }
    }

    /// Turn non-success responses into errors, keeping the response body as
    /// the message.
    ///
    async fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("Unable to read response"));
        error!("Store request failed with status {}: {}", status, message);
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get(&self, path: &DocPath) -> StoreResult<Option<Document>> {
        let response = self
            .request(Method::GET, &path.to_string())
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Value = Client::check(response).await?.json().await?;
        Ok(Some(parse_document(&body)?))
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        filters: &[Filter],
    ) -> StoreResult<Vec<Document>> {
        let (parent, collection_id) = match collection {
            CollectionPath::Workspaces => (None, WORKSPACES),
            CollectionPath::Items(workspace) => (Some(DocPath::workspace(workspace)), ITEMS),
        };
        let url_path = match parent {
            Some(parent) => format!("{}:runQuery", parent),
            None => ":runQuery".to_string(),
        };
        let mut structured_query = json!({ "from": [{ "collectionId": collection_id }] });
        if let Some(filter) = where_clause(filters) {
            structured_query["where"] = filter;
        }
        let response = self
            .request(Method::POST, &url_path)
            .json(&json!({ "structuredQuery": structured_query }))
            .send()
            .await?;
        let rows: Vec<Value> = Client::check(response).await?.json().await?;
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(parse_document)
            .collect()
    }
}

fn where_clause(filters: &[Filter]) -> Option<Value> {
    let mut clauses: Vec<Value> = filters
        .iter()
        .map(|filter| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": field_path(&filter.field) },
                    "op": "EQUAL",
                    "value": value::encode(&filter.value),
                }
            })
        })
        .collect();
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(json!({ "compositeFilter": { "op": "AND", "filters": clauses } })),
    }
}

/// Quote field names that are not plain identifiers.
///
fn field_path(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_owned()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn parse_time(body: &Value, key: &str) -> Option<DateTime<Utc>> {
    body.get(key)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn parse_document(body: &Value) -> StoreResult<Document> {
    let name = body
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::InvalidDocument("document without a name".to_string()))?;
    let id = name.rsplit('/').next().unwrap_or(name).to_owned();
    let fields = match body.get("fields") {
        Some(fields) => value::decode_fields(fields)?,
        None => Fields::new(),
    };
    Ok(Document {
        id,
        fields,
        create_time: parse_time(body, "createTime"),
        update_time: parse_time(body, "updateTime"),
    })
}

fn document_body(fields: &Fields) -> Value {
    json!({ "fields": value::encode_fields(fields) })
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn create_if_absent(&self, path: &DocPath, fields: Fields) -> StoreResult<bool> {
        debug!("Creating document {}...", path);
        let response = self
            .client
            .request(Method::POST, &path.collection().to_string())
            .query(&[("documentId", path.id())])
            .json(&document_body(&fields))
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            debug!("Document {} already exists.", path);
            return Ok(false);
        }
        Client::check(response).await?;
        Ok(true)
    }

    async fn add(&self, collection: &CollectionPath, fields: Fields) -> StoreResult<String> {
        debug!("Adding document to {}...", collection);
        let response = self
            .client
            .request(Method::POST, &collection.to_string())
            .json(&document_body(&fields))
            .send()
            .await?;
        let body: Value = Client::check(response).await?.json().await?;
        Ok(parse_document(&body)?.id)
    }

    async fn get(&self, path: &DocPath) -> StoreResult<Option<Document>> {
        self.client.get(path).await
    }

    async fn update(&self, path: &DocPath, fields: Fields) -> StoreResult<()> {
        debug!("Updating {} field(s) of {}...", fields.len(), path);
        let mut params: Vec<(&str, String)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", field_path(key)))
            .collect();
        params.push(("currentDocument.exists", "true".to_string()));
        let response = self
            .client
            .request(Method::PATCH, &path.to_string())
            .query(&params)
            .json(&document_body(&fields))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                path: path.to_string(),
            });
        }
        Client::check(response).await?;
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> StoreResult<()> {
        debug!("Deleting document {}...", path);
        let response = self
            .client
            .request(Method::DELETE, &path.to_string())
            .send()
            .await?;
        Client::check(response).await?;
        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        filters: &[Filter],
    ) -> StoreResult<Vec<Document>> {
        self.client.query(collection, filters).await
    }

    async fn subscribe_document(&self, path: &DocPath) -> StoreResult<DocumentSubscription> {
        let (sender, subscription) = Subscription::channel();
        let client = Arc::clone(&self.client);
        let path = path.clone();
        let task = tokio::spawn(async move {
            let mut last_seen = None;
            let mut interval = tokio::time::interval(client.poll_interval);
            loop {
                interval.tick().await;
                let sent = match client.get(&path).await {
                    Ok(doc) => {
                        let stamp = doc.as_ref().map(|d| d.update_time);
                        if last_seen != Some(stamp) {
                            last_seen = Some(stamp);
                            sender.send(Ok(doc))
                        } else {
                            Ok(())
                        }
                    }
                    Err(e) => {
                        warn!("Polling {} failed: {}", path, e);
                        sender.send(Err(e))
                    }
                };
                if sent.is_err() {
                    break;
                }
            }
        });
        Ok(subscription.with_task(task))
    }

    async fn subscribe_query(
        &self,
        collection: &CollectionPath,
        filters: &[Filter],
    ) -> StoreResult<QuerySubscription> {
        let (sender, subscription) = Subscription::channel();
        let client = Arc::clone(&self.client);
        let collection = collection.clone();
        let filters = filters.to_vec();
        let task = tokio::spawn(async move {
            let mut last_seen: Option<Vec<(String, Option<DateTime<Utc>>)>> = None;
            let mut interval = tokio::time::interval(client.poll_interval);
            loop {
                interval.tick().await;
                let sent = match client.query(&collection, &filters).await {
                    Ok(docs) => {
                        let mut stamps: Vec<_> = docs
                            .iter()
                            .map(|d| (d.id.clone(), d.update_time))
                            .collect();
                        stamps.sort();
                        if last_seen.as_ref() != Some(&stamps) {
                            last_seen = Some(stamps);
                            sender.send(Ok(docs))
                        } else {
                            Ok(())
                        }
                    }
                    Err(e) => {
                        warn!("Polling {} failed: {}", collection, e);
                        sender.send(Err(e))
                    }
                };
                if sent.is_err() {
                    break;
                }
            }
        });
        Ok(subscription.with_task(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;

    fn store(server: &MockServer) -> FirestoreStore {
        FirestoreStore::new(&server.url("/docs"), None, Duration::from_millis(10))
    }

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn doc_json(path: &str, title: &str, update_time: &str) -> Value {
        json!({
            "name": format!("projects/p/databases/(default)/documents/{}", path),
            "fields": { "title": { "stringValue": title } },
            "createTime": "2024-05-01T10:00:00Z",
            "updateTime": update_time,
        })
    }

    #[test]
    fn base_url_targets_default_database() {
        assert_eq!(
            FirestoreStore::base_url_for("syncho"),
            "https://firestore.googleapis.com/v1/projects/syncho/databases/(default)/documents"
        );
    }

    #[test]
    fn field_paths_quote_non_identifiers() {
        assert_eq!(field_path("columnOrder"), "columnOrder");
        assert_eq!(field_path("task-1"), "`task-1`");
        assert_eq!(field_path("1st"), "`1st`");
    }

    #[tokio::test]
    async fn get_decodes_document() -> StoreResult<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("GET").path("/docs/storages/team/items/b1");
                then.status(200)
                    .json_body(doc_json("storages/team/items/b1", "Sprint", "2024-05-02T10:00:00Z"));
            })
            .await;

        let doc = store(&server).get(&DocPath::item("team", "b1")).await?.unwrap();
        mock.assert_async().await;
        assert_eq!(doc.id, "b1");
        assert_eq!(doc.fields["title"], json!("Sprint"));
        assert!(doc.update_time.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn get_missing_document_is_none() -> StoreResult<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/docs/storages/ghost");
                then.status(404);
            })
            .await;
        assert!(store(&server).get(&DocPath::workspace("ghost")).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn ids_are_percent_encoded_in_paths() -> StoreResult<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("PATCH")
                    .path("/docs/storages/a%3Fb%20c%23d/items/b1")
                    .query_param("currentDocument.exists", "true");
                then.status(200)
                    .json_body(doc_json("storages/a?b c#d/items/b1", "Sprint", "2024-05-02T10:00:00Z"));
            })
            .await;

        store(&server)
            .update(&DocPath::item("a?b c#d", "b1"), fields(json!({ "title": "x" })))
            .await?;
        mock.assert_async().await;
        Ok(())
    }

    #[test]
    fn percent_sign_is_escaped() {
        let client = Client {
            http_client: reqwest::Client::new(),
            base_url: "http://localhost/docs".to_string(),
            api_key: None,
            poll_interval: Duration::from_millis(10),
        };
        assert_eq!(
            client.url(&DocPath::workspace("50%").to_string()),
            "http://localhost/docs/storages/50%25"
        );
        assert_eq!(
            client.url(":runQuery"),
            "http://localhost/docs:runQuery"
        );
    }

    #[tokio::test]
    async fn create_if_absent_treats_conflict_as_existing() -> StoreResult<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/docs/storages")
                    .query_param("documentId", "team")
                    .json_body_partial(r#"{ "fields": { "name": { "stringValue": "team" } } }"#);
                then.status(409);
            })
            .await;

        let created = store(&server)
            .create_if_absent(&DocPath::workspace("team"), fields(json!({ "name": "team" })))
            .await?;
        mock.assert_async().await;
        assert!(!created);
        Ok(())
    }

    #[tokio::test]
    async fn add_returns_generated_id() -> StoreResult<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST").path("/docs/storages/team/items");
                then.status(200)
                    .json_body(doc_json("storages/team/items/Xy12", "Untitled note", "2024-05-02T10:00:00Z"));
            })
            .await;
        let id = store(&server)
            .add(&CollectionPath::items("team"), fields(json!({ "type": "note" })))
            .await?;
        assert_eq!(id, "Xy12");
        Ok(())
    }

    #[tokio::test]
    async fn update_sends_field_mask_and_existence_precondition() -> StoreResult<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("PATCH")
                    .path("/docs/storages/team/items/b1")
                    .query_param("updateMask.fieldPaths", "columnOrder")
                    .query_param("currentDocument.exists", "true")
                    .body_contains("arrayValue");
                then.status(200)
                    .json_body(doc_json("storages/team/items/b1", "Sprint", "2024-05-02T10:00:00Z"));
            })
            .await;

        store(&server)
            .update(
                &DocPath::item("team", "b1"),
                fields(json!({ "columnOrder": ["b", "a"] })),
            )
            .await?;
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("PATCH").path("/docs/storages/team/items/gone");
                then.status(404);
            })
            .await;
        let result = store(&server)
            .update(&DocPath::item("team", "gone"), fields(json!({ "title": "x" })))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn server_errors_are_retriable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("DELETE").path("/docs/storages/team/items/b1");
                then.status(503).body("backend unavailable");
            })
            .await;
        let error = store(&server)
            .delete(&DocPath::item("team", "b1"))
            .await
            .unwrap_err();
        assert!(error.is_retriable());
        assert!(error.to_string().contains("backend unavailable"));
    }

    #[tokio::test]
    async fn query_posts_equality_filter_to_parent() -> StoreResult<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/docs/storages/team:runQuery")
                    .json_body_partial(
                        r#"{ "structuredQuery": { "from": [{ "collectionId": "items" }],
                             "where": { "fieldFilter": { "field": { "fieldPath": "type" }, "op": "EQUAL",
                                        "value": { "stringValue": "kanban" } } } } }"#,
                    );
                then.status(200).json_body(json!([
                    { "document": doc_json("storages/team/items/b1", "One", "2024-05-02T10:00:00Z"), "readTime": "2024-05-02T10:00:01Z" },
                    { "readTime": "2024-05-02T10:00:01Z" }
                ]));
            })
            .await;

        let docs = store(&server)
            .query(&CollectionPath::items("team"), &[Filter::eq("type", "kanban")])
            .await?;
        mock.assert_async().await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "b1");
        Ok(())
    }

    #[tokio::test]
    async fn document_subscription_emits_only_on_change() -> StoreResult<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("GET").path("/docs/storages/team/items/b1");
                then.status(200)
                    .json_body(doc_json("storages/team/items/b1", "Sprint", "2024-05-02T10:00:00Z"));
            })
            .await;

        let mut subscription = store(&server)
            .subscribe_document(&DocPath::item("team", "b1"))
            .await?;
        let first = subscription.next().await.unwrap()?.unwrap();
        assert_eq!(first.fields["title"], json!("Sprint"));

        let quiet = tokio::time::timeout(Duration::from_millis(80), subscription.next()).await;
        assert!(quiet.is_err());
        assert!(mock.hits_async().await >= 2);
        Ok(())
    }
}
