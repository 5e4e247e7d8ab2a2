//! Store - CRUD over one collection's records and its id index.

use std::sync::Arc;

use crate::backend::{Backend, InMemoryBackend};
use crate::error::StoreError;
use crate::guid::guid;
use crate::index::RecordIndex;
use crate::record::{record_id, Record};
use crate::serializer::{JsonSerializer, Serializer};

/// A record store for one named collection over a key/value backend.
///
/// Owns the collection's [`RecordIndex`] and the key naming convention:
/// the index lives at the collection name, each record at `name + "-" + id`.
/// Construction goes through [`StoreBuilder`] and completes only after the
/// index has been hydrated from the backend, so no operation can observe a
/// partially loaded index.
///
/// One store is the exclusive owner of its collection name on a backend;
/// two stores sharing a name is unsupported (last index write wins).
pub struct Store<R> {
    name: String,
    backend: Arc<dyn Backend>,
    serializer: Box<dyn Serializer<R>>,
    index: RecordIndex,
}

impl<R: Record + 'static> Store<R> {
    /// Start building a store for the collection `name`.
    pub fn builder(name: impl Into<String>) -> StoreBuilder<R> {
        StoreBuilder::new(name)
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collection's id index, in insertion order.
    pub fn index(&self) -> &RecordIndex {
        &self.index
    }

    fn item_key(&self, id: &str) -> String {
        format!("{}-{}", self.name, id)
    }

    /// Add a record, assigning it a generated id if it doesn't already have
    /// one. Returns the record as read back from the backend.
    pub async fn create(&mut self, record: &mut R) -> Result<R, StoreError> {
        if record_id(record).is_none() {
            record.set_id(guid());
        }
        let id = record_id(record).ok_or(StoreError::MissingId)?;

        let text = self.serializer.serialize(record)?;
        self.backend.set(&self.item_key(&id), &text).await?;

        if self.index.append(&id) {
            self.index.persist(self.backend.as_ref()).await?;
        }

        self.find(record).await?.ok_or(StoreError::NotFound)
    }

    /// Overwrite a record's stored copy. The record must already carry an id.
    /// If the id fell out of the index (a record written behind the index's
    /// back), it is re-appended.
    pub async fn update(&mut self, record: &R) -> Result<R, StoreError> {
        let id = record_id(record).ok_or(StoreError::MissingId)?;

        let text = self.serializer.serialize(record)?;
        self.backend.set(&self.item_key(&id), &text).await?;

        if self.index.append(&id) {
            self.index.persist(self.backend.as_ref()).await?;
        }

        self.find(record).await?.ok_or(StoreError::NotFound)
    }

    /// Retrieve a record's stored copy by its id. Returns `None` when the
    /// backend has no entry for it.
    pub async fn find(&self, record: &R) -> Result<Option<R>, StoreError> {
        let id = record_id(record).ok_or(StoreError::MissingId)?;
        let stored = self.backend.get(&self.item_key(&id)).await?;
        self.serializer.deserialize(stored.as_deref())
    }

    /// All records currently in the collection, in index order.
    ///
    /// The index may be stale relative to the backend: ids whose entry is
    /// missing are skipped, and an entry that fails to decode is skipped
    /// rather than failing the whole batch.
    pub async fn find_all(&self) -> Result<Vec<R>, StoreError> {
        let mut records = Vec::with_capacity(self.index.len());

        for id in self.index.ids() {
            let stored = self.backend.get(&self.item_key(id)).await?;
            match self.serializer.deserialize(stored.as_deref()) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(collection = %self.name, id = %id, %err, "skipping undecodable record");
                }
            }
        }

        Ok(records)
    }

    /// Delete a record's stored copy and drop its id from the index.
    /// Returns the record as passed in, not re-read.
    pub async fn destroy(&mut self, record: &R) -> Result<R, StoreError> {
        let id = record_id(record).ok_or(StoreError::MissingId)?;

        self.backend.delete(&self.item_key(&id)).await?;
        self.index.remove(&id);
        self.index.persist(self.backend.as_ref()).await?;

        Ok(record.clone())
    }

    /// Remove the index entry and every record entry under this collection's
    /// key prefix, and reset the in-memory index. Teardown helper, not part
    /// of the normal CRUD flow.
    pub async fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.delete(&self.name).await?;

        let prefix = format!("{}-", self.name);
        for key in self.backend.keys().await? {
            if key.starts_with(&prefix) {
                self.backend.delete(&key).await?;
            }
        }

        self.index.reset();
        Ok(())
    }

    /// Number of entries currently held by the backend, across all
    /// collections sharing it.
    pub async fn storage_size(&self) -> Result<usize, StoreError> {
        Ok(self.backend.len().await?)
    }
}

/// Builder for a [`Store`]: collection name, session flag, and an optional
/// custom serializer.
pub struct StoreBuilder<R> {
    name: String,
    session: bool,
    serializer: Box<dyn Serializer<R>>,
}

impl<R: Record + 'static> StoreBuilder<R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            session: false,
            serializer: Box::new(JsonSerializer),
        }
    }

    /// Use an ephemeral backend region instead of a persistent one. Only
    /// consulted by [`build_in_memory`](StoreBuilder::build_in_memory); with
    /// an externally supplied backend the caller has already chosen.
    pub fn session(mut self, session: bool) -> Self {
        self.session = session;
        self
    }

    /// Replace the default JSON serializer.
    pub fn serializer(mut self, serializer: impl Serializer<R> + 'static) -> Self {
        self.serializer = Box::new(serializer);
        self
    }

    /// Open the store over the given backend. Resolves once the collection's
    /// index has been hydrated.
    pub async fn build(self, backend: Arc<dyn Backend>) -> Result<Store<R>, StoreError> {
        let index = RecordIndex::load(backend.as_ref(), &self.name).await?;
        Ok(Store {
            name: self.name,
            backend,
            serializer: self.serializer,
            index,
        })
    }

    /// Open the store over an in-memory backend: a fresh ephemeral region
    /// when the session flag is set, otherwise a process-wide persistent
    /// region named after the collection.
    pub async fn build_in_memory(self) -> Result<Store<R>, StoreError> {
        let backend: Arc<dyn Backend> = if self.session {
            Arc::new(InMemoryBackend::new())
        } else {
            Arc::new(InMemoryBackend::persistent(&self.name))
        };
        self.build(backend).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Todo {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: String,
    }

    impl Todo {
        fn new(content: &str) -> Self {
            Self {
                id: None,
                content: content.into(),
            }
        }
    }

    impl Record for Todo {
        fn id(&self) -> Option<String> {
            self.id.clone()
        }
        fn set_id(&mut self, id: String) {
            self.id = Some(id);
        }
    }

    async fn fresh_store(name: &str) -> (Store<Todo>, Arc<dyn Backend>) {
        let backend: Arc<dyn Backend> = Arc::new(InMemoryBackend::new());
        let store = Store::builder(name)
            .build(Arc::clone(&backend))
            .await
            .unwrap();
        (store, backend)
    }

    #[tokio::test]
    async fn create_assigns_an_id() {
        let (mut store, _backend) = fresh_store("todos").await;

        let mut todo = Todo::new("buy milk");
        let created = store.create(&mut todo).await.unwrap();

        let id = created.id.as_deref().unwrap();
        assert!(!id.is_empty());
        assert_eq!(todo.id.as_deref(), Some(id));
        assert_eq!(created.content, "buy milk");
    }

    #[tokio::test]
    async fn create_keeps_an_existing_id() {
        let (mut store, _backend) = fresh_store("todos").await;

        let mut todo = Todo::new("task");
        todo.id = Some("0".into());
        let created = store.create(&mut todo).await.unwrap();

        assert_eq!(created.id.as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn create_replaces_an_empty_string_id() {
        let (mut store, _backend) = fresh_store("todos").await;

        let mut todo = Todo::new("task");
        todo.id = Some(String::new());
        let created = store.create(&mut todo).await.unwrap();

        assert!(!created.id.unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_create_never_duplicates_the_index() {
        let (mut store, _backend) = fresh_store("todos").await;

        let mut todo = Todo::new("task");
        store.create(&mut todo).await.unwrap();
        store.create(&mut todo).await.unwrap();

        assert_eq!(store.index().len(), 1);
    }

    #[tokio::test]
    async fn update_twice_keeps_the_id_once() {
        let (mut store, _backend) = fresh_store("todos").await;

        let mut todo = Todo::new("task");
        store.create(&mut todo).await.unwrap();
        store.update(&todo).await.unwrap();
        store.update(&todo).await.unwrap();

        assert_eq!(store.index().len(), 1);
    }

    #[tokio::test]
    async fn update_requires_an_id() {
        let (mut store, _backend) = fresh_store("todos").await;

        let err = store.update(&Todo::new("task")).await.unwrap_err();
        assert_eq!(err, StoreError::MissingId);
    }

    #[tokio::test]
    async fn update_readopts_a_record_missing_from_the_index() {
        let (mut store, backend) = fresh_store("todos").await;

        // Record written behind the index's back.
        let mut todo = Todo::new("orphan");
        todo.id = Some("stray".into());
        backend
            .set("todos-stray", &serde_json::to_string(&todo).unwrap())
            .await
            .unwrap();
        assert!(!store.index().contains("stray"));

        store.update(&todo).await.unwrap();
        assert!(store.index().contains("stray"));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_all_preserves_index_order_and_skips_missing() {
        let (mut store, backend) = fresh_store("todos").await;

        let mut first = Todo::new("first");
        let mut second = Todo::new("second");
        let mut third = Todo::new("third");
        store.create(&mut first).await.unwrap();
        store.create(&mut second).await.unwrap();
        store.create(&mut third).await.unwrap();

        // Stale index: second's entry vanishes from the backend.
        backend
            .delete(&format!("todos-{}", second.id.as_deref().unwrap()))
            .await
            .unwrap();

        let all = store.find_all().await.unwrap();
        let contents: Vec<&str> = all.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["first", "third"]);
        assert_eq!(store.index().len(), 3);
    }

    #[tokio::test]
    async fn find_all_skips_undecodable_entries() {
        let (mut store, backend) = fresh_store("todos").await;

        let mut todo = Todo::new("good");
        store.create(&mut todo).await.unwrap();

        let mut bad = Todo::new("bad");
        store.create(&mut bad).await.unwrap();
        backend
            .set(&format!("todos-{}", bad.id.as_deref().unwrap()), "{corrupt")
            .await
            .unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].content, "good");
    }

    #[tokio::test]
    async fn destroy_removes_record_and_index_entry() {
        let (mut store, backend) = fresh_store("todos").await;

        let mut todo = Todo::new("doomed");
        let created = store.create(&mut todo).await.unwrap();
        let key = format!("todos-{}", created.id.as_deref().unwrap());

        let returned = store.destroy(&created).await.unwrap();
        assert_eq!(returned, created);

        assert!(backend.get(&key).await.unwrap().is_none());
        assert!(store.index().is_empty());
        assert!(store.find(&created).await.unwrap().is_none());
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_only_this_collections_keys() {
        let (mut store, backend) = fresh_store("todos").await;

        let mut todo = Todo::new("task");
        store.create(&mut todo).await.unwrap();
        backend.set("notes-1", "other collection").await.unwrap();

        store.clear().await.unwrap();

        assert!(backend.get("todos").await.unwrap().is_none());
        assert!(store.index().is_empty());
        assert_eq!(backend.len().await.unwrap(), 1);
        assert_eq!(
            backend.get("notes-1").await.unwrap().as_deref(),
            Some("other collection")
        );
    }

    #[tokio::test]
    async fn index_survives_reopen_on_the_same_backend() {
        let backend: Arc<dyn Backend> = Arc::new(InMemoryBackend::new());
        let mut store: Store<Todo> = Store::builder("todos")
            .build(Arc::clone(&backend))
            .await
            .unwrap();

        let mut todo = Todo::new("persisted");
        let created = store.create(&mut todo).await.unwrap();
        drop(store);

        let reopened: Store<Todo> = Store::builder("todos")
            .build(Arc::clone(&backend))
            .await
            .unwrap();
        assert!(reopened.index().contains(created.id.as_deref().unwrap()));
        assert_eq!(reopened.find_all().await.unwrap().len(), 1);
    }
}
