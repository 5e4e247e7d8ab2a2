//! RecordIndex - The ordered set of record ids belonging to one collection.

use crate::backend::{Backend, BackendError};

/// Ordered set of record ids for a named collection, persisted as a single
/// comma-joined backend entry at the collection's own name.
///
/// Ids are unique and keep insertion order: appended on create, never
/// reordered on update. Every structural change is followed by a
/// [`persist`](RecordIndex::persist) before the owning store returns.
#[derive(Debug)]
pub struct RecordIndex {
    key: String,
    ids: Vec<String>,
}

impl RecordIndex {
    /// Hydrate the index from its backend entry. An absent or empty entry
    /// hydrates to an empty index.
    pub async fn load(backend: &dyn Backend, key: &str) -> Result<Self, BackendError> {
        let ids = match backend.get(key).await? {
            Some(joined) if !joined.is_empty() => {
                joined.split(',').map(str::to_string).collect()
            }
            _ => Vec::new(),
        };
        tracing::debug!(key, count = ids.len(), "record index hydrated");
        Ok(Self {
            key: key.to_string(),
            ids,
        })
    }

    /// Write the index back to the backend as one comma-joined entry.
    pub async fn persist(&self, backend: &dyn Backend) -> Result<(), BackendError> {
        backend.set(&self.key, &self.ids.join(",")).await
    }

    /// Linear membership test.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Append an id, refusing duplicates. Returns whether the id was newly
    /// added, so callers persist only on actual growth.
    pub fn append(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Remove every occurrence of an id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop all ids from the in-memory index. The caller is responsible for
    /// removing the backend entry.
    pub fn reset(&mut self) {
        self.ids.clear();
    }
}
