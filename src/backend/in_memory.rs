//! InMemoryBackend - HashMap-backed key/value backend for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use async_trait::async_trait;

use super::{Backend, BackendError};

/// Process-wide persistent regions, keyed by region name.
///
/// A persistent region outlives any one backend handle, the way a durable
/// store outlives a session, so a reopened store rehydrates from prior data.
static REGIONS: OnceLock<Mutex<HashMap<String, Arc<RwLock<HashMap<String, String>>>>>> =
    OnceLock::new();

/// In-memory key/value backend backed by a HashMap.
///
/// Clone-friendly via Arc: clones share storage. [`new`](InMemoryBackend::new)
/// opens a fresh ephemeral (session) region; [`persistent`](InMemoryBackend::persistent)
/// opens a process-wide shared region by name.
#[derive(Clone)]
pub struct InMemoryBackend {
    storage: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Open a fresh ephemeral region, private to this handle and its clones.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            quota: None,
        }
    }

    /// Open (or create) a process-wide shared region by name.
    pub fn persistent(region: &str) -> Self {
        let regions = REGIONS.get_or_init(|| Mutex::new(HashMap::new()));
        let storage = {
            let mut regions = regions.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(
                regions
                    .entry(region.to_string())
                    .or_insert_with(|| Arc::new(RwLock::new(HashMap::new()))),
            )
        };
        Self {
            storage,
            quota: None,
        }
    }

    /// Fail writes of new keys with [`BackendError::QuotaExceeded`] once
    /// `limit` entries exist. A limit of zero never accepts a write, which
    /// simulates a restricted (private-browsing-like) environment.
    pub fn with_quota(mut self, limit: usize) -> Self {
        self.quota = Some(limit);
        self
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| BackendError::Other("lock poisoned".into()))?;
        Ok(storage.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| BackendError::Other("lock poisoned".into()))?;

        if let Some(limit) = self.quota {
            if !storage.contains_key(key) && storage.len() >= limit {
                return Err(BackendError::QuotaExceeded);
            }
        }

        storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| BackendError::Other("lock poisoned".into()))?;
        storage.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, BackendError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| BackendError::Other("lock poisoned".into()))?;
        Ok(storage.keys().cloned().collect())
    }

    async fn len(&self) -> Result<usize, BackendError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| BackendError::Other("lock poisoned".into()))?;
        Ok(storage.len())
    }
}
