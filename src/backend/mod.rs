//! Backend - The flat key/value storage this adapter persists into.

mod in_memory;

use std::fmt;

use async_trait::async_trait;

pub use in_memory::InMemoryBackend;

/// A flat, unordered key/value backend.
///
/// The store is the only writer for the keys it owns: one entry per collection
/// holding the id index, plus one entry per record. Used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read the value at `key`. Returns `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Write `value` at `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Remove the entry at `key`. Removing an absent key is a no-op.
    async fn delete(&self, key: &str) -> Result<(), BackendError>;

    /// All keys currently stored, in no particular order.
    async fn keys(&self) -> Result<Vec<String>, BackendError>;

    /// Number of entries currently stored.
    async fn len(&self) -> Result<usize, BackendError>;
}

/// Error type for backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend refused a write for lack of space or availability.
    QuotaExceeded,
    /// Any other backend failure.
    Other(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::QuotaExceeded => write!(f, "storage quota exceeded"),
            BackendError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BackendError {}
