use std::fmt;

use crate::backend::BackendError;

/// Error type for store and dispatcher operations.
///
/// Every variant is reportable to the caller; nothing here is fatal to the
/// process. The dispatcher turns each of these into its error-delivery path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The operation completed without an exception but found no data.
    NotFound,
    /// The operation requires a record identifier and none was present.
    MissingId,
    /// The backend rejected a write with a quota/availability signal.
    Quota,
    /// Quota failure against an empty store: the backend is non-functional
    /// (e.g., a restricted browsing mode).
    EnvironmentUnsupported,
    /// Any other error surfaced by the backend, message forwarded as-is.
    Backend(String),
    /// A value failed to encode or decode.
    Serde(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Record Not Found"),
            StoreError::MissingId => write!(f, "record has no identifier"),
            StoreError::Quota => write!(f, "storage quota exceeded"),
            StoreError::EnvironmentUnsupported => {
                write!(f, "Private browsing is unsupported")
            }
            StoreError::Backend(msg) => write!(f, "{}", msg),
            StoreError::Serde(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::QuotaExceeded => StoreError::Quota,
            BackendError::Other(msg) => StoreError::Backend(msg),
        }
    }
}
