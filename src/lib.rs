mod backend;
mod error;
mod guid;
mod index;
mod record;
mod serializer;
mod store;
mod sync;

pub use backend::{Backend, BackendError, InMemoryBackend};
pub use error::StoreError;
pub use guid::guid;
pub use index::RecordIndex;
pub use record::Record;
pub use serializer::{JsonSerializer, Serializer};
pub use store::{Store, StoreBuilder};
pub use sync::{SyncMethod, SyncOptions, SyncValue};
