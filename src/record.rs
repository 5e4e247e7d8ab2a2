use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be persisted as records.
///
/// This is the contract the modeling framework's instances satisfy: the store
/// reads the identifier through [`id`](Record::id) and writes a generated one
/// back through [`set_id`](Record::set_id). Everything else about the record
/// is opaque to the store and travels through the serializer.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The record's identifier, if it has one.
    ///
    /// Returning `None` or an empty string means "no identifier yet" and a
    /// fresh one will be assigned on create. `"0"` is a valid identifier.
    fn id(&self) -> Option<String>;

    /// Write a generated identifier onto the record.
    fn set_id(&mut self, id: String);
}

/// The record's identifier, with an empty string normalized to `None`.
pub(crate) fn record_id<R: Record>(record: &R) -> Option<String> {
    record.id().filter(|id| !id.is_empty())
}
