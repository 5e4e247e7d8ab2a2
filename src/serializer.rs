//! Serializer - Converts records to and from their stored string form.

use serde_json::Value;

use crate::error::StoreError;
use crate::record::Record;

/// Pure conversion between a record and its stored string form.
///
/// Stateless and pluggable: a store takes a custom serializer through its
/// builder, defaulting to [`JsonSerializer`].
pub trait Serializer<R>: Send + Sync {
    /// Encode a record into its stored form.
    fn serialize(&self, record: &R) -> Result<String, StoreError>;

    /// Decode a stored value.
    ///
    /// Absent or empty input yields `Ok(None)`, distinct from a decoding
    /// failure on data that is actually present.
    fn deserialize(&self, data: Option<&str>) -> Result<Option<R>, StoreError>;
}

/// Default serializer: records are encoded as JSON text.
///
/// A record whose serde representation is a plain string passes through as the
/// raw string rather than a quoted JSON document; deserialization accepts both
/// forms, so the round trip holds for primitive records too.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl<R: Record> Serializer<R> for JsonSerializer {
    fn serialize(&self, record: &R) -> Result<String, StoreError> {
        let value = serde_json::to_value(record).map_err(|e| StoreError::Serde(e.to_string()))?;
        match value {
            Value::String(text) => Ok(text),
            other => serde_json::to_string(&other).map_err(|e| StoreError::Serde(e.to_string())),
        }
    }

    fn deserialize(&self, data: Option<&str>) -> Result<Option<R>, StoreError> {
        let text = match data {
            None | Some("") => return Ok(None),
            Some(text) => text,
        };

        match serde_json::from_str(text) {
            Ok(record) => Ok(Some(record)),
            // Not a JSON document: treat the raw text as a pass-through string.
            Err(parse_err) => serde_json::from_value(Value::String(text.to_string()))
                .map(Some)
                .map_err(|_| StoreError::Serde(parse_err.to_string())),
        }
    }
}
