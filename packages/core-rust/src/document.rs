//! Generic record trait.
//!
//! The loader and transports are generic over record shape: the only thing
//! the core assumes about a record is a stable, unique `id`. Domain fields
//! (brand, price, release date, ...) are invisible to the machinery and only
//! interpreted by filter/sort evaluation on the raw JSON form.

use serde::de::DeserializeOwned;

/// An opaque document with a stable unique identifier.
pub trait Document: Clone + Send + Sync + DeserializeOwned + 'static {
    /// The record's unique, immutable identifier.
    fn id(&self) -> &str;
}

/// Untyped documents carry their id as a top-level `"id"` string field;
/// records without one report an empty id.
impl Document for serde_json::Value {
    fn id(&self) -> &str {
        self.get("id").and_then(serde_json::Value::as_str).unwrap_or_default()
    }
}
