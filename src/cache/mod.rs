//! Local cache tier: the string key-value seam plus a typed collection layer.

mod file;
mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

use std::sync::Arc;

use serde_json::Value;

use crate::collection::Collection;
use crate::error::{CacheError, SyncEngineError};

// ============================================================================
// LocalCache — string key-value seam
// ============================================================================

/// The persistent key-value store holding one serialized snapshot per
/// collection. Mirrors the storage surface the application already has
/// (`getItem`/`setItem`/`removeItem` over string keys).
pub trait LocalCache: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove_item(&self, key: &str) -> Result<(), CacheError>;
}

// ============================================================================
// CollectionCache — typed layer
// ============================================================================

/// Reads and writes whole collections as JSON arrays on top of a
/// [`LocalCache`].
///
/// Reads never fail: a missing key yields an empty collection, an unparseable
/// blob yields an empty collection and logs a parse error, and a non-object
/// element is skipped without failing the rest of the collection.
pub struct CollectionCache {
    store: Arc<dyn LocalCache>,
}

impl CollectionCache {
    pub fn new(store: Arc<dyn LocalCache>) -> Self {
        Self { store }
    }

    /// The serialized snapshot for `collection`, parsed.
    pub fn read(&self, collection: Collection) -> Vec<Value> {
        let key = collection.cache_key();
        let blob = match self.store.get_item(key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!(collection = %collection, error = %e, "cache read failed");
                return Vec::new();
            }
        };

        let parsed: Value = match serde_json::from_str(&blob) {
            Ok(v) => v,
            Err(e) => {
                let err = SyncEngineError::Parse {
                    collection: collection.table().to_string(),
                    message: e.to_string(),
                };
                tracing::error!(collection = %collection, "{err}");
                return Vec::new();
            }
        };

        let Value::Array(items) = parsed else {
            let err = SyncEngineError::Parse {
                collection: collection.table().to_string(),
                message: "cached blob is not an array".to_string(),
            };
            tracing::error!(collection = %collection, "{err}");
            return Vec::new();
        };

        let total = items.len();
        let records: Vec<Value> = items.into_iter().filter(Value::is_object).collect();
        if records.len() < total {
            tracing::warn!(
                collection = %collection,
                skipped = total - records.len(),
                "skipped malformed cached records"
            );
        }
        records
    }

    /// Overwrite the snapshot for `collection`.
    pub fn write(&self, collection: Collection, records: &[Value]) -> Result<(), CacheError> {
        let key = collection.cache_key();
        let blob = serde_json::to_string(records).map_err(|source| CacheError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.store.set_item(key, &blob)
    }

    /// Remove the snapshot for `collection`. The engine never calls this
    /// implicitly — deletion is always an explicit caller action.
    pub fn clear(&self, collection: Collection) -> Result<(), CacheError> {
        self.store.remove_item(collection.cache_key())
    }

    /// Number of cached records without exposing them.
    pub fn count(&self, collection: Collection) -> usize {
        self.read(collection).len()
    }
}
