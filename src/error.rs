use thiserror::Error;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Failures in the local cache tier.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O failed for key \"{key}\": {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache serialization failed for key \"{key}\": {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// RemoteError
// ---------------------------------------------------------------------------

/// Failures in the remote store tier.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote store is not configured")]
    NotConfigured,

    #[error("Remote store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response from remote store: {0}")]
    Decode(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl RemoteError {
    /// Whether the remote rejected the request because of its shape rather
    /// than because the remote was unreachable. Drives the schema-mismatch
    /// classification in the batch engine.
    pub fn is_rejection(&self) -> bool {
        matches!(self, RemoteError::Status { status, .. } if (400..=422).contains(status) && *status != 401 && *status != 403)
    }
}

// ---------------------------------------------------------------------------
// PartialBatchError
// ---------------------------------------------------------------------------

/// A batched write that committed some chunks before one failed. Remaining
/// chunks were never sent.
#[derive(Debug, Error)]
#[error(
    "Batch write to \"{collection}\" aborted after {committed}/{total} records \
     ({batches_sent} batch(es) sent): {message}"
)]
pub struct PartialBatchError {
    pub collection: String,
    pub committed: usize,
    pub total: usize,
    pub batches_sent: usize,
    pub message: String,
}

// ---------------------------------------------------------------------------
// SyncEngineError — top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SyncEngineError {
    /// Probe or remote call failed. Triggers fallback at the resolver
    /// boundary; never propagated out of the orchestrator.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The cached blob for a collection is not valid serialized data.
    /// The collection is treated as empty and the failure is logged.
    #[error("Parse error for cached collection \"{collection}\": {message}")]
    Parse { collection: String, message: String },

    /// The remote rejected a transcoded record's shape.
    #[error("Schema mismatch for collection \"{collection}\": {message}")]
    SchemaMismatch { collection: String, message: String },

    #[error(transparent)]
    PartialBatch(#[from] PartialBatchError),

    /// The pre-write clear of a collection failed, so the whole write was
    /// aborted before any chunk was sent.
    #[error("Conflict resolution failed for collection \"{collection}\": pre-write clear failed: {message}")]
    ConflictResolution { collection: String, message: String },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias — the default error type is `SyncEngineError`.
pub type Result<T, E = SyncEngineError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
