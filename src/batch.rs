//! Batched upsert against the remote store.
//!
//! Records are split into consecutive bounded chunks and sent strictly in
//! order. The first chunk failure stops the remaining chunks; the report
//! then carries the count committed before the failing chunk and that
//! chunk's error. `replace_all` is the separately named clear-then-write
//! variant whose delete must succeed before any chunk is sent.

use std::sync::Arc;

use serde_json::Value;

use crate::collection::Collection;
use crate::error::{PartialBatchError, RemoteError, Result, SyncEngineError};
use crate::remote::RemoteStore;
use crate::types::BatchReport;

/// Allowed envelope for chunk sizes.
pub const MIN_BATCH_SIZE: usize = 20;
pub const MAX_BATCH_SIZE: usize = 50;
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Identity field used as the conflict-resolution key.
pub const CONFLICT_KEY: &str = "id";

pub struct BatchUpsertEngine {
    remote: Arc<dyn RemoteStore>,
    batch_size: usize,
    conflict_key: String,
}

impl BatchUpsertEngine {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            batch_size: DEFAULT_BATCH_SIZE,
            conflict_key: CONFLICT_KEY.to_string(),
        }
    }

    /// Set the chunk size, clamped to `20..=50`.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE);
        self
    }

    pub fn with_conflict_key(mut self, conflict_key: impl Into<String>) -> Self {
        self.conflict_key = conflict_key.into();
        self
    }

    /// Upsert `records` in ordered chunks. Never fails outright — the report
    /// says how far the write got.
    pub async fn upsert_all(&self, collection: Collection, records: &[Value]) -> BatchReport {
        let total = records.len();
        let mut committed = 0;
        let mut batches_sent = 0;

        for chunk in records.chunks(self.batch_size) {
            match self
                .remote
                .upsert(collection, chunk, &self.conflict_key)
                .await
            {
                Ok(()) => {
                    committed += chunk.len();
                    batches_sent += 1;
                }
                Err(e) => {
                    let error = classify(collection, e);
                    tracing::warn!(
                        collection = %collection,
                        committed,
                        total,
                        "batch upsert aborted: {error}"
                    );
                    return BatchReport {
                        committed,
                        total,
                        batches_sent,
                        error: Some(error.to_string()),
                    };
                }
            }
        }

        BatchReport {
            committed,
            total,
            batches_sent,
            error: None,
        }
    }

    /// Clear-then-write: local is authoritative. The delete-all must complete
    /// before the first chunk is sent; if it fails the entire write aborts
    /// with a conflict-resolution error and no chunk is issued.
    pub async fn replace_all(
        &self,
        collection: Collection,
        records: &[Value],
    ) -> Result<BatchReport> {
        if let Err(e) = self.remote.delete_all(collection).await {
            return Err(SyncEngineError::ConflictResolution {
                collection: collection.table().to_string(),
                message: e.to_string(),
            });
        }
        Ok(self.upsert_all(collection, records).await)
    }
}

/// Fold a failed chunk's remote error into the engine taxonomy: shape
/// rejections are schema mismatches, anything else is a partial-batch
/// connectivity failure.
fn classify(collection: Collection, error: RemoteError) -> SyncEngineError {
    if error.is_rejection() {
        SyncEngineError::SchemaMismatch {
            collection: collection.table().to_string(),
            message: error.to_string(),
        }
    } else {
        SyncEngineError::Connectivity(error.to_string())
    }
}

/// Build the structured partial-failure error for a report that stopped
/// early. Callers that need an error value (rather than a report) use this.
pub fn partial_batch_error(collection: Collection, report: &BatchReport) -> PartialBatchError {
    PartialBatchError {
        collection: collection.table().to_string(),
        committed: report.committed,
        total: report.total,
        batches_sent: report.batches_sent,
        message: report.error.clone().unwrap_or_default(),
    }
}
