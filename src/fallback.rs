//! Fallback resolution between the remote store and the local cache.
//!
//! Every read and write goes through here. The resolver consults the
//! connectivity probe per call; when the remote is unconfigured or the
//! probe fails, it degrades to the local cache and still reports a usable
//! result. Every result says which path actually served it.

use std::sync::Arc;

use serde_json::Value;

use crate::batch::BatchUpsertEngine;
use crate::cache::{CollectionCache, LocalCache};
use crate::collection::Collection;
use crate::error::Result;
use crate::remote::{ConnectivityProbe, RemoteStore, SelectQuery};
use crate::transcode::{strip_fields, to_local, to_remote};
use crate::types::{Resolved, WriteOutcome};

pub struct FallbackResolver {
    cache: CollectionCache,
    remote: Option<Arc<dyn RemoteStore>>,
    probe: ConnectivityProbe,
    batch_size: usize,
}

impl FallbackResolver {
    pub fn new(
        cache: Arc<dyn LocalCache>,
        remote: Option<Arc<dyn RemoteStore>>,
        batch_size: usize,
    ) -> Self {
        Self {
            cache: CollectionCache::new(cache),
            remote: remote.clone(),
            probe: ConnectivityProbe::new(remote),
            batch_size,
        }
    }

    pub fn cache(&self) -> &CollectionCache {
        &self.cache
    }

    /// Per-call reachability: configured and the probe read succeeded.
    pub async fn remote_available(&self) -> bool {
        self.probe.is_reachable().await
    }

    /// Read a collection, preferring the remote path.
    ///
    /// Remote path: select all rows, strip remote-only bookkeeping,
    /// transcode to local shape, write through to the cache, return. An
    /// empty remote result is returned as-is without touching the cache —
    /// pulling nothing must never erase a non-empty local snapshot. If the
    /// select fails after a passing probe, the call degrades to local like
    /// any other connectivity failure.
    pub async fn read(&self, collection: Collection) -> Resolved<Vec<Value>> {
        let Some(remote) = self.remote.clone() else {
            return Resolved::local(self.cache.read(collection));
        };
        if !self.probe.is_reachable().await {
            return Resolved::local(self.cache.read(collection));
        }

        let rows = match remote.select(collection, SelectQuery::default()).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "remote read failed; serving local");
                return Resolved::local(self.cache.read(collection));
            }
        };

        if rows.is_empty() {
            return Resolved::remote(Vec::new());
        }

        let records: Vec<Value> = rows
            .iter()
            .map(|row| to_local(&strip_fields(row, collection.remote_only_fields())))
            .collect();

        if let Err(e) = self.cache.write(collection, &records) {
            tracing::error!(collection = %collection, error = %e, "write-through to cache failed");
        }

        Resolved::remote(records)
    }

    /// Write a collection, in local shape.
    ///
    /// The local cache is always updated first. When the remote path is
    /// open, records are additionally stripped of local-only fields,
    /// transcoded to remote shape, and upserted in batches; the report lands
    /// in the outcome. In degraded mode the local write alone is success.
    pub async fn write(&self, collection: Collection, records: &[Value]) -> Result<WriteOutcome> {
        self.cache.write(collection, records)?;

        let Some(remote) = self.remote.clone() else {
            return Ok(WriteOutcome {
                used_remote: false,
                report: None,
            });
        };
        if !self.probe.is_reachable().await {
            tracing::info!(collection = %collection, "remote unreachable; cached write only");
            return Ok(WriteOutcome {
                used_remote: false,
                report: None,
            });
        }

        let outbound: Vec<Value> = records
            .iter()
            .map(|record| to_remote(&strip_fields(record, collection.local_only_fields())))
            .collect();

        let engine = BatchUpsertEngine::new(remote).with_batch_size(self.batch_size);
        let report = engine.upsert_all(collection, &outbound).await;

        Ok(WriteOutcome {
            used_remote: true,
            report: Some(report),
        })
    }
}
