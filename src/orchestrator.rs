//! Multi-collection synchronization orchestration.
//!
//! Owns the per-collection status machine outright: nothing else in the
//! crate writes sync status, and callers read it only through the getters
//! here. Push and pull for the same collection are serialized by a
//! per-collection lock, so two racing triggers cannot interleave their
//! cache writes.
//!
//! Public operations never return `Err` — failures come back inside
//! [`SyncOutcome`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Mutex as TokioMutex;

use crate::cache::LocalCache;
use crate::collection::Collection;
use crate::error::Result;
use crate::events::{EventEmitter, SubscriptionId};
use crate::fallback::FallbackResolver;
use crate::remote::RemoteStore;
use crate::types::{
    CacheUpdated, CollectionStatus, DataCounts, SyncDirection, SyncOutcome, SyncState,
};

pub struct SyncOrchestrator {
    resolver: FallbackResolver,
    remote: Option<Arc<dyn RemoteStore>>,
    status: Mutex<HashMap<Collection, CollectionStatus>>,
    /// Per-collection single-flight guards for push/pull.
    locks: Mutex<HashMap<Collection, Arc<TokioMutex<()>>>>,
    cache_events: EventEmitter<CacheUpdated>,
}

impl SyncOrchestrator {
    pub fn new(cache: Arc<dyn LocalCache>, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self::with_batch_size(cache, remote, crate::batch::DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(
        cache: Arc<dyn LocalCache>,
        remote: Option<Arc<dyn RemoteStore>>,
        batch_size: usize,
    ) -> Self {
        Self {
            resolver: FallbackResolver::new(cache, remote.clone(), batch_size),
            remote,
            status: Mutex::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
            cache_events: EventEmitter::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Public operations
    // -----------------------------------------------------------------------

    /// Push a collection's cached records to the remote store.
    pub async fn push(&self, collection: Collection) -> SyncOutcome {
        self.with_lock(collection, self.push_impl(collection)).await
    }

    /// Pull a collection from the remote store into the local cache.
    pub async fn pull(&self, collection: Collection) -> SyncOutcome {
        self.with_lock(collection, self.pull_impl(collection)).await
    }

    /// Run `direction` over every enumerated collection, sequentially.
    /// Individual failures never stop the remaining collections.
    pub async fn sync_all(&self, direction: SyncDirection) -> HashMap<Collection, SyncOutcome> {
        let mut results = HashMap::new();
        for collection in Collection::ALL {
            let outcome = match direction {
                SyncDirection::Push => self.push(collection).await,
                SyncDirection::Pull => self.pull(collection).await,
            };
            results.insert(collection, outcome);
        }
        results
    }

    /// Probe the remote path.
    pub async fn check_connection(&self) -> bool {
        self.resolver.remote_available().await
    }

    /// Per-collection `{local, remote}` record counts. Mutates neither
    /// store; `remote` is `None` in degraded mode or on a failed count.
    pub async fn data_counts(&self) -> HashMap<Collection, DataCounts> {
        let reachable = self.resolver.remote_available().await;
        let mut counts = HashMap::new();
        for collection in Collection::ALL {
            let local = self.resolver.cache().count(collection);
            let remote = if reachable {
                match self.remote.as_ref() {
                    Some(remote) => match remote.count(collection).await {
                        Ok(n) => Some(n),
                        Err(e) => {
                            tracing::debug!(collection = %collection, error = %e, "remote count failed");
                            None
                        }
                    },
                    None => None,
                }
            } else {
                None
            };
            counts.insert(collection, DataCounts { local, remote });
        }
        counts
    }

    /// Explicitly delete a collection's local snapshot. The engine never
    /// does this implicitly.
    pub fn clear_local(&self, collection: Collection) -> Result<()> {
        self.resolver.cache().clear(collection)?;
        Ok(())
    }

    /// The fallback resolver, for callers doing ordinary reads/writes
    /// outside a sync cycle.
    pub fn resolver(&self) -> &FallbackResolver {
        &self.resolver
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    pub fn status(&self, collection: Collection) -> CollectionStatus {
        self.status
            .lock()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn status_all(&self) -> HashMap<Collection, CollectionStatus> {
        let guard = self.status.lock();
        Collection::ALL
            .into_iter()
            .map(|c| (c, guard.get(&c).cloned().unwrap_or_default()))
            .collect()
    }

    /// Subscribe to cache-updated notifications emitted after a pull
    /// overwrites a collection's snapshot.
    pub fn on_cache_updated(
        &self,
        callback: impl Fn(&CacheUpdated) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.cache_events.subscribe(callback)
    }

    pub fn unsubscribe_cache_updated(&self, id: SubscriptionId) {
        self.cache_events.unsubscribe(id);
    }

    // -----------------------------------------------------------------------
    // Push
    // -----------------------------------------------------------------------

    async fn push_impl(&self, collection: Collection) -> SyncOutcome {
        let records = self.resolver.cache().read(collection);
        if records.is_empty() {
            // No-op with a warning, not a hard fault: the status machine is
            // left untouched and no Loading/Error transition happens.
            tracing::info!(collection = %collection, "push skipped: no local data");
            return SyncOutcome::failed("no local data", 0, false);
        }

        let local_count = records.len();
        self.begin(collection, SyncDirection::Push, local_count);

        match self.resolver.write(collection, &records).await {
            Ok(outcome) => match outcome.report {
                Some(report) => {
                    if report.error.is_some() {
                        let error =
                            crate::batch::partial_batch_error(collection, &report).to_string();
                        self.finish_err(collection, &error, local_count, Some(report.committed));
                        SyncOutcome {
                            success: false,
                            local_count,
                            remote_count: Some(report.committed),
                            error: Some(error),
                            used_remote: true,
                        }
                    } else {
                        self.finish_ok(collection, local_count, Some(report.committed));
                        SyncOutcome::ok(local_count, Some(report.committed), true)
                    }
                }
                // Degraded write: the cache already holds the records, so
                // the call still reports success.
                None => {
                    self.finish_ok(collection, local_count, None);
                    SyncOutcome::ok(local_count, None, false)
                }
            },
            Err(e) => {
                let message = e.to_string();
                self.finish_err(collection, &message, local_count, None);
                SyncOutcome::failed(message, local_count, false)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pull
    // -----------------------------------------------------------------------

    async fn pull_impl(&self, collection: Collection) -> SyncOutcome {
        let existing = self.resolver.cache().count(collection);
        self.begin(collection, SyncDirection::Pull, existing);

        let resolved = self.resolver.read(collection).await;

        if !resolved.used_remote {
            // Degraded: the local snapshot is the answer.
            let local_count = resolved.value.len();
            self.finish_ok(collection, local_count, None);
            return SyncOutcome::ok(local_count, None, false);
        }

        let remote_count = resolved.value.len();
        if remote_count == 0 {
            // Zero remote rows never erase a non-empty local cache.
            self.finish_ok(collection, existing, Some(0));
            return SyncOutcome::ok(existing, Some(0), true);
        }

        // The resolver already wrote the transcoded records through.
        self.cache_events.emit(&CacheUpdated {
            collection,
            count: remote_count,
        });
        self.finish_ok(collection, remote_count, Some(remote_count));
        SyncOutcome::ok(remote_count, Some(remote_count), true)
    }

    // -----------------------------------------------------------------------
    // Locking
    // -----------------------------------------------------------------------

    async fn with_lock<F: std::future::Future<Output = SyncOutcome>>(
        &self,
        collection: Collection,
        f: F,
    ) -> SyncOutcome {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(collection)
                .or_insert_with(|| Arc::new(TokioMutex::new(())))
                .clone()
        };
        let _guard = lock.lock().await;
        f.await
    }

    // -----------------------------------------------------------------------
    // Status transitions
    // -----------------------------------------------------------------------

    fn begin(&self, collection: Collection, operation: SyncDirection, local_count: usize) {
        let mut status = self.status.lock();
        let entry = status.entry(collection).or_default();
        entry.state = SyncState::Loading;
        entry.operation = Some(operation);
        entry.local_count = local_count;
        entry.last_error = None;
    }

    fn finish_ok(&self, collection: Collection, local_count: usize, remote_count: Option<usize>) {
        let mut status = self.status.lock();
        let entry = status.entry(collection).or_default();
        entry.state = SyncState::Success;
        entry.last_sync = Some(Utc::now());
        entry.last_error = None;
        entry.local_count = local_count;
        entry.remote_count = remote_count;
    }

    fn finish_err(
        &self,
        collection: Collection,
        error: &str,
        local_count: usize,
        remote_count: Option<usize>,
    ) {
        let mut status = self.status.lock();
        let entry = status.entry(collection).or_default();
        entry.state = SyncState::Error;
        entry.last_error = Some(error.to_string());
        entry.local_count = local_count;
        entry.remote_count = remote_count;
    }
}
