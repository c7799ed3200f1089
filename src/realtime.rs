//! Realtime change notifications for watched collections.
//!
//! [`RealtimeListener`] keeps one logical subscription per watched
//! collection for the lifetime of the application; callers never
//! unsubscribe the feed itself. A feed that cannot be established is
//! logged and skipped — the rest of the application keeps running and
//! already-registered callbacks simply stay silent.
//!
//! The shipped [`PollingFeed`] watches an `updated_at` watermark plus the
//! row count; a push-based transport can implement [`ChangeFeed`] instead
//! without touching the listener.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::collection::Collection;
use crate::error::RemoteError;
use crate::events::{EventEmitter, SubscriptionId};
use crate::remote::{RemoteStore, SelectQuery};
use crate::types::{ChangeKind, ChangeNotice};

// ============================================================================
// ChangeFeed — transport seam
// ============================================================================

/// Source of remote change notifications for one collection. `open` fails
/// only at establishment; a live channel reports transient trouble by
/// simply going quiet.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn open(
        &self,
        collection: Collection,
    ) -> Result<mpsc::Receiver<ChangeNotice>, RemoteError>;
}

// ============================================================================
// RealtimeListener
// ============================================================================

pub struct RealtimeListener {
    feed: Arc<dyn ChangeFeed>,
    emitters: Mutex<HashMap<Collection, Arc<EventEmitter<ChangeNotice>>>>,
}

impl RealtimeListener {
    pub fn new(feed: Arc<dyn ChangeFeed>) -> Self {
        Self {
            feed,
            emitters: Mutex::new(HashMap::new()),
        }
    }

    /// Watch `collection`, invoking `on_change` for every insert/update/
    /// delete notification. The first subscriber for a collection opens the
    /// underlying feed; later subscribers share it. Establishment failure
    /// is logged, never raised.
    pub async fn subscribe(
        &self,
        collection: Collection,
        on_change: impl Fn(&ChangeNotice) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let (emitter, first) = {
            let mut emitters = self.emitters.lock();
            let first = !emitters.contains_key(&collection);
            let emitter = emitters
                .entry(collection)
                .or_insert_with(|| Arc::new(EventEmitter::new()))
                .clone();
            (emitter, first)
        };

        let id = emitter.subscribe(on_change);

        if first {
            match self.feed.open(collection).await {
                Ok(mut rx) => {
                    let emitter = emitter.clone();
                    tokio::spawn(async move {
                        while let Some(notice) = rx.recv().await {
                            emitter.emit(&notice);
                        }
                        tracing::debug!(collection = %collection, "change feed closed");
                    });
                }
                Err(e) => {
                    tracing::error!(
                        collection = %collection,
                        error = %e,
                        "could not establish realtime subscription; continuing without"
                    );
                }
            }
        }

        id
    }

    /// Number of callbacks registered for `collection`.
    pub fn subscriber_count(&self, collection: Collection) -> usize {
        self.emitters
            .lock()
            .get(&collection)
            .map(|e| e.len())
            .unwrap_or(0)
    }
}

// ============================================================================
// PollingFeed
// ============================================================================

/// Change feed that polls the remote store on an interval, reporting rows
/// whose `updated_at` moved past a watermark and count changes as deletes.
/// Insert vs. update classification is by count growth, which is coarse but
/// sufficient for "signal callers to re-fetch".
pub struct PollingFeed {
    remote: Arc<dyn RemoteStore>,
    interval: Duration,
}

impl PollingFeed {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            interval: Duration::from_secs(5),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

#[async_trait]
impl ChangeFeed for PollingFeed {
    async fn open(
        &self,
        collection: Collection,
    ) -> Result<mpsc::Receiver<ChangeNotice>, RemoteError> {
        // Fail establishment eagerly if the remote is unusable right now.
        let mut last_count = self.remote.count(collection).await?;

        let (tx, rx) = mpsc::channel(32);
        let remote = self.remote.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            let mut watermark = Utc::now();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await; // the first tick completes immediately

            loop {
                ticker.tick().await;

                let query = SelectQuery::filtered(
                    "updated_at",
                    format!("gt.{}", watermark.to_rfc3339()),
                );
                let rows = match remote.select(collection, query).await {
                    Ok(rows) => rows,
                    Err(e) => {
                        // Transient; keep the feed alive and try next tick.
                        tracing::debug!(collection = %collection, error = %e, "realtime poll failed");
                        continue;
                    }
                };

                let count = remote.count(collection).await.ok();
                if !rows.is_empty() {
                    watermark = Utc::now();
                }

                let kind = match count {
                    Some(n) if n > last_count => ChangeKind::Insert,
                    _ => ChangeKind::Update,
                };
                for row in &rows {
                    let notice = ChangeNotice {
                        collection,
                        kind,
                        record_id: row.get("id").and_then(|v| v.as_str()).map(str::to_owned),
                    };
                    if tx.send(notice).await.is_err() {
                        return; // receiver dropped
                    }
                }

                if let Some(n) = count {
                    if n < last_count
                        && tx
                            .send(ChangeNotice {
                                collection,
                                kind: ChangeKind::Delete,
                                record_id: None,
                            })
                            .await
                            .is_err()
                    {
                        return;
                    }
                    last_count = n;
                }
            }
        });

        Ok(rx)
    }
}
