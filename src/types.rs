//! Shared result and status types for the sync engine.
//!
//! Public operations never return `Err` — outcomes are structured values
//! carrying success, counts, the failure message if any, and which path
//! (remote or local) actually served the call.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::collection::Collection;

// ============================================================================
// Direction & State
// ============================================================================

/// Which way a sync operation moves data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    /// Local cache → remote store.
    Push,
    /// Remote store → local cache.
    Pull,
}

/// Per-collection status machine. `Success`/`Error` transition back to
/// `Loading` only on the next explicit trigger — no auto-retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

// ============================================================================
// Collection status
// ============================================================================

/// Last-sync bookkeeping for one collection. Owned exclusively by the
/// orchestrator; mutated only by push/pull completions.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStatus {
    pub state: SyncState,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub local_count: usize,
    pub remote_count: Option<usize>,
    pub operation: Option<SyncDirection>,
}

// ============================================================================
// Operation outcomes
// ============================================================================

/// Uniform result of a push or pull. Always returned, never thrown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub success: bool,
    pub local_count: usize,
    pub remote_count: Option<usize>,
    pub error: Option<String>,
    /// Which path served the call — `false` means degraded (local-only).
    pub used_remote: bool,
}

impl SyncOutcome {
    pub fn ok(local_count: usize, remote_count: Option<usize>, used_remote: bool) -> Self {
        Self {
            success: true,
            local_count,
            remote_count,
            error: None,
            used_remote,
        }
    }

    pub fn failed(error: impl Into<String>, local_count: usize, used_remote: bool) -> Self {
        Self {
            success: false,
            local_count,
            remote_count: None,
            error: Some(error.into()),
            used_remote,
        }
    }
}

/// A value plus the path that produced it.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub used_remote: bool,
}

impl<T> Resolved<T> {
    pub fn remote(value: T) -> Self {
        Self {
            value,
            used_remote: true,
        }
    }

    pub fn local(value: T) -> Self {
        Self {
            value,
            used_remote: false,
        }
    }
}

/// Result of a fallback-resolved write: local always, remote when reachable.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub used_remote: bool,
    /// Present only when the remote path was taken.
    pub report: Option<BatchReport>,
}

// ============================================================================
// Batch reporting
// ============================================================================

/// What a batched upsert actually committed. `error` is set when a chunk
/// failed; `committed` then counts only records from chunks before it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub committed: usize,
    pub total: usize,
    pub batches_sent: usize,
    pub error: Option<String>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.committed == self.total
    }
}

// ============================================================================
// Counts
// ============================================================================

/// Non-mutating per-collection store sizes. `remote` is `None` in degraded
/// mode or when the count query itself failed.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCounts {
    pub local: usize,
    pub remote: Option<usize>,
}

// ============================================================================
// Change notifications
// ============================================================================

/// Kind of remote mutation reported by a change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A remote change notification. Signals callers to re-fetch — it carries
/// no record payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotice {
    pub collection: Collection,
    pub kind: ChangeKind,
    pub record_id: Option<String>,
}

/// Emitted after a pull overwrites a collection's local cache.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheUpdated {
    pub collection: Collection,
    pub count: usize,
}
