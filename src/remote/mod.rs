//! Remote store tier: the typed operation seam, its REST implementation,
//! environment configuration, and the connectivity probe.

mod config;
mod probe;
mod rest;

pub use config::{RemoteConfig, REMOTE_KEY_VAR, REMOTE_URL_VAR};
pub use probe::ConnectivityProbe;
pub use rest::RestRemoteStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::collection::Collection;
use crate::error::RemoteError;

// ============================================================================
// SelectQuery
// ============================================================================

/// Narrow query surface for `select`: an optional raw column filter (column
/// name plus an operator expression such as `eq.o-1` or `gt.2026-01-01`) and
/// an optional row limit.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub filter: Option<(String, String)>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn filtered(column: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            filter: Some((column.into(), expr.into())),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ============================================================================
// RemoteStore — typed operations against the hosted relational store
// ============================================================================

/// The operations the engine consumes per collection. Records cross this
/// boundary already in the remote (underscore-delimited) convention.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Full-row select, optionally filtered and bounded.
    async fn select(
        &self,
        collection: Collection,
        query: SelectQuery,
    ) -> Result<Vec<Value>, RemoteError>;

    /// Plain insert; duplicate identities are an error.
    async fn insert(&self, collection: Collection, records: &[Value]) -> Result<(), RemoteError>;

    /// Patch every row matching the filter.
    async fn update(
        &self,
        collection: Collection,
        patch: &Value,
        filter: (&str, &str),
    ) -> Result<(), RemoteError>;

    /// Delete every row in the collection.
    async fn delete_all(&self, collection: Collection) -> Result<(), RemoteError>;

    /// Insert-or-update keyed on `on_conflict`, always with update-on-conflict
    /// semantics (never ignore-duplicates).
    async fn upsert(
        &self,
        collection: Collection,
        records: &[Value],
        on_conflict: &str,
    ) -> Result<(), RemoteError>;

    /// Row count without fetching rows. Also serves as the cheapest read for
    /// the connectivity probe.
    async fn count(&self, collection: Collection) -> Result<usize, RemoteError>;
}
