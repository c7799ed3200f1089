//! Shared mocks for the integration suite: a programmable in-memory
//! remote store recording every call it receives.
#![allow(dead_code)] // not every test target uses every helper

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use storesync::collection::Collection;
use storesync::error::RemoteError;
use storesync::remote::{RemoteStore, SelectQuery};

#[derive(Default)]
pub struct MockRemoteInner {
    /// Rows per collection, kept in remote (snake_case) shape.
    pub rows: HashMap<Collection, Vec<Value>>,
    /// Chunk sizes of every upsert call, in order.
    pub upsert_chunks: Vec<(Collection, usize)>,
    /// Full payload of every upsert call, for shape assertions.
    pub upsert_payloads: Vec<Vec<Value>>,
    /// 1-based upsert call index that should fail with HTTP 500.
    pub fail_upsert_at: Option<usize>,
    /// When set, every operation fails as if the network were down.
    pub unreachable: bool,
    pub fail_delete_all: bool,
    pub delete_all_calls: usize,
}

#[derive(Default)]
pub struct MockRemote {
    pub inner: Mutex<MockRemoteInner>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, collection: Collection, rows: Vec<Value>) {
        self.inner.lock().rows.insert(collection, rows);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.lock().unreachable = unreachable;
    }

    pub fn fail_upsert_at(&self, call: usize) {
        self.inner.lock().fail_upsert_at = Some(call);
    }

    pub fn fail_delete_all(&self) {
        self.inner.lock().fail_delete_all = true;
    }

    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        self.inner.lock().rows.get(&collection).cloned().unwrap_or_default()
    }

    pub fn upsert_chunk_sizes(&self, collection: Collection) -> Vec<usize> {
        self.inner
            .lock()
            .upsert_chunks
            .iter()
            .filter(|(c, _)| *c == collection)
            .map(|(_, n)| *n)
            .collect()
    }

    pub fn upsert_payloads(&self) -> Vec<Vec<Value>> {
        self.inner.lock().upsert_payloads.clone()
    }

    fn offline() -> RemoteError {
        RemoteError::Transport("connection refused".to_string())
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn select(
        &self,
        collection: Collection,
        query: SelectQuery,
    ) -> Result<Vec<Value>, RemoteError> {
        let inner = self.inner.lock();
        if inner.unreachable {
            return Err(Self::offline());
        }
        let mut rows = inner.rows.get(&collection).cloned().unwrap_or_default();
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, records: &[Value]) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        if inner.unreachable {
            return Err(Self::offline());
        }
        inner
            .rows
            .entry(collection)
            .or_default()
            .extend(records.iter().cloned());
        Ok(())
    }

    async fn update(
        &self,
        _collection: Collection,
        _patch: &Value,
        _filter: (&str, &str),
    ) -> Result<(), RemoteError> {
        if self.inner.lock().unreachable {
            return Err(Self::offline());
        }
        Ok(())
    }

    async fn delete_all(&self, collection: Collection) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        inner.delete_all_calls += 1;
        if inner.unreachable {
            return Err(Self::offline());
        }
        if inner.fail_delete_all {
            return Err(RemoteError::Status {
                status: 500,
                body: "delete rejected".to_string(),
            });
        }
        inner.rows.remove(&collection);
        Ok(())
    }

    async fn upsert(
        &self,
        collection: Collection,
        records: &[Value],
        on_conflict: &str,
    ) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        if inner.unreachable {
            return Err(Self::offline());
        }
        inner.upsert_chunks.push((collection, records.len()));
        inner.upsert_payloads.push(records.to_vec());

        let call = inner.upsert_chunks.len();
        if inner.fail_upsert_at == Some(call) {
            return Err(RemoteError::Status {
                status: 500,
                body: "server error".to_string(),
            });
        }

        // Merge by conflict key: update in place, insert otherwise.
        let rows = inner.rows.entry(collection).or_default();
        for record in records {
            let key = record.get(on_conflict).cloned();
            match rows
                .iter_mut()
                .find(|row| key.is_some() && row.get(on_conflict) == key.as_ref())
            {
                Some(existing) => *existing = record.clone(),
                None => rows.push(record.clone()),
            }
        }
        Ok(())
    }

    async fn count(&self, collection: Collection) -> Result<usize, RemoteError> {
        let inner = self.inner.lock();
        if inner.unreachable {
            return Err(Self::offline());
        }
        Ok(inner.rows.get(&collection).map(|r| r.len()).unwrap_or(0))
    }
}

/// `n` order records in local (camelCase) shape.
pub fn local_orders(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            serde_json::json!({
                "id": format!("o-{i}"),
                "clientId": format!("c-{}", i % 3),
                "totalAmount": 10 * i,
            })
        })
        .collect()
}
