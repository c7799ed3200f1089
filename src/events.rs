//! Typed pub/sub used for cache-updated and realtime change notifications.
//!
//! Emission snapshots the subscriber map under the lock and calls back with
//! the lock released, so a callback may subscribe or unsubscribe without
//! deadlocking. A subscriber removed during an emission round is still
//! called in that round; one added during it is not.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Handle returned by [`EventEmitter::subscribe`]; pass to
/// [`EventEmitter::unsubscribe`] to remove the callback.
pub type SubscriptionId = u64;

/// Callback type for emitted events.
pub type EventCallback<T> = dyn Fn(&T) + Send + Sync;

/// Synchronous typed event emitter. Subscribers are invoked in subscription
/// order (the map is ordered by id).
pub struct EventEmitter<T> {
    subscribers: Mutex<BTreeMap<SubscriptionId, Arc<EventCallback<T>>>>,
    next_id: AtomicU64,
}

impl<T> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `callback`, returning an id usable with `unsubscribe`.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().insert(id, Arc::new(callback));
        id
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().remove(&id);
    }

    /// Deliver `event` to every currently registered subscriber.
    pub fn emit(&self, event: &T) {
        let snapshot: Vec<Arc<EventCallback<T>>> = {
            let guard = self.subscribers.lock();
            guard.values().map(Arc::clone).collect()
        };
        for callback in snapshot {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}
