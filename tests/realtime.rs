//! Realtime listener and polling feed behavior: delivery, shared
//! subscriptions, and log-don't-raise establishment failure.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::mpsc;

use storesync::collection::Collection;
use storesync::error::RemoteError;
use storesync::realtime::{ChangeFeed, PollingFeed, RealtimeListener};
use storesync::types::{ChangeKind, ChangeNotice};

use common::MockRemote;

// ============================================================================
// Scripted feed
// ============================================================================

/// Feed handing out channels whose senders the test keeps.
#[derive(Default)]
struct ScriptedFeed {
    senders: Mutex<Vec<(Collection, mpsc::Sender<ChangeNotice>)>>,
    fail: bool,
}

impl ScriptedFeed {
    fn failing() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn sender_for(&self, collection: Collection) -> Option<mpsc::Sender<ChangeNotice>> {
        self.senders
            .lock()
            .iter()
            .find(|(c, _)| *c == collection)
            .map(|(_, tx)| tx.clone())
    }

    fn opened_count(&self) -> usize {
        self.senders.lock().len()
    }
}

#[async_trait]
impl ChangeFeed for ScriptedFeed {
    async fn open(
        &self,
        collection: Collection,
    ) -> Result<mpsc::Receiver<ChangeNotice>, RemoteError> {
        if self.fail {
            return Err(RemoteError::Transport("connection refused".to_string()));
        }
        let (tx, rx) = mpsc::channel(8);
        self.senders.lock().push((collection, tx));
        Ok(rx)
    }
}

// ============================================================================
// Listener
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn notices_reach_every_subscriber() {
    let feed = Arc::new(ScriptedFeed::default());
    let listener = RealtimeListener::new(feed.clone());

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    listener
        .subscribe(Collection::Orders, move |n: &ChangeNotice| {
            let _ = tx_a.send(n.clone());
        })
        .await;
    listener
        .subscribe(Collection::Orders, move |n: &ChangeNotice| {
            let _ = tx_b.send(n.clone());
        })
        .await;

    // Both callbacks share one logical subscription.
    assert_eq!(feed.opened_count(), 1);
    assert_eq!(listener.subscriber_count(Collection::Orders), 2);

    let sender = feed.sender_for(Collection::Orders).unwrap();
    sender
        .send(ChangeNotice {
            collection: Collection::Orders,
            kind: ChangeKind::Insert,
            record_id: Some("o-1".to_string()),
        })
        .await
        .unwrap();

    let timeout = Duration::from_secs(2);
    let a = tokio::time::timeout(timeout, rx_a.recv()).await.unwrap().unwrap();
    let b = tokio::time::timeout(timeout, rx_b.recv()).await.unwrap().unwrap();
    assert_eq!(a.kind, ChangeKind::Insert);
    assert_eq!(a.record_id.as_deref(), Some("o-1"));
    assert_eq!(b.record_id.as_deref(), Some("o-1"));
}

#[tokio::test]
async fn establishment_failure_is_logged_not_raised() {
    let feed = Arc::new(ScriptedFeed::failing());
    let listener = RealtimeListener::new(feed);

    // Must complete without panicking and still register the callback.
    listener
        .subscribe(Collection::Products, |_: &ChangeNotice| {})
        .await;
    assert_eq!(listener.subscriber_count(Collection::Products), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn collections_are_watched_independently() {
    let feed = Arc::new(ScriptedFeed::default());
    let listener = RealtimeListener::new(feed.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let tx2 = tx.clone();
    listener
        .subscribe(Collection::Orders, move |n: &ChangeNotice| {
            let _ = tx.send(n.collection);
        })
        .await;
    listener
        .subscribe(Collection::Clients, move |n: &ChangeNotice| {
            let _ = tx2.send(n.collection);
        })
        .await;

    assert_eq!(feed.opened_count(), 2);

    feed.sender_for(Collection::Clients)
        .unwrap()
        .send(ChangeNotice {
            collection: Collection::Clients,
            kind: ChangeKind::Delete,
            record_id: None,
        })
        .await
        .unwrap();

    let seen = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seen, Collection::Clients);
}

// ============================================================================
// PollingFeed
// ============================================================================

#[tokio::test(start_paused = true)]
async fn polling_feed_signals_changed_rows() {
    let remote = Arc::new(MockRemote::new());
    remote.seed(
        Collection::Products,
        vec![json!({"id": "p-1", "updated_at": "2026-08-30T00:00:00Z"})],
    );

    let feed = PollingFeed::new(remote).with_interval(Duration::from_millis(50));
    let mut rx = feed.open(Collection::Products).await.unwrap();

    // Paused clock auto-advances while every task is idle.
    let notice = tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("no notice before timeout")
        .expect("feed closed");
    assert_eq!(notice.collection, Collection::Products);
    assert_eq!(notice.record_id.as_deref(), Some("p-1"));
}

#[tokio::test]
async fn polling_feed_fails_establishment_when_remote_is_down() {
    let remote = Arc::new(MockRemote::new());
    remote.set_unreachable(true);

    let feed = PollingFeed::new(remote);
    assert!(feed.open(Collection::Products).await.is_err());
}
