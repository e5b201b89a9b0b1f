use std::{
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    task::{Context, Poll},
    time::Duration,
};

use futures::Stream;
use log::{error, info};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    stats::{CategorySnapshot, StatsFilter},
    store::EventStore,
};

use super::loop_worker::feed_loop;

pub const DEFAULT_FEED_INTERVAL: Duration = Duration::from_secs(5);

/// Snapshots buffered per subscriber before the loop waits on a slow reader.
const FEED_BUFFER: usize = 4;

/// Hands out independent live-stats subscriptions over a shared store.
#[derive(Clone)]
pub struct FeedPublisher {
    store: Arc<dyn EventStore>,
    period: Duration,
    active: Arc<AtomicUsize>,
    root_token: CancellationToken,
}

impl FeedPublisher {
    pub fn new(store: Arc<dyn EventStore>, period: Duration) -> Self {
        Self {
            store,
            period,
            active: Arc::new(AtomicUsize::new(0)),
            root_token: CancellationToken::new(),
        }
    }

    /// Cancel every subscription, current and future, so open streams end.
    pub fn shutdown(&self) {
        if !self.root_token.is_cancelled() {
            info!("feed publisher shutting down ({} active)", self.active_subscriptions());
        }
        self.root_token.cancel();
    }

    /// Number of subscription loops still running.
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Start a subscription with its own timer. The filter is fixed for its lifetime.
    pub fn subscribe(&self, filter: StatsFilter) -> Subscription {
        let id = Uuid::new_v4();
        let cancel_token = self.root_token.child_token();
        let (sender, receiver) = mpsc::channel(FEED_BUFFER);

        self.active.fetch_add(1, Ordering::SeqCst);
        let guard = ActiveGuard(self.active.clone());

        let store = self.store.clone();
        let period = self.period;
        let token = cancel_token.clone();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            feed_loop(id, store, filter, period, sender, token).await;
        });

        info!("feed {id} subscribed ({filter:?})");

        Subscription {
            id,
            receiver,
            cancel_token,
            handle: Some(handle),
        }
    }
}

struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A live sequence of snapshots. Dropping it stops the timer and aborts the loop.
pub struct Subscription {
    id: Uuid,
    receiver: mpsc::Receiver<CategorySnapshot>,
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn next_snapshot(&mut self) -> Option<CategorySnapshot> {
        self.receiver.recv().await
    }

    /// Cancel and wait until the loop has exited.
    pub async fn close(mut self) {
        self.cancel_token.cancel();
        self.receiver.close();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                error!("feed {} failed to join: {err}", self.id);
            }
        }
    }
}

impl Stream for Subscription {
    type Item = CategorySnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.cancel_token.is_cancelled() {
            info!("feed {} unsubscribed", self.id);
        }
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
