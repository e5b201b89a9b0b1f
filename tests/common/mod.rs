#![allow(dead_code)]

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use teampulse_lib::{
    feed::FeedPublisher,
    store::{EventStore, MemoryStore, StoreError, StoreResult},
    FeedbackEvent, FeedbackInput,
};

pub fn input(positive: &[&str], negative: &[&str], date: &str, source: &str) -> FeedbackInput {
    FeedbackInput {
        positive: positive.iter().map(|s| s.to_string()).collect(),
        negative: negative.iter().map(|s| s.to_string()).collect(),
        date: date.to_string(),
        source: source.to_string(),
    }
}

pub fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

/// Fails the first `failures` reads, then behaves like a `MemoryStore`.
pub struct FlakyStore {
    inner: MemoryStore,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(failures: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures: AtomicUsize::new(failures),
        }
    }

    pub fn always_failing() -> Self {
        Self::new(usize::MAX)
    }

    fn check(&self) -> StoreResult<()> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining == 0 {
            return Ok(());
        }
        if remaining != usize::MAX {
            self.failures.fetch_sub(1, Ordering::SeqCst);
        }
        Err(StoreError::Database(anyhow::anyhow!("disk unavailable")))
    }
}

#[async_trait]
impl EventStore for FlakyStore {
    async fn insert(&self, input: FeedbackInput) -> StoreResult<i64> {
        self.check()?;
        self.inner.insert(input).await
    }

    async fn list_all(&self) -> StoreResult<Vec<FeedbackEvent>> {
        self.check()?;
        self.inner.list_all().await
    }

    async fn list_by_date(&self, day: NaiveDate) -> StoreResult<Vec<FeedbackEvent>> {
        self.check()?;
        self.inner.list_by_date(day).await
    }

    async fn clear_all(&self) -> StoreResult<()> {
        self.check()?;
        self.inner.clear_all().await
    }
}

pub async fn wait_for_active(publisher: &FeedPublisher, expected: usize) {
    for _ in 0..200 {
        if publisher.active_subscriptions() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {expected} active subscriptions, found {}",
        publisher.active_subscriptions()
    );
}
