mod common;

use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use teampulse_lib::{
    feed::FeedPublisher,
    stats::{StatsFilter, NOTHING_TO_HIGHLIGHT},
    store::{EventStore, MemoryStore},
};
use tokio::time::{timeout, Instant};

use common::{day, input, wait_for_active, FlakyStore};

const PERIOD: Duration = Duration::from_secs(5);

fn publisher_over(store: Arc<dyn EventStore>) -> FeedPublisher {
    FeedPublisher::new(store, PERIOD)
}

#[tokio::test(start_paused = true)]
async fn first_snapshot_is_immediate_and_next_follows_interval() {
    let store: Arc<dyn EventStore> = Arc::new(MemoryStore::new());
    let publisher = publisher_over(store.clone());
    let mut subscription = publisher.subscribe(StatsFilter::AllTime);

    let started = Instant::now();
    let first = subscription.next_snapshot().await.unwrap();
    assert_eq!(first.total, 0);
    assert!(started.elapsed() < Duration::from_secs(1));

    store
        .insert(input(&["Reuniões"], &[NOTHING_TO_HIGHLIGHT], "2024-01-10T09:00:00Z", "link"))
        .await
        .unwrap();

    let second = subscription.next_snapshot().await.unwrap();
    assert_eq!(second.total, 1);
    assert_eq!(second.positive["Reuniões"], 1);
    assert!(started.elapsed() >= PERIOD);

    subscription.close().await;
    assert_eq!(publisher.active_subscriptions(), 0);
}

#[tokio::test(start_paused = true)]
async fn resends_full_snapshot_without_changes() {
    let publisher = publisher_over(Arc::new(MemoryStore::new()));
    let mut subscription = publisher.subscribe(StatsFilter::AllTime);

    let first = subscription.next_snapshot().await.unwrap();
    assert!(timeout(Duration::from_secs(4), subscription.next_snapshot())
        .await
        .is_err());

    let second = subscription.next_snapshot().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn day_filter_is_fixed_for_subscription() {
    let store: Arc<dyn EventStore> = Arc::new(MemoryStore::new());
    store
        .insert(input(&["Colaboração"], &["Reuniões"], "2024-03-01T10:00:00Z", "tablet"))
        .await
        .unwrap();
    store
        .insert(input(&["Comunicação"], &["Reuniões"], "2024-03-02T08:00:00Z", "tablet"))
        .await
        .unwrap();

    let publisher = publisher_over(store.clone());
    let mut subscription = publisher.subscribe(StatsFilter::Day(day("2024-03-01")));

    let snapshot = subscription.next_snapshot().await.unwrap();
    assert_eq!(snapshot.total, 1);
    assert_eq!(snapshot.positive["Colaboração"], 1);
    assert_eq!(snapshot.positive["Comunicação"], 0);

    store
        .insert(input(&["Comunicação"], &["Reuniões"], "2024-03-02T09:00:00Z", "link"))
        .await
        .unwrap();
    let snapshot = subscription.next_snapshot().await.unwrap();
    assert_eq!(snapshot.total, 1);
}

#[tokio::test(start_paused = true)]
async fn failed_read_skips_tick_but_keeps_subscription() {
    let publisher = publisher_over(Arc::new(FlakyStore::new(1)));
    let mut subscription = publisher.subscribe(StatsFilter::AllTime);

    let started = Instant::now();
    let snapshot = subscription.next_snapshot().await.unwrap();
    assert_eq!(snapshot.total, 0);
    assert!(started.elapsed() >= PERIOD);
    assert_eq!(publisher.active_subscriptions(), 1);
}

#[tokio::test(start_paused = true)]
async fn subscriptions_are_independent_and_released_on_drop() {
    let publisher = publisher_over(Arc::new(MemoryStore::new()));

    let mut first = publisher.subscribe(StatsFilter::AllTime);
    let mut second = publisher.subscribe(StatsFilter::AllTime);
    let third = publisher.subscribe(StatsFilter::Day(day("2024-01-01")));
    assert_ne!(first.id(), second.id());
    assert_eq!(publisher.active_subscriptions(), 3);

    drop(third);
    wait_for_active(&publisher, 2).await;

    assert!(first.next().await.is_some());
    assert!(second.next().await.is_some());

    drop(first);
    drop(second);
    wait_for_active(&publisher, 0).await;
}

#[tokio::test(start_paused = true)]
async fn many_short_lived_subscriptions_do_not_leak() {
    let publisher = publisher_over(Arc::new(MemoryStore::new()));

    for _ in 0..50 {
        let mut subscription = publisher.subscribe(StatsFilter::AllTime);
        subscription.next_snapshot().await.unwrap();
    }

    wait_for_active(&publisher, 0).await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_ends_every_open_subscription() {
    let publisher = publisher_over(Arc::new(MemoryStore::new()));
    let mut all_time = publisher.subscribe(StatsFilter::AllTime);
    let mut one_day = publisher.subscribe(StatsFilter::Day(day("2024-01-10")));
    all_time.next_snapshot().await.unwrap();
    one_day.next_snapshot().await.unwrap();

    publisher.shutdown();

    assert_eq!(all_time.next().await, None);
    assert_eq!(one_day.next().await, None);
    wait_for_active(&publisher, 0).await;

    let mut late = publisher.subscribe(StatsFilter::AllTime);
    assert_eq!(late.next().await, None);
    wait_for_active(&publisher, 0).await;
}
