//! Event store abstraction.
//!
//! One async contract (`insert`, `list_all`, `list_by_date`, `clear_all`) with
//! interchangeable backends chosen at startup from [`StoreBackend`]. Handlers
//! receive the store as `Arc<dyn EventStore>` through application state.

mod memory;
mod remote;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::info;
use thiserror::Error;

use crate::{
    db::{FeedbackEvent, FeedbackInput},
    settings::StoreBackend,
};

pub use self::memory::MemoryStore;
pub use self::remote::RedisStore;
pub use self::sqlite::SqliteStore;

/// Backend I/O failure. Never retried by the store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0:#}")]
    Database(#[from] anyhow::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("corrupt feedback record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append an event, assigning the next id and stamping `created_at`.
    async fn insert(&self, input: FeedbackInput) -> StoreResult<i64>;

    /// Every event, newest `created_at` first.
    async fn list_all(&self) -> StoreResult<Vec<FeedbackEvent>>;

    /// Events whose `date` falls on `day`, newest first.
    async fn list_by_date(&self, day: NaiveDate) -> StoreResult<Vec<FeedbackEvent>>;

    /// Remove everything and reset the id sequence. Idempotent.
    async fn clear_all(&self) -> StoreResult<()>;
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub async fn open_store(backend: &StoreBackend) -> anyhow::Result<Arc<dyn EventStore>> {
    let store: Arc<dyn EventStore> = match backend {
        StoreBackend::Memory => {
            info!("Using in-memory feedback store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Sqlite { path } => {
            info!("Using SQLite feedback store at {}", path.display());
            Arc::new(SqliteStore::open(path.clone())?)
        }
        StoreBackend::Redis { url } => {
            info!("Using Redis feedback store at {url}");
            Arc::new(RedisStore::connect(url).await?)
        }
    };

    Ok(store)
}
