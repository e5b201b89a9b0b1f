//! Redis-backed store.
//!
//! - `feedback:next_id`: counter, `INCR` hands out ids atomically across processes
//! - `feedback:events`: hash of id -> JSON record
//!
//! `DEL` on both keys clears the store; the next `INCR` starts again at 1.

use async_trait::async_trait;
use chrono::NaiveDate;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use crate::db::{models::feedback::sort_newest_first, FeedbackEvent, FeedbackInput};

use super::{now_millis, EventStore, StoreResult};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::{log_error, log_info};

const NEXT_ID_KEY: &str = "feedback:next_id";
const EVENTS_KEY: &str = "feedback:events";

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = Client::open(redis_url)?;
        let connection = client.get_connection_manager().await?;
        Ok(Self { connection })
    }

    async fn load_events(&self) -> StoreResult<Vec<FeedbackEvent>> {
        let mut conn = self.connection.clone();
        let raw: Vec<String> = conn.hvals(EVENTS_KEY).await?;
        log_info!("loaded {} feedback records from redis", raw.len());
        decode_records(raw)
    }
}

fn decode_records(raw: Vec<String>) -> StoreResult<Vec<FeedbackEvent>> {
    let mut events = raw
        .iter()
        .map(|record| serde_json::from_str::<FeedbackEvent>(record))
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|err| {
            log_error!("undecodable feedback record in redis: {err}");
        })?;
    sort_newest_first(&mut events);
    Ok(events)
}

#[async_trait]
impl EventStore for RedisStore {
    async fn insert(&self, input: FeedbackInput) -> StoreResult<i64> {
        let mut conn = self.connection.clone();
        let id: i64 = conn.incr(NEXT_ID_KEY, 1).await?;
        let event = FeedbackEvent::from_input(id, input, now_millis());
        let record = serde_json::to_string(&event)?;
        let _: () = conn.hset(EVENTS_KEY, id, record).await?;
        Ok(id)
    }

    async fn list_all(&self) -> StoreResult<Vec<FeedbackEvent>> {
        self.load_events().await
    }

    async fn list_by_date(&self, day: NaiveDate) -> StoreResult<Vec<FeedbackEvent>> {
        let mut events = self.load_events().await?;
        events.retain(|event| event.occurred_on(day));
        Ok(events)
    }

    async fn clear_all(&self) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(vec![EVENTS_KEY, NEXT_ID_KEY]).await?;
        Ok(())
    }
}
