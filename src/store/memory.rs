use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::db::{models::feedback::sort_newest_first, FeedbackEvent, FeedbackInput};

use super::{now_millis, EventStore, StoreResult};

const FIRST_ID: i64 = 1;

struct MemoryState {
    events: Vec<FeedbackEvent>,
    next_id: i64,
}

/// Process-local store. Contents are lost on restart.
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                events: Vec::new(),
                next_id: FIRST_ID,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert(&self, input: FeedbackInput) -> StoreResult<i64> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;
        state
            .events
            .push(FeedbackEvent::from_input(id, input, now_millis()));
        Ok(id)
    }

    async fn list_all(&self) -> StoreResult<Vec<FeedbackEvent>> {
        let mut events = self.state.read().await.events.clone();
        sort_newest_first(&mut events);
        Ok(events)
    }

    async fn list_by_date(&self, day: NaiveDate) -> StoreResult<Vec<FeedbackEvent>> {
        let mut events: Vec<FeedbackEvent> = self
            .state
            .read()
            .await
            .events
            .iter()
            .filter(|event| event.occurred_on(day))
            .cloned()
            .collect();
        sort_newest_first(&mut events);
        Ok(events)
    }

    async fn clear_all(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.events.clear();
        state.next_id = FIRST_ID;
        Ok(())
    }
}
