//! Feedback data models.
//!
//! The serialized field names match the persisted record shape shared by every
//! backend: `{id, positive, negative, date, source, createdAt}`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Format used for calendar-date filtering (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A stored feedback submission. Immutable once inserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEvent {
    pub id: i64,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    /// Caller-supplied ISO 8601 date or datetime the feedback belongs to.
    pub date: String,
    pub source: String,
    /// Server ingestion time in epoch milliseconds. Only used for list ordering.
    pub created_at: i64,
}

impl FeedbackEvent {
    pub fn from_input(id: i64, input: FeedbackInput, created_at: i64) -> Self {
        Self {
            id,
            positive: input.positive,
            negative: input.negative,
            date: input.date,
            source: input.source,
            created_at,
        }
    }

    /// True when the event's calendar date equals `day`, ignoring time-of-day.
    pub fn occurred_on(&self, day: NaiveDate) -> bool {
        self.date.starts_with(&day.format(DATE_FORMAT).to_string())
    }
}

/// Validated submission, ready to hand to an `EventStore`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackInput {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub date: String,
    pub source: String,
}

/// Newest first; ties on `created_at` fall back to the higher id.
pub fn sort_newest_first(events: &mut [FeedbackEvent]) {
    events.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
