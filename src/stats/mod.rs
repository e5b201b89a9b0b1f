//! Category aggregation.
//!
//! Snapshots are recomputed from a full scan of the store on every request
//! and every feed tick, O(n) in stored events. Fine for office-sized volumes;
//! past that, per-category counters updated on insert would replace the scan.

mod types;

pub use types::{CategorySnapshot, StatsFilter};

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::{
    db::FeedbackEvent,
    store::{EventStore, StoreResult},
};

/// Label meaning "explicitly nothing to highlight"; counted like any category.
pub const NOTHING_TO_HIGHLIGHT: &str = "Nada a destacar hoje";

pub const CATEGORIES: [&str; 6] = [
    "Dinâmica do dia",
    "Reuniões",
    "Comunicação",
    "Espaço de trabalho",
    "Foco / Produtividade",
    "Colaboração",
];

/// Every key present in a snapshot: the categories plus the sentinel.
pub const VOCABULARY: [&str; 7] = [
    CATEGORIES[0],
    CATEGORIES[1],
    CATEGORIES[2],
    CATEGORIES[3],
    CATEGORIES[4],
    CATEGORIES[5],
    NOTHING_TO_HIGHLIGHT,
];

/// Count events per category. Unknown labels are ignored and a label repeated
/// within one event counts once.
pub fn aggregate<'a, I>(events: I) -> CategorySnapshot
where
    I: IntoIterator<Item = &'a FeedbackEvent>,
{
    let mut snapshot = CategorySnapshot::empty();

    for event in events {
        snapshot.total += 1;
        tally(&mut snapshot.positive, &event.positive);
        tally(&mut snapshot.negative, &event.negative);
    }

    snapshot
}

/// `aggregate` over the events that fall on `day`.
pub fn aggregate_by_date<'a, I>(events: I, day: NaiveDate) -> CategorySnapshot
where
    I: IntoIterator<Item = &'a FeedbackEvent>,
{
    aggregate(events.into_iter().filter(|event| event.occurred_on(day)))
}

fn tally(counts: &mut BTreeMap<String, u64>, labels: &[String]) {
    let unique: BTreeSet<&str> = labels.iter().map(String::as_str).collect();
    for label in unique {
        if let Some(count) = counts.get_mut(label) {
            *count += 1;
        }
    }
}

/// Read the window from the store and aggregate it.
pub async fn snapshot(store: &dyn EventStore, filter: StatsFilter) -> StoreResult<CategorySnapshot> {
    let events = match filter {
        StatsFilter::AllTime => store.list_all().await?,
        StatsFilter::Day(day) => store.list_by_date(day).await?,
    };

    Ok(aggregate(&events))
}
