use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::VOCABULARY;

/// Category counts over one aggregation window.
///
/// Both maps always carry every vocabulary key, zero or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySnapshot {
    pub total: u64,
    pub positive: BTreeMap<String, u64>,
    pub negative: BTreeMap<String, u64>,
}

impl CategorySnapshot {
    pub fn empty() -> Self {
        let zeroed: BTreeMap<String, u64> = VOCABULARY
            .iter()
            .map(|label| (label.to_string(), 0))
            .collect();

        Self {
            total: 0,
            positive: zeroed.clone(),
            negative: zeroed,
        }
    }
}

impl Default for CategorySnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsFilter {
    AllTime,
    Day(NaiveDate),
}

impl From<Option<NaiveDate>> for StatsFilter {
    fn from(day: Option<NaiveDate>) -> Self {
        day.map_or(StatsFilter::AllTime, StatsFilter::Day)
    }
}
