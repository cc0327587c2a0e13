use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::aggregator::days_in_month;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StatRange {
    Today,
    Week,
    Month,
}

impl StatRange {
    /// Number of calendar dates, counted backward from `today`, the range
    /// covers. `Month` is as long as today's month but anchored on today,
    /// not on the 1st.
    pub fn days(&self, today: NaiveDate) -> u32 {
        match self {
            StatRange::Today => 1,
            StatRange::Week => 7,
            StatRange::Month => days_in_month(today),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub proximity_count: u64,
    pub screen_on_count: u64,
}
