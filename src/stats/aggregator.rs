use anyhow::Result;
use chrono::{Datelike, NaiveDate};

use crate::models::EventType;

use super::{EventStore, StatRange, StatsSummary};

/// Number of days in the calendar month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };

    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
        // Only reachable at the very end of chrono's calendar.
        _ => 31,
    }
}

/// Read-only rollups over the event store.
#[derive(Clone)]
pub struct StatsAggregator {
    events: EventStore,
}

impl StatsAggregator {
    pub fn new(events: EventStore) -> Self {
        Self { events }
    }

    pub async fn daily(&self, date: NaiveDate) -> Result<StatsSummary> {
        self.window(date, 1).await
    }

    pub async fn summary(&self, range: StatRange, today: NaiveDate) -> Result<StatsSummary> {
        self.window(today, range.days(today)).await
    }

    pub async fn today(&self, today: NaiveDate) -> Result<StatsSummary> {
        self.summary(StatRange::Today, today).await
    }

    pub async fn week(&self, today: NaiveDate) -> Result<StatsSummary> {
        self.summary(StatRange::Week, today).await
    }

    pub async fn month(&self, today: NaiveDate) -> Result<StatsSummary> {
        self.summary(StatRange::Month, today).await
    }

    async fn window(&self, end_date: NaiveDate, days: u32) -> Result<StatsSummary> {
        Ok(StatsSummary {
            proximity_count: self
                .events
                .query_range(EventType::ProximityAlert, end_date, days)
                .await?,
            screen_on_count: self
                .events
                .query_range(EventType::ProlongedScreenOn, end_date, days)
                .await?,
        })
    }
}
