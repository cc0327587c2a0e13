use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use crate::models::{EventKey, EventType};

/// Durable per-key counters supplied by the host.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically adds one to `key` and returns the new count.
    async fn increment(&self, key: &EventKey) -> Result<u64>;

    /// Current count; unseen keys are 0.
    async fn read(&self, key: &EventKey) -> Result<u64>;

    /// Sum over the inclusive date range `[start, end]`. Stores that can
    /// answer this in one query should override it.
    async fn sum_range(&self, event_type: EventType, start: NaiveDate, end: NaiveDate) -> Result<u64> {
        let mut total = 0;
        let mut date = start;
        while date <= end {
            total += self.read(&EventKey::new(event_type, date)).await?;
            date = date
                .succ_opt()
                .ok_or_else(|| anyhow!("date range overflows the calendar at {date}"))?;
        }
        Ok(total)
    }
}

/// Non-durable counter store, for hosts without storage and for tests.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counts: Mutex<HashMap<EventKey, u64>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &EventKey) -> Result<u64> {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let count = counts.entry(*key).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn read(&self, key: &EventKey) -> Result<u64> {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(counts.get(key).copied().unwrap_or(0))
    }
}

/// Writer-of-record for dated event counters.
#[derive(Clone)]
pub struct EventStore {
    counters: Arc<dyn CounterStore>,
}

impl EventStore {
    pub fn new(counters: Arc<dyn CounterStore>) -> Self {
        Self { counters }
    }

    pub async fn record(&self, event_type: EventType, date: NaiveDate) -> Result<u64> {
        self.counters.increment(&EventKey::new(event_type, date)).await
    }

    /// Sums `days` consecutive calendar dates ending at `end_date`.
    pub async fn query_range(&self, event_type: EventType, end_date: NaiveDate, days: u32) -> Result<u64> {
        if days == 0 {
            return Ok(0);
        }

        let start = end_date
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or_else(|| anyhow!("{days} days before {end_date} is out of range"))?;

        self.counters.sum_range(event_type, start, end_date).await
    }
}
