use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};

use crate::db::{
    connection::Database,
    helpers::{format_date, to_u64},
};
use crate::models::{EventKey, EventType};
use crate::stats::CounterStore;

impl Database {
    /// Adds one to the counter in a single statement and returns the new value.
    pub async fn increment_event(&self, key: &EventKey) -> Result<u64> {
        let event_type = key.event_type.as_str();
        let event_date = format_date(key.date);
        self.execute(move |conn| {
            let count: i64 = conn
                .query_row(
                    "INSERT INTO event_counts (event_type, event_date, count, updated_at)
                     VALUES (?1, ?2, 1, ?3)
                     ON CONFLICT(event_type, event_date)
                     DO UPDATE SET count = count + 1, updated_at = excluded.updated_at
                     RETURNING count",
                    params![event_type, event_date, Utc::now().to_rfc3339()],
                    |row| row.get(0),
                )
                .with_context(|| format!("failed to increment {event_type} for {event_date}"))?;
            to_u64(count, "count")
        })
        .await
    }

    pub async fn get_event_count(&self, key: &EventKey) -> Result<u64> {
        let event_type = key.event_type.as_str();
        let event_date = format_date(key.date);
        self.execute(move |conn| {
            let count: Option<i64> = conn
                .query_row(
                    "SELECT count FROM event_counts
                     WHERE event_type = ?1 AND event_date = ?2",
                    params![event_type, event_date],
                    |row| row.get(0),
                )
                .optional()?;
            to_u64(count.unwrap_or(0), "count")
        })
        .await
    }

    pub async fn sum_event_counts(
        &self,
        event_type: EventType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64> {
        let event_type = event_type.as_str();
        let (start, end) = (format_date(start), format_date(end));
        self.execute(move |conn| {
            let total: i64 = conn.query_row(
                "SELECT COALESCE(SUM(count), 0) FROM event_counts
                 WHERE event_type = ?1 AND event_date BETWEEN ?2 AND ?3",
                params![event_type, start, end],
                |row| row.get(0),
            )?;
            to_u64(total, "count")
        })
        .await
    }
}

#[async_trait]
impl CounterStore for Database {
    async fn increment(&self, key: &EventKey) -> Result<u64> {
        self.increment_event(key).await
    }

    async fn read(&self, key: &EventKey) -> Result<u64> {
        self.get_event_count(key).await
    }

    async fn sum_range(&self, event_type: EventType, start: NaiveDate, end: NaiveDate) -> Result<u64> {
        self.sum_event_counts(event_type, start, end).await
    }
}
