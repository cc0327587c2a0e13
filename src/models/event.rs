use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    ProximityAlert,
    ProlongedScreenOn,
}

impl EventType {
    pub const ALL: [EventType; 2] = [EventType::ProximityAlert, EventType::ProlongedScreenOn];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ProximityAlert => "proximityAlert",
            EventType::ProlongedScreenOn => "prolongedScreenOn",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "proximityAlert" => Ok(EventType::ProximityAlert),
            "prolongedScreenOn" => Ok(EventType::ProlongedScreenOn),
            other => Err(anyhow!("unknown event type '{other}'")),
        }
    }
}

/// Counter key: one bucket per event type per calendar date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct EventKey {
    pub event_type: EventType,
    pub date: NaiveDate,
}

impl EventKey {
    pub fn new(event_type: EventType, date: NaiveDate) -> Self {
        Self { event_type, date }
    }
}
