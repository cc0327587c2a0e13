//! Proximity alert state machine with hysteresis.

use serde::{Deserialize, Serialize};

use crate::host::NotificationKind;
use crate::models::EventType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AlertState {
    Clear,
    TooClose,
}

impl Default for AlertState {
    fn default() -> Self {
        AlertState::Clear
    }
}

impl AlertState {
    pub fn is_too_close(&self) -> bool {
        matches!(self, AlertState::TooClose)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertTransition {
    /// Clear -> TooClose
    Raised { distance_mm: f32 },
    /// TooClose -> Clear
    Cleared { distance_mm: f32 },
}

impl AlertTransition {
    /// Raised alerts are counted; clearing is only announced.
    pub fn event_type(&self) -> Option<EventType> {
        match self {
            AlertTransition::Raised { .. } => Some(EventType::ProximityAlert),
            AlertTransition::Cleared { .. } => None,
        }
    }

    pub fn notification(&self) -> (NotificationKind, String) {
        match self {
            AlertTransition::Raised { distance_mm } => (
                NotificationKind::Warning,
                format!(
                    "You are too close to the screen! ({} mm)",
                    *distance_mm as i64
                ),
            ),
            AlertTransition::Cleared { .. } => (
                NotificationKind::Info,
                "You are at a comfortable distance from the screen again.".to_string(),
            ),
        }
    }
}

/// Feeds one reading through the machine. Only crossings of the threshold
/// produce a transition; a missing reading never does.
pub fn evaluate(
    distance_mm: Option<f32>,
    threshold_cm: f32,
    current: AlertState,
) -> (AlertState, Option<AlertTransition>) {
    let Some(distance_mm) = distance_mm else {
        return (current, None);
    };

    let too_close = distance_mm < threshold_cm * 10.0;

    match (current, too_close) {
        (AlertState::Clear, true) => (
            AlertState::TooClose,
            Some(AlertTransition::Raised { distance_mm }),
        ),
        (AlertState::TooClose, false) => (
            AlertState::Clear,
            Some(AlertTransition::Cleared { distance_mm }),
        ),
        (state, _) => (state, None),
    }
}
