use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
    time::Duration,
};
use tokio::sync::watch;

pub const DEFAULT_DISTANCE_THRESHOLD_CM: f32 = 30.0;
pub const MIN_DISTANCE_THRESHOLD_CM: f32 = 10.0;
pub const MAX_DISTANCE_THRESHOLD_CM: f32 = 40.0;

pub const DEFAULT_INTERVAL_SECS: f32 = 3.0;
pub const MIN_INTERVAL_SECS: f32 = 3.0;
pub const MAX_INTERVAL_SECS: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    DistanceThreshold,
    IntervalSeconds,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::DistanceThreshold => "distanceThreshold",
            SettingKey::IntervalSeconds => "intervalSeconds",
        }
    }

    fn clamp(&self, value: f32) -> f32 {
        match self {
            SettingKey::DistanceThreshold => {
                value.clamp(MIN_DISTANCE_THRESHOLD_CM, MAX_DISTANCE_THRESHOLD_CM)
            }
            SettingKey::IntervalSeconds => value.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS),
        }
    }
}

/// Values the sampling loop runs with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    pub distance_threshold_cm: f32,
    pub interval_secs: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            distance_threshold_cm: DEFAULT_DISTANCE_THRESHOLD_CM,
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl MonitorConfig {
    pub fn sampling_interval(&self) -> Duration {
        Duration::from_millis((self.interval_secs * 1000.0) as u64)
    }
}

/// On-disk shape. Keys the user never set stay absent so `get` can fall back
/// to the caller's default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    #[serde(rename = "distanceThreshold", skip_serializing_if = "Option::is_none")]
    distance_threshold: Option<f32>,
    #[serde(rename = "intervalSeconds", skip_serializing_if = "Option::is_none")]
    interval_seconds: Option<f32>,
}

impl UserSettings {
    fn slot(&mut self, key: SettingKey) -> &mut Option<f32> {
        match key {
            SettingKey::DistanceThreshold => &mut self.distance_threshold,
            SettingKey::IntervalSeconds => &mut self.interval_seconds,
        }
    }

    fn value(&self, key: SettingKey) -> Option<f32> {
        match key {
            SettingKey::DistanceThreshold => self.distance_threshold,
            SettingKey::IntervalSeconds => self.interval_seconds,
        }
    }

    fn config(&self) -> MonitorConfig {
        MonitorConfig {
            distance_threshold_cm: SettingKey::DistanceThreshold.clamp(
                self.distance_threshold.unwrap_or(DEFAULT_DISTANCE_THRESHOLD_CM),
            ),
            interval_secs: SettingKey::IntervalSeconds
                .clamp(self.interval_seconds.unwrap_or(DEFAULT_INTERVAL_SECS)),
        }
    }
}

/// JSON-file backed settings with change notification.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
    changes: watch::Sender<MonitorConfig>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data: UserSettings = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        let (changes, _) = watch::channel(data.config());

        Ok(Self {
            path,
            data: RwLock::new(data),
            changes,
        })
    }

    pub fn config(&self) -> MonitorConfig {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .config()
    }

    pub fn get(&self, key: SettingKey, default: f32) -> f32 {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .value(key)
            .unwrap_or(default)
    }

    /// Stores `value` clamped to the key's range, persists, and notifies
    /// subscribers with the whole new config.
    pub fn set(&self, key: SettingKey, value: f32) -> Result<()> {
        if !value.is_finite() {
            bail!("{} must be a finite number, got {value}", key.as_str());
        }

        let config = {
            let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
            let mut updated = guard.clone();
            *updated.slot(key) = Some(key.clamp(value));
            // Memory and subscribers only move once the file holds the new value.
            self.persist(&updated)?;
            let config = updated.config();
            *guard = updated;
            config
        };

        self.changes.send_replace(config);
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorConfig> {
        self.changes.subscribe()
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: UserSettings = serde_json::from_str(&contents)?;
        let config = {
            let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
            *guard = data;
            guard.config()
        };
        self.changes.send_replace(config);
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
