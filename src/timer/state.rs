use serde::{Deserialize, Serialize};

/// Continuous screen-on time after which a break is suggested, and the
/// spacing of every reminder after that.
pub const SCREEN_ON_THRESHOLD_SECS: u32 = 20 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenOnCounter {
    pub duration_secs: u32,
    /// `duration_secs` at the last reminder; 0 if none since the screen came on.
    pub last_warning_secs: u32,
    #[serde(skip)]
    threshold_secs: u32,
}

impl Default for ScreenOnCounter {
    fn default() -> Self {
        Self::with_threshold(SCREEN_ON_THRESHOLD_SECS)
    }
}

impl ScreenOnCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(threshold_secs: u32) -> Self {
        Self {
            duration_secs: 0,
            last_warning_secs: 0,
            threshold_secs,
        }
    }

    pub fn threshold_secs(&self) -> u32 {
        self.threshold_secs
    }

    /// Advances one second. Returns the screen-on duration when a fatigue
    /// reminder is due on this tick.
    pub fn tick(&mut self, screen_on: bool) -> Option<u32> {
        if !screen_on {
            self.duration_secs = 0;
            self.last_warning_secs = 0;
            return None;
        }

        self.duration_secs = self.duration_secs.saturating_add(1);

        if self.duration_secs >= self.threshold_secs
            && self.duration_secs - self.last_warning_secs >= self.threshold_secs
        {
            self.last_warning_secs = self.duration_secs;
            return Some(self.duration_secs);
        }

        None
    }
}
