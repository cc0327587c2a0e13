pub mod controller;
pub mod state;

pub use controller::{ScreenOnTracker, TICK_INTERVAL};
pub use state::{ScreenOnCounter, SCREEN_ON_THRESHOLD_SECS};
