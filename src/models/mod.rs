pub mod event;
pub mod sample;

pub use event::{EventKey, EventType};
pub use sample::{CameraIntrinsics, DetectedFace, PixelPoint, Sample};
