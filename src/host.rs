//! Contracts for the collaborators the host environment supplies: camera
//! catalogue, face detector, screen power, and notification delivery.

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::sensing::DetectionCallbacks;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Warning,
    Info,
    FatigueWarning,
}

/// Fire-and-forget delivery of user-facing notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Polled display power state.
pub trait ScreenPowerSignal: Send + Sync {
    fn is_screen_on(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CallState {
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LensFacing {
    Front,
    Back,
    External,
}

/// What the host reports about one camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDescriptor {
    pub id: String,
    pub facing: LensFacing,
    pub focal_lengths_mm: Vec<f32>,
    /// Physical sensor (width, height).
    pub sensor_size_mm: Option<(f32, f32)>,
}

pub trait CameraCatalog: Send + Sync {
    fn cameras(&self) -> Vec<CameraDescriptor>;
}

/// An open camera streaming frames into the detector.
pub trait CameraSession: Send {
    /// Releases the camera. Called exactly once per session by the core.
    fn stop(&mut self);
}

/// Single-shot face detection on the front camera.
///
/// `detect_once` opens the camera and returns immediately; results arrive
/// later through `callbacks`, possibly from another thread and possibly more
/// than once. An `Err` means the camera could not be opened at all.
pub trait FaceDetector: Send + Sync {
    fn detect_once(
        &self,
        callbacks: DetectionCallbacks,
    ) -> Result<Box<dyn CameraSession>, MonitorError>;
}
