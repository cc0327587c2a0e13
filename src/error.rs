//! Domain error taxonomy for the monitoring core.

use thiserror::Error;

/// Errors raised by the host camera stack and the monitoring core.
///
/// The intrinsics variants are fatal at startup; everything else is absorbed
/// by the sampling loop as a skipped cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// No camera facing the user was reported by the host
    #[error("no front-facing camera available")]
    FrontCameraMissing,

    /// The front camera did not report any focal length
    #[error("front camera reports no focal length")]
    FocalLengthUnavailable,

    /// The front camera did not report a usable physical sensor size
    #[error("front camera reports no physical sensor size")]
    SensorSizeUnavailable,

    /// Another client holds the camera
    #[error("camera is in use by another client")]
    CameraBusy,

    /// Opening or streaming from the camera failed
    #[error("camera I/O error: {0}")]
    CameraIo(String),

    /// The face detector reported a failure for the frame
    #[error("face detector error: {0}")]
    Detector(String),
}

impl MonitorError {
    /// Whether this error stops the monitoring core.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MonitorError::FrontCameraMissing
                | MonitorError::FocalLengthUnavailable
                | MonitorError::SensorSizeUnavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_intrinsics_errors_are_fatal() {
        assert!(MonitorError::FrontCameraMissing.is_fatal());
        assert!(MonitorError::FocalLengthUnavailable.is_fatal());
        assert!(MonitorError::SensorSizeUnavailable.is_fatal());
        assert!(!MonitorError::CameraBusy.is_fatal());
        assert!(!MonitorError::CameraIo("closed".into()).is_fatal());
        assert!(!MonitorError::Detector("model".into()).is_fatal());
    }
}
