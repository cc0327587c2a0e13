use crate::error::MonitorError;
use crate::host::{CameraCatalog, CameraDescriptor, LensFacing};
use crate::models::CameraIntrinsics;

/// Resolves the front camera's intrinsics from the host catalogue: the first
/// front-facing camera, its first reported focal length, and its physical
/// sensor size.
pub fn resolve_intrinsics(catalog: &dyn CameraCatalog) -> Result<CameraIntrinsics, MonitorError> {
    let cameras = catalog.cameras();
    let front = cameras
        .iter()
        .find(|camera| camera.facing == LensFacing::Front)
        .ok_or(MonitorError::FrontCameraMissing)?;

    intrinsics_of(front)
}

fn intrinsics_of(camera: &CameraDescriptor) -> Result<CameraIntrinsics, MonitorError> {
    let focal_length_mm = camera
        .focal_lengths_mm
        .first()
        .copied()
        .filter(|focal| focal.is_finite() && *focal > 0.0)
        .ok_or(MonitorError::FocalLengthUnavailable)?;

    let (sensor_width_mm, sensor_height_mm) = camera
        .sensor_size_mm
        .filter(|(w, h)| w.is_finite() && h.is_finite() && *w > 0.0 && *h > 0.0)
        .ok_or(MonitorError::SensorSizeUnavailable)?;

    Ok(CameraIntrinsics {
        focal_length_mm,
        sensor_width_mm,
        sensor_height_mm,
    })
}
