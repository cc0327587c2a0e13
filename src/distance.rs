//! Pinhole-camera distance estimate from the spacing of the two eyes.

use crate::models::{CameraIntrinsics, Sample};

/// Average adult interpupillary distance.
pub const AVERAGE_INTERPUPILLARY_MM: f32 = 63.0;

/// Capture resolution the detector is configured with, per axis.
pub const IMAGE_WIDTH_PX: f32 = 1024.0;
pub const IMAGE_HEIGHT_PX: f32 = 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Estimates the face-to-screen distance in millimetres.
///
/// Measures along the axis with the larger eye separation (horizontal wins
/// ties). An axis with zero separation is unusable; if both are, or either
/// eye is missing, there is no reading.
pub fn estimate(sample: &Sample, intrinsics: &CameraIntrinsics) -> Option<f32> {
    let left = sample.left_eye?;
    let right = sample.right_eye?;

    let dx = (left.x - right.x).abs();
    let dy = (left.y - right.y).abs();

    let order = if dx >= dy {
        [Axis::Horizontal, Axis::Vertical]
    } else {
        [Axis::Vertical, Axis::Horizontal]
    };

    order.into_iter().find_map(|axis| {
        let (delta_px, sensor_mm, image_px) = match axis {
            Axis::Horizontal => (dx, intrinsics.sensor_width_mm, IMAGE_WIDTH_PX),
            Axis::Vertical => (dy, intrinsics.sensor_height_mm, IMAGE_HEIGHT_PX),
        };
        project(intrinsics.focal_length_mm, sensor_mm, image_px, delta_px)
    })
}

fn project(focal_length_mm: f32, sensor_mm: f32, image_px: f32, delta_px: f32) -> Option<f32> {
    if !(delta_px.is_finite() && delta_px > 0.0) || !(sensor_mm.is_finite() && sensor_mm > 0.0) {
        return None;
    }

    let distance_mm =
        focal_length_mm * (AVERAGE_INTERPUPILLARY_MM / sensor_mm) * (image_px / delta_px);
    distance_mm.is_finite().then_some(distance_mm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PixelPoint;

    fn intrinsics() -> CameraIntrinsics {
        CameraIntrinsics {
            focal_length_mm: 3.0,
            sensor_width_mm: 4.8,
            sensor_height_mm: 3.6,
        }
    }

    fn sample(left: (f32, f32), right: (f32, f32)) -> Sample {
        Sample {
            left_eye: Some(PixelPoint::new(left.0, left.1)),
            right_eye: Some(PixelPoint::new(right.0, right.1)),
        }
    }

    #[test]
    fn horizontal_eyes_use_sensor_width() {
        let distance = estimate(&sample((400.0, 500.0), (600.0, 500.0)), &intrinsics()).unwrap();
        assert!((distance - 201.6).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn larger_vertical_delta_uses_sensor_height() {
        let distance = estimate(&sample((500.0, 300.0), (520.0, 500.0)), &intrinsics()).unwrap();
        let expected = 3.0 * (63.0 / 3.6) * (1024.0 / 200.0);
        assert!((distance - expected).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn missing_eye_yields_no_reading() {
        let half = Sample {
            left_eye: Some(PixelPoint::new(1.0, 1.0)),
            right_eye: None,
        };
        assert_eq!(estimate(&half, &intrinsics()), None);
        assert_eq!(estimate(&Sample::default(), &intrinsics()), None);
    }

    #[test]
    fn coincident_eyes_yield_no_reading() {
        assert_eq!(estimate(&sample((300.0, 300.0), (300.0, 300.0)), &intrinsics()), None);
    }

    #[test]
    fn unusable_sensor_axis_falls_back_to_other_axis() {
        let lopsided = CameraIntrinsics {
            focal_length_mm: 3.0,
            sensor_width_mm: 0.0,
            sensor_height_mm: 3.6,
        };
        let distance = estimate(&sample((400.0, 500.0), (600.0, 520.0)), &lopsided).unwrap();
        let expected = 3.0 * (63.0 / 3.6) * (1024.0 / 20.0);
        assert!((distance - expected).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn estimate_is_deterministic() {
        let s = sample((412.5, 498.0), (611.25, 503.5));
        let first = estimate(&s, &intrinsics());
        for _ in 0..10 {
            assert_eq!(estimate(&s, &intrinsics()), first);
        }
    }
}
