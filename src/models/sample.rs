use serde::{Deserialize, Serialize};

/// A landmark position in image-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One face reported by the detector. Landmarks the detector could not
/// place are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFace {
    pub left_eye: Option<PixelPoint>,
    pub right_eye: Option<PixelPoint>,
}

impl DetectedFace {
    pub fn with_eyes(left_eye: PixelPoint, right_eye: PixelPoint) -> Self {
        Self {
            left_eye: Some(left_eye),
            right_eye: Some(right_eye),
        }
    }
}

/// Eye geometry captured by a single sampling attempt.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub left_eye: Option<PixelPoint>,
    pub right_eye: Option<PixelPoint>,
}

impl Sample {
    /// Builds the sample from the first detected face; an empty detection
    /// yields a sample with no eye positions.
    pub fn from_faces(faces: &[DetectedFace]) -> Self {
        faces
            .first()
            .map(|face| Self {
                left_eye: face.left_eye,
                right_eye: face.right_eye,
            })
            .unwrap_or_default()
    }
}

/// Physical properties of the front camera, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraIntrinsics {
    pub focal_length_mm: f32,
    pub sensor_width_mm: f32,
    pub sensor_height_mm: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_uses_first_face_only() {
        let faces = vec![
            DetectedFace::with_eyes(PixelPoint::new(1.0, 2.0), PixelPoint::new(3.0, 4.0)),
            DetectedFace::with_eyes(PixelPoint::new(9.0, 9.0), PixelPoint::new(9.0, 9.0)),
        ];

        let sample = Sample::from_faces(&faces);
        assert_eq!(sample.left_eye, Some(PixelPoint::new(1.0, 2.0)));
        assert_eq!(sample.right_eye, Some(PixelPoint::new(3.0, 4.0)));
    }

    #[test]
    fn empty_detection_has_no_eyes() {
        let sample = Sample::from_faces(&[]);
        assert_eq!(sample, Sample::default());
    }
}
