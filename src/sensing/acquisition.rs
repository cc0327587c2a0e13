//! One camera acquisition: the callback handle given to the detector and the
//! guard that owns the open camera session.

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::MonitorError;
use crate::host::CameraSession;
use crate::models::DetectedFace;

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    Faces(Vec<DetectedFace>),
    Failed(MonitorError),
}

pub(crate) type TaggedOutcome = (u64, DetectionOutcome);

/// Handed to the detector for one attempt. Every callback is tagged with the
/// attempt's generation so the sampling loop can drop callbacks that arrive
/// after the attempt has settled or been superseded.
#[derive(Debug, Clone)]
pub struct DetectionCallbacks {
    generation: u64,
    tx: mpsc::UnboundedSender<TaggedOutcome>,
}

impl DetectionCallbacks {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<TaggedOutcome>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn on_result(&self, faces: Vec<DetectedFace>) {
        // The loop may already be gone during shutdown.
        let _ = self.tx.send((self.generation, DetectionOutcome::Faces(faces)));
    }

    pub fn on_error(&self, err: MonitorError) {
        let _ = self.tx.send((self.generation, DetectionOutcome::Failed(err)));
    }
}

/// Owns the open camera for the attempt in flight. The session is stopped on
/// `teardown` or on drop, whichever comes first.
pub(crate) struct ActiveAcquisition {
    generation: u64,
    deadline: Instant,
    session: Option<Box<dyn CameraSession>>,
}

impl ActiveAcquisition {
    pub(crate) fn new(generation: u64, deadline: Instant, session: Box<dyn CameraSession>) -> Self {
        Self {
            generation,
            deadline,
            session: Some(session),
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Idempotent.
    pub(crate) fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
    }
}

impl Drop for ActiveAcquisition {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Stops and discards the acquisition in `slot`, if any.
pub(crate) fn release(slot: &mut Option<ActiveAcquisition>) {
    if let Some(mut acquisition) = slot.take() {
        acquisition.teardown();
    }
}
