//! A stand-in host for running the core without camera hardware: a random
//! face at a wandering distance, an occasionally busy camera, and
//! notifications written to the log.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex, PoisonError,
};

use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::time::{sleep, Duration};

use crate::{
    error::MonitorError,
    host::{
        CameraCatalog, CameraDescriptor, CameraSession, FaceDetector, LensFacing,
        NotificationKind, NotificationSink, ScreenPowerSignal,
    },
    models::{DetectedFace, PixelPoint},
    sensing::DetectionCallbacks,
};

const FOCAL_LENGTH_MM: f32 = 3.0;
const SENSOR_SIZE_MM: (f32, f32) = (4.8, 3.6);

pub struct SimulatedHost {
    rng: Mutex<StdRng>,
    screen_on: AtomicBool,
    live_sessions: Arc<AtomicUsize>,
}

impl SimulatedHost {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            screen_on: AtomicBool::new(true),
            live_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_screen_on(&self, on: bool) {
        self.screen_on.store(on, Ordering::SeqCst);
    }

    /// Camera sessions opened and not yet stopped.
    pub fn live_sessions(&self) -> usize {
        self.live_sessions.load(Ordering::SeqCst)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

impl CameraCatalog for SimulatedHost {
    fn cameras(&self) -> Vec<CameraDescriptor> {
        vec![
            CameraDescriptor {
                id: "0".into(),
                facing: LensFacing::Back,
                focal_lengths_mm: vec![4.2],
                sensor_size_mm: Some((6.4, 4.8)),
            },
            CameraDescriptor {
                id: "1".into(),
                facing: LensFacing::Front,
                focal_lengths_mm: vec![FOCAL_LENGTH_MM],
                sensor_size_mm: Some(SENSOR_SIZE_MM),
            },
        ]
    }
}

impl ScreenPowerSignal for SimulatedHost {
    fn is_screen_on(&self) -> bool {
        self.screen_on.load(Ordering::SeqCst)
    }
}

impl NotificationSink for SimulatedHost {
    fn notify(&self, kind: NotificationKind, message: &str) {
        info!("[notification:{kind:?}] {message}");
    }
}

struct SimulatedSession {
    stopped: Arc<AtomicBool>,
    live_sessions: Arc<AtomicUsize>,
}

impl CameraSession for SimulatedSession {
    fn stop(&mut self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.live_sessions.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl FaceDetector for SimulatedHost {
    fn detect_once(
        &self,
        callbacks: DetectionCallbacks,
    ) -> Result<Box<dyn CameraSession>, MonitorError> {
        let (busy, delay_ms, faces_found, eye_spacing_px) = self.with_rng(|rng| {
            (
                rng.gen_bool(0.05),
                rng.gen_range(50..2500u64),
                rng.gen_bool(0.85),
                rng.gen_range(120.0..320.0f32),
            )
        });

        if busy {
            return Err(MonitorError::CameraBusy);
        }

        self.live_sessions.fetch_add(1, Ordering::SeqCst);
        let stopped = Arc::new(AtomicBool::new(false));

        let task_stopped = stopped.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;
            if task_stopped.load(Ordering::SeqCst) {
                return;
            }
            if faces_found {
                let left = PixelPoint::new(512.0 - eye_spacing_px / 2.0, 480.0);
                let right = PixelPoint::new(512.0 + eye_spacing_px / 2.0, 484.0);
                callbacks.on_result(vec![DetectedFace::with_eyes(left, right)]);
            } else {
                callbacks.on_result(Vec::new());
            }
        });

        Ok(Box::new(SimulatedSession {
            stopped,
            live_sessions: self.live_sessions.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensing::{resolve_intrinsics, DetectionOutcome};
    use tokio::sync::mpsc;

    #[test]
    fn exposes_a_usable_front_camera() {
        let host = SimulatedHost::new(7);
        let intrinsics = resolve_intrinsics(&host).unwrap();
        assert_eq!(intrinsics.focal_length_mm, FOCAL_LENGTH_MM);
        assert_eq!(
            (intrinsics.sensor_width_mm, intrinsics.sensor_height_mm),
            SENSOR_SIZE_MM
        );
    }

    #[test]
    fn screen_flag_is_switchable() {
        let host = SimulatedHost::new(7);
        assert!(host.is_screen_on());
        host.set_screen_on(false);
        assert!(!host.is_screen_on());
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_are_counted_until_stopped_once() {
        let host = SimulatedHost::new(42);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut sessions = Vec::new();
        for generation in 1..=20 {
            if let Ok(session) = host.detect_once(DetectionCallbacks::new(generation, tx.clone())) {
                sessions.push(session);
            }
        }
        assert!(!sessions.is_empty());
        assert_eq!(host.live_sessions(), sessions.len());

        sleep(Duration::from_secs(3)).await;
        let mut delivered = 0;
        while let Ok((_, outcome)) = rx.try_recv() {
            assert!(matches!(outcome, DetectionOutcome::Faces(_)));
            delivered += 1;
        }
        assert_eq!(delivered, sessions.len());

        for session in &mut sessions {
            session.stop();
            session.stop();
        }
        assert_eq!(host.live_sessions(), 0);
    }
}
