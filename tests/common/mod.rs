#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rand::{rngs::StdRng, Rng, SeedableRng};
use safedistance_lib::{
    host::{
        CameraCatalog, CameraDescriptor, CameraSession, FaceDetector, LensFacing,
        NotificationKind, NotificationSink, ScreenPowerSignal,
    },
    models::{DetectedFace, EventKey, EventType, PixelPoint},
    monitor::MonitorHost,
    sensing::{DetectionCallbacks, DetectionOutcome},
    stats::CounterStore,
    MonitorError,
};
use tokio::time::{sleep_until, Duration, Instant};

/// Eye spacing that puts the face at ~201.6 mm with the test camera.
pub const CLOSE_SPACING_PX: f32 = 200.0;
/// Eye spacing that puts the face at ~403.2 mm with the test camera.
pub const FAR_SPACING_PX: f32 = 100.0;

pub fn face(spacing_px: f32) -> Vec<DetectedFace> {
    vec![DetectedFace::with_eyes(
        PixelPoint::new(512.0 - spacing_px / 2.0, 500.0),
        PixelPoint::new(512.0 + spacing_px / 2.0, 500.0),
    )]
}

pub struct TestCatalog {
    pub cameras: Vec<CameraDescriptor>,
}

impl TestCatalog {
    pub fn front() -> Self {
        Self {
            cameras: vec![CameraDescriptor {
                id: "1".into(),
                facing: LensFacing::Front,
                focal_lengths_mm: vec![3.0],
                sensor_size_mm: Some((4.8, 3.6)),
            }],
        }
    }

    pub fn rear_only() -> Self {
        Self {
            cameras: vec![CameraDescriptor {
                id: "0".into(),
                facing: LensFacing::Back,
                focal_lengths_mm: vec![4.2],
                sensor_size_mm: Some((6.4, 4.8)),
            }],
        }
    }
}

impl CameraCatalog for TestCatalog {
    fn cameras(&self) -> Vec<CameraDescriptor> {
        self.cameras.clone()
    }
}

pub struct TestScreen {
    on: AtomicBool,
}

impl TestScreen {
    pub fn new(on: bool) -> Self {
        Self {
            on: AtomicBool::new(on),
        }
    }

    pub fn set(&self, on: bool) {
        self.on.store(on, Ordering::SeqCst);
    }
}

impl ScreenPowerSignal for TestScreen {
    fn is_screen_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(NotificationKind, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.sent().iter().filter(|(k, _)| *k == kind).count()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.sent.lock().unwrap().push((kind, message.to_string()));
    }
}

/// How the detector behaves for one `detect_once` call.
#[derive(Debug, Clone)]
pub enum Script {
    /// Another client holds the camera.
    Busy,
    /// Opening the camera fails with the given error.
    Refuse(MonitorError),
    /// Callbacks fired at the given offsets from the open, whether or not the
    /// session has been stopped by then.
    Respond(Vec<(Duration, DetectionOutcome)>),
}

impl Script {
    pub fn face_after(millis: u64, spacing_px: f32) -> Self {
        Script::Respond(vec![(
            Duration::from_millis(millis),
            DetectionOutcome::Faces(face(spacing_px)),
        )])
    }

    pub fn silent() -> Self {
        Script::Respond(Vec::new())
    }

    fn random(rng: &mut StdRng) -> Self {
        if rng.gen_bool(0.1) {
            return Script::Busy;
        }
        let callbacks = rng.gen_range(0..4);
        let mut at = 0u64;
        let events = (0..callbacks)
            .map(|_| {
                at += rng.gen_range(0..1500);
                let outcome = match rng.gen_range(0..4) {
                    0 => DetectionOutcome::Faces(Vec::new()),
                    1 => DetectionOutcome::Failed(MonitorError::Detector("blurred".into())),
                    2 => DetectionOutcome::Faces(face(CLOSE_SPACING_PX)),
                    _ => DetectionOutcome::Faces(face(FAR_SPACING_PX)),
                };
                (Duration::from_millis(at), outcome)
            })
            .collect();
        Script::Respond(events)
    }
}

#[derive(Default)]
struct SessionCounters {
    live: AtomicUsize,
    max_live: AtomicUsize,
    opened: AtomicUsize,
    stops: AtomicUsize,
}

struct TestSession {
    stopped: bool,
    counters: Arc<SessionCounters>,
}

impl CameraSession for TestSession {
    fn stop(&mut self) {
        assert!(!self.stopped, "session stopped twice");
        self.stopped = true;
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
        self.counters.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Detector driven by a queue of scripts; once the queue is empty it either
/// stays silent or, when seeded, improvises random scripts.
pub struct ScriptedDetector {
    scripts: Mutex<VecDeque<Script>>,
    rng: Option<Mutex<StdRng>>,
    counters: Arc<SessionCounters>,
}

impl ScriptedDetector {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            rng: None,
            counters: Arc::default(),
        }
    }

    pub fn random(seed: u64) -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
            counters: Arc::default(),
        }
    }

    pub fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.counters.max_live.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.counters.stops.load(Ordering::SeqCst)
    }

    fn next_script(&self) -> Script {
        if let Some(script) = self.scripts.lock().unwrap().pop_front() {
            return script;
        }
        match &self.rng {
            Some(rng) => Script::random(&mut rng.lock().unwrap()),
            None => Script::silent(),
        }
    }
}

impl FaceDetector for ScriptedDetector {
    fn detect_once(
        &self,
        callbacks: DetectionCallbacks,
    ) -> Result<Box<dyn CameraSession>, MonitorError> {
        let events = match self.next_script() {
            Script::Busy => return Err(MonitorError::CameraBusy),
            Script::Refuse(err) => return Err(err),
            Script::Respond(events) => events,
        };

        let live = self.counters.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_live.fetch_max(live, Ordering::SeqCst);
        self.counters.opened.fetch_add(1, Ordering::SeqCst);

        let opened_at = Instant::now();
        tokio::spawn(async move {
            for (offset, outcome) in events {
                sleep_until(opened_at + offset).await;
                match outcome {
                    DetectionOutcome::Faces(faces) => callbacks.on_result(faces),
                    DetectionOutcome::Failed(err) => callbacks.on_error(err),
                }
            }
        });

        Ok(Box::new(TestSession {
            stopped: false,
            counters: self.counters.clone(),
        }))
    }
}

pub struct Harness {
    pub catalog: Arc<TestCatalog>,
    pub detector: Arc<ScriptedDetector>,
    pub screen: Arc<TestScreen>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(detector: ScriptedDetector) -> Self {
        Self {
            catalog: Arc::new(TestCatalog::front()),
            detector: Arc::new(detector),
            screen: Arc::new(TestScreen::new(true)),
            notifier: Arc::default(),
        }
    }

    pub fn host(&self) -> MonitorHost {
        MonitorHost {
            cameras: self.catalog.clone(),
            detector: self.detector.clone(),
            screen: self.screen.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

/// Counter store whose disk is gone: every call fails.
#[derive(Default)]
pub struct BrokenCounterStore {
    attempts: AtomicUsize,
}

impl BrokenCounterStore {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CounterStore for BrokenCounterStore {
    async fn increment(&self, key: &EventKey) -> Result<u64> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        bail!("disk I/O error incrementing {} on {}", key.event_type.as_str(), key.date)
    }

    async fn read(&self, key: &EventKey) -> Result<u64> {
        bail!("disk I/O error reading {} on {}", key.event_type.as_str(), key.date)
    }

    async fn sum_range(&self, event_type: EventType, start: NaiveDate, end: NaiveDate) -> Result<u64> {
        bail!("disk I/O error summing {} from {start} to {end}", event_type.as_str())
    }
}
