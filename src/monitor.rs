use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info};
use tokio::sync::watch;

use crate::{
    host::{CallState, CameraCatalog, FaceDetector, NotificationSink, ScreenPowerSignal},
    models::CameraIntrinsics,
    sensing::{resolve_intrinsics, SamplingContext, SchedulerState, SensingController},
    settings::SettingsStore,
    stats::{CounterStore, EventStore, StatsAggregator},
    timer::{ScreenOnCounter, ScreenOnTracker},
};

/// Collaborators supplied by the host environment.
#[derive(Clone)]
pub struct MonitorHost {
    pub cameras: Arc<dyn CameraCatalog>,
    pub detector: Arc<dyn FaceDetector>,
    pub screen: Arc<dyn ScreenPowerSignal>,
    pub notifier: Arc<dyn NotificationSink>,
}

/// The running monitoring core: the sampling loop and the screen-on ticker
/// sharing one event store.
pub struct MonitorCore {
    intrinsics: CameraIntrinsics,
    sensing: SensingController,
    tracker: ScreenOnTracker,
    stats: StatsAggregator,
    running_tx: watch::Sender<bool>,
}

impl MonitorCore {
    /// Resolves the camera intrinsics and starts both periodic activities.
    /// Fails without starting anything if the intrinsics are unavailable;
    /// the underlying `MonitorError` can be recovered with `downcast_ref`.
    pub async fn start(
        host: MonitorHost,
        settings: &SettingsStore,
        counters: Arc<dyn CounterStore>,
    ) -> Result<Self> {
        Self::start_with_tracker(host, settings, counters, |tracker| tracker).await
    }

    /// Like `start`, letting the caller adjust the screen-on tracker before
    /// it begins ticking.
    pub async fn start_with_tracker(
        host: MonitorHost,
        settings: &SettingsStore,
        counters: Arc<dyn CounterStore>,
        configure: impl FnOnce(ScreenOnTracker) -> ScreenOnTracker,
    ) -> Result<Self> {
        let intrinsics = resolve_intrinsics(host.cameras.as_ref())
            .context("cannot estimate distance without front camera intrinsics")?;
        info!(
            "front camera: focal {} mm, sensor {}x{} mm",
            intrinsics.focal_length_mm, intrinsics.sensor_width_mm, intrinsics.sensor_height_mm
        );

        let events = EventStore::new(counters);

        let mut sensing = SensingController::new();
        sensing.start_sensing(
            SamplingContext {
                intrinsics,
                detector: host.detector.clone(),
                screen: host.screen.clone(),
                notifier: host.notifier.clone(),
                events: events.clone(),
            },
            settings.subscribe(),
        )?;

        let tracker = configure(ScreenOnTracker::new(
            host.screen.clone(),
            host.notifier.clone(),
            events.clone(),
        ));
        tracker.start().await;

        let (running_tx, _) = watch::channel(true);
        info!("monitoring core started");

        Ok(Self {
            intrinsics,
            sensing,
            tracker,
            stats: StatsAggregator::new(events),
            running_tx,
        })
    }

    pub fn intrinsics(&self) -> CameraIntrinsics {
        self.intrinsics
    }

    /// Push entry point for the host's telephony signal.
    pub fn on_call_state_changed(&self, state: CallState) {
        self.sensing.on_call_state_changed(state);
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.sensing.state()
    }

    pub fn subscribe_scheduler_state(&self) -> watch::Receiver<SchedulerState> {
        self.sensing.subscribe_state()
    }

    pub fn screen_on(&self) -> ScreenOnCounter {
        self.tracker.snapshot()
    }

    pub fn stats(&self) -> StatsAggregator {
        self.stats.clone()
    }

    pub fn is_running(&self) -> bool {
        *self.running_tx.borrow()
    }

    /// Running flag for a host status control.
    pub fn subscribe_running(&self) -> watch::Receiver<bool> {
        self.running_tx.subscribe()
    }

    /// Stops both activities and waits until the camera is released.
    pub async fn shutdown(mut self) -> Result<()> {
        let sensing_result = self.sensing.stop_sensing().await;
        let tracker_result = self.tracker.stop().await;
        self.running_tx.send_replace(false);

        if let Err(err) = &sensing_result {
            error!("sampling loop did not stop cleanly: {err:?}");
        }
        if let Err(err) = &tracker_result {
            error!("screen-on ticker did not stop cleanly: {err:?}");
        }
        info!("monitoring core stopped");

        sensing_result.and(tracker_result)
    }
}
