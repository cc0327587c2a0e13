use chrono::Local;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    alert::{evaluate, AlertState},
    distance::estimate,
    host::{CallState, FaceDetector, NotificationSink, ScreenPowerSignal},
    models::{CameraIntrinsics, Sample},
    settings::MonitorConfig,
    stats::EventStore,
};

use super::acquisition::{release, ActiveAcquisition, DetectionCallbacks, DetectionOutcome};
use super::scheduler::{DueAction, Scheduler, SchedulerState};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// How long one attempt may keep the camera open waiting for a face.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(2);

/// Everything the sampling loop reads but does not own.
#[derive(Clone)]
pub struct SamplingContext {
    pub intrinsics: CameraIntrinsics,
    pub detector: Arc<dyn FaceDetector>,
    pub screen: Arc<dyn ScreenPowerSignal>,
    pub notifier: Arc<dyn NotificationSink>,
    pub events: EventStore,
}

/// Drives the scheduler until cancelled. Owns the alert state, the active
/// config and the camera session; nothing else touches them.
pub async fn sampling_loop(
    ctx: SamplingContext,
    mut config_rx: watch::Receiver<MonitorConfig>,
    mut call_rx: mpsc::UnboundedReceiver<CallState>,
    state_tx: watch::Sender<SchedulerState>,
    cancel_token: CancellationToken,
) {
    let (detection_tx, mut detection_rx) = mpsc::unbounded_channel();

    let mut scheduler = Scheduler::new();
    let mut config = *config_rx.borrow_and_update();
    let mut pending_config: Option<MonitorConfig> = None;
    let mut alert_state = AlertState::default();
    let mut acquisition: Option<ActiveAcquisition> = None;
    let mut next_due = Instant::now();

    log_info!(
        "sampling loop started (threshold {} cm, interval {:?})",
        config.distance_threshold_cm,
        config.sampling_interval()
    );

    loop {
        let attempt_deadline = acquisition.as_ref().map(ActiveAcquisition::deadline);

        tokio::select! {
            biased;

            _ = cancel_token.cancelled() => {
                release(&mut acquisition);
                log_info!("sampling loop shutting down");
                break;
            }

            Some(call_state) = call_rx.recv() => match call_state {
                CallState::Active => {
                    release(&mut acquisition);
                    if let Some(generation) = scheduler.on_call_started() {
                        log_info!("call started, abandoned attempt {generation}");
                    } else {
                        log_info!("call started, sampling suspended");
                    }
                }
                CallState::Idle => {
                    if scheduler.on_call_ended() {
                        log_info!("call ended, sampling resumed");
                        next_due = Instant::now() + config.sampling_interval();
                    }
                }
            },

            Ok(()) = config_rx.changed() => {
                // Single slot: only the latest edit survives until the next cycle boundary.
                pending_config = Some(*config_rx.borrow_and_update());
            }

            Some((generation, outcome)) = detection_rx.recv() => {
                if !scheduler.is_current(generation) {
                    log_debug!("dropping late callback for attempt {generation}");
                    continue;
                }

                let faces = match outcome {
                    DetectionOutcome::Faces(faces) if faces.is_empty() => continue,
                    DetectionOutcome::Faces(faces) => faces,
                    DetectionOutcome::Failed(err) => {
                        scheduler.settle(generation);
                        release(&mut acquisition);
                        log_warn!("detector failed on attempt {generation}: {err}");
                        next_due = finish_cycle(&mut config, &mut pending_config);
                        state_tx.send_replace(scheduler.state());
                        continue;
                    }
                };

                scheduler.settle(generation);
                release(&mut acquisition);

                let distance_mm = estimate(&Sample::from_faces(&faces), &ctx.intrinsics);
                match distance_mm {
                    Some(mm) => {
                        log_debug!("attempt {generation}: {mm:.1} mm");
                    }
                    None => {
                        log_debug!("attempt {generation}: face without usable eye geometry");
                    }
                }
                alert_state = apply_reading(&ctx, distance_mm, &config, alert_state).await;
                next_due = finish_cycle(&mut config, &mut pending_config);
            }

            _ = sleep_until(attempt_deadline.unwrap_or(next_due)), if attempt_deadline.is_some() => {
                let generation = acquisition.as_ref().map(ActiveAcquisition::generation);
                release(&mut acquisition);
                if let Some(generation) = generation {
                    scheduler.settle(generation);
                    log_debug!("attempt {generation} timed out after {ATTEMPT_TIMEOUT:?} without a face");
                }
                next_due = finish_cycle(&mut config, &mut pending_config);
            }

            _ = sleep_until(next_due), if scheduler.accepts_due() => {
                apply_pending(&mut config, &mut pending_config);
                let now = Instant::now();

                match scheduler.on_due(ctx.screen.is_screen_on()) {
                    DueAction::Start { generation } => {
                        let callbacks = DetectionCallbacks::new(generation, detection_tx.clone());
                        match ctx.detector.detect_once(callbacks) {
                            Ok(session) => {
                                acquisition = Some(ActiveAcquisition::new(
                                    generation,
                                    now + ATTEMPT_TIMEOUT,
                                    session,
                                ));
                            }
                            Err(err) => {
                                match scheduler.on_acquisition_failed(generation, &err) {
                                    Some(reason) => {
                                        log_warn!("camera acquisition skipped ({reason:?}): {err}");
                                    }
                                    None => {
                                        log_warn!("camera acquisition failed: {err}");
                                    }
                                }
                                next_due = now + config.sampling_interval();
                            }
                        }
                    }
                    DueAction::Skip(reason) => {
                        log_debug!("sample skipped: {reason:?}");
                        next_due = now + config.sampling_interval();
                    }
                    DueAction::Drop => {}
                }
            }
        }

        state_tx.send_replace(scheduler.state());
    }

    state_tx.send_replace(scheduler.state());
}

fn apply_pending(config: &mut MonitorConfig, pending: &mut Option<MonitorConfig>) {
    if let Some(next) = pending.take() {
        if next != *config {
            log_info!(
                "config updated: threshold {} cm, interval {:?}",
                next.distance_threshold_cm,
                next.sampling_interval()
            );
        }
        *config = next;
    }
}

/// Cycle boundary after an attempt settles: swap in pending config, then
/// schedule the next sample.
fn finish_cycle(config: &mut MonitorConfig, pending: &mut Option<MonitorConfig>) -> Instant {
    apply_pending(config, pending);
    Instant::now() + config.sampling_interval()
}

async fn apply_reading(
    ctx: &SamplingContext,
    distance_mm: Option<f32>,
    config: &MonitorConfig,
    current: AlertState,
) -> AlertState {
    let (next, transition) = evaluate(distance_mm, config.distance_threshold_cm, current);

    if let Some(transition) = transition {
        if let Some(event_type) = transition.event_type() {
            let today = Local::now().date_naive();
            if let Err(err) = ctx.events.record(event_type, today).await {
                log_error!("failed to record {} event: {err:?}", event_type.as_str());
            }
        }

        let (kind, message) = transition.notification();
        ctx.notifier.notify(kind, &message);
    }

    next
}
