use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use log::error;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    host::{NotificationKind, NotificationSink, ScreenPowerSignal},
    models::EventType,
    stats::EventStore,
};

use super::ScreenOnCounter;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Polls the screen once a second and sends a break reminder after every
/// full threshold of continuous screen-on time.
#[derive(Clone)]
pub struct ScreenOnTracker {
    screen: Arc<dyn ScreenPowerSignal>,
    notifier: Arc<dyn NotificationSink>,
    events: EventStore,
    ticker: Arc<Mutex<Option<Ticker>>>,
    snapshot_tx: Arc<watch::Sender<ScreenOnCounter>>,
    tick_interval: Duration,
    threshold_secs: u32,
}

impl ScreenOnTracker {
    pub fn new(
        screen: Arc<dyn ScreenPowerSignal>,
        notifier: Arc<dyn NotificationSink>,
        events: EventStore,
    ) -> Self {
        let counter = ScreenOnCounter::new();
        let (snapshot_tx, _) = watch::channel(counter);

        Self {
            screen,
            notifier,
            events,
            ticker: Arc::new(Mutex::new(None)),
            snapshot_tx: Arc::new(snapshot_tx),
            tick_interval: TICK_INTERVAL,
            threshold_secs: counter.threshold_secs(),
        }
    }

    /// Shorter reminder threshold, for hosts that let the user pick one.
    pub fn with_threshold_secs(mut self, threshold_secs: u32) -> Self {
        self.threshold_secs = threshold_secs;
        self
    }

    pub fn snapshot(&self) -> ScreenOnCounter {
        *self.snapshot_tx.borrow()
    }

    pub async fn is_running(&self) -> bool {
        self.ticker.lock().await.is_some()
    }

    /// Restarts from zero if already running.
    pub async fn start(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(previous) = ticker_guard.take() {
            previous.cancel_token.cancel();
            if let Err(err) = previous.handle.await {
                error!("screen-on ticker failed to join: {err}");
            }
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(
            self.screen.clone(),
            self.notifier.clone(),
            self.events.clone(),
            self.snapshot_tx.clone(),
            ScreenOnCounter::with_threshold(self.threshold_secs),
            self.tick_interval,
            cancel_token.clone(),
        ));

        *ticker_guard = Some(Ticker {
            handle,
            cancel_token,
        });
    }

    /// Cancels the ticker and waits for it to exit.
    pub async fn stop(&self) -> Result<()> {
        let Some(ticker) = self.ticker.lock().await.take() else {
            return Ok(());
        };
        ticker.cancel_token.cancel();
        ticker
            .handle
            .await
            .context("screen-on ticker task failed to join")
    }
}

async fn tick_loop(
    screen: Arc<dyn ScreenPowerSignal>,
    notifier: Arc<dyn NotificationSink>,
    events: EventStore,
    snapshot_tx: Arc<watch::Sender<ScreenOnCounter>>,
    mut counter: ScreenOnCounter,
    tick_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut interval = time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    snapshot_tx.send_replace(counter);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = interval.tick() => {
                if let Some(duration_secs) = counter.tick(screen.is_screen_on()) {
                    warn_fatigue(&events, notifier.as_ref(), duration_secs).await;
                }
                snapshot_tx.send_replace(counter);
            }
        }
    }
}

async fn warn_fatigue(events: &EventStore, notifier: &dyn NotificationSink, duration_secs: u32) {
    let today = Local::now().date_naive();
    if let Err(err) = events.record(EventType::ProlongedScreenOn, today).await {
        error!("failed to record prolonged screen-on event: {err:?}");
    }

    let minutes = duration_secs / 60;
    notifier.notify(
        NotificationKind::FatigueWarning,
        &format!("The screen has been on for {minutes} minutes. Take a break to rest your eyes."),
    );
}
