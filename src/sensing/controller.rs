use anyhow::{bail, Context, Result};
use log::{info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::host::CallState;
use crate::settings::MonitorConfig;

use super::loop_worker::{sampling_loop, SamplingContext};
use super::scheduler::SchedulerState;

/// Starts and stops the sampling loop and forwards call-state pushes to it.
pub struct SensingController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    call_tx: Option<mpsc::UnboundedSender<CallState>>,
    state_rx: watch::Receiver<SchedulerState>,
}

impl SensingController {
    pub fn new() -> Self {
        let (_, state_rx) = watch::channel(SchedulerState::Idle);
        Self {
            handle: None,
            cancel_token: None,
            call_tx: None,
            state_rx,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start_sensing(
        &mut self,
        ctx: SamplingContext,
        config_rx: watch::Receiver<MonitorConfig>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("sensing already active");
        }

        let cancel_token = CancellationToken::new();
        let (call_tx, call_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);

        let handle = tokio::spawn(sampling_loop(
            ctx,
            config_rx,
            call_rx,
            state_tx,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.call_tx = Some(call_tx);
        self.state_rx = state_rx;
        Ok(())
    }

    pub fn on_call_state_changed(&self, state: CallState) {
        match &self.call_tx {
            Some(tx) => {
                if tx.send(state).is_err() {
                    warn!("sampling loop gone; dropped call state {state:?}");
                }
            }
            None => info!("call state {state:?} received while sensing is stopped"),
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state_rx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SchedulerState> {
        self.state_rx.clone()
    }

    /// Cancels the loop and waits for it to release the camera. Safe to call
    /// when already stopped.
    pub async fn stop_sensing(&mut self) -> Result<()> {
        self.call_tx = None;

        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("sampling loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for SensingController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::sensing::resolve_intrinsics;
    use crate::simulated::SimulatedHost;
    use crate::stats::{EventStore, MemoryCounterStore};

    fn context(host: &Arc<SimulatedHost>) -> SamplingContext {
        SamplingContext {
            intrinsics: resolve_intrinsics(host.as_ref()).unwrap(),
            detector: host.clone(),
            screen: host.clone(),
            notifier: host.clone(),
            events: EventStore::new(Arc::new(MemoryCounterStore::new())),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_is_rejected_and_stop_is_repeatable() {
        let host = Arc::new(SimulatedHost::new(3));
        let (_config_tx, config_rx) = watch::channel(MonitorConfig::default());
        let mut controller = SensingController::new();
        assert!(!controller.is_active());

        controller
            .start_sensing(context(&host), config_rx.clone())
            .unwrap();
        assert!(controller.is_active());
        assert!(controller.start_sensing(context(&host), config_rx).is_err());

        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        controller.stop_sensing().await.unwrap();
        assert!(!controller.is_active());
        assert_eq!(host.live_sessions(), 0);

        controller.stop_sensing().await.unwrap();
        controller.on_call_state_changed(CallState::Active);
    }
}
