use serde::Serialize;

use crate::error::MonitorError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SuspendReason {
    ScreenOff,
    InCall,
    CameraBusy,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "state", content = "reason")]
pub enum SchedulerState {
    Idle,
    Sampling,
    Suspended(SuspendReason),
}

impl Default for SchedulerState {
    fn default() -> Self {
        SchedulerState::Idle
    }
}

/// What to do with a sample that just came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueAction {
    /// Open the camera for a new attempt tagged `generation`.
    Start { generation: u64 },
    /// Skip this sample and try again after the interval.
    Skip(SuspendReason),
    /// An attempt is already in flight.
    Drop,
}

/// Scheduler state machine. Holds no resources; the sampling loop applies
/// its decisions to the camera.
///
/// `Suspended(ScreenOff)` lasts until the next due sample finds the screen
/// on. `Suspended(InCall)` lasts until the call ends.
#[derive(Debug, Default)]
pub struct Scheduler {
    state: SchedulerState,
    generation: u64,
    in_flight: Option<u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Whether a due timer should be armed in the current state.
    pub fn accepts_due(&self) -> bool {
        matches!(
            self.state,
            SchedulerState::Idle | SchedulerState::Suspended(SuspendReason::ScreenOff)
        )
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.in_flight == Some(generation)
    }

    pub fn on_due(&mut self, screen_on: bool) -> DueAction {
        match self.state {
            SchedulerState::Sampling => DueAction::Drop,
            SchedulerState::Suspended(SuspendReason::InCall) => {
                DueAction::Skip(SuspendReason::InCall)
            }
            _ if !screen_on => {
                self.state = SchedulerState::Suspended(SuspendReason::ScreenOff);
                DueAction::Skip(SuspendReason::ScreenOff)
            }
            _ => {
                self.generation = self.generation.wrapping_add(1);
                self.in_flight = Some(self.generation);
                self.state = SchedulerState::Sampling;
                DueAction::Start {
                    generation: self.generation,
                }
            }
        }
    }

    /// Settles the attempt tagged `generation` (result, timeout or failure).
    /// Returns false for anything but the first settlement of the attempt in
    /// flight.
    pub fn settle(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.in_flight = None;
        self.state = SchedulerState::Idle;
        true
    }

    /// The camera could not be opened for `generation`. Back to `Idle`.
    /// Returns `CameraBusy` only when another client holds the camera; other
    /// failures are plain skips with no reason.
    pub fn on_acquisition_failed(
        &mut self,
        generation: u64,
        err: &MonitorError,
    ) -> Option<SuspendReason> {
        let settled = self.settle(generation);
        (settled && *err == MonitorError::CameraBusy).then_some(SuspendReason::CameraBusy)
    }

    /// Returns the generation that was in flight, which the caller must
    /// already have torn down.
    pub fn on_call_started(&mut self) -> Option<u64> {
        self.state = SchedulerState::Suspended(SuspendReason::InCall);
        self.in_flight.take()
    }

    /// Returns true when scheduling should resume.
    pub fn on_call_ended(&mut self) -> bool {
        if self.state == SchedulerState::Suspended(SuspendReason::InCall) {
            self.state = SchedulerState::Idle;
            true
        } else {
            false
        }
    }
}
