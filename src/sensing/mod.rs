pub mod acquisition;
pub mod controller;
pub mod intrinsics;
pub mod loop_worker;
pub mod scheduler;

pub use acquisition::{DetectionCallbacks, DetectionOutcome};
pub use controller::SensingController;
pub use intrinsics::resolve_intrinsics;
pub use loop_worker::{SamplingContext, ATTEMPT_TIMEOUT};
pub use scheduler::{DueAction, Scheduler, SchedulerState, SuspendReason};
