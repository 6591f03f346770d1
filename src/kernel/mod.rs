// Routine table and the cooperative engine that steps it
// Single core, no preemption. The caller owns the loop and the clock;
// poll() runs to completion and callbacks execute inline.

pub mod pattern;
pub mod registry;
pub mod scheduler;
pub mod shared;
pub mod tick;

pub use pattern::{Pattern, Step};
pub use registry::{Callback, RoutineConfig, RoutineRegistry, RoutineStatus, RunMode};
pub use scheduler::{PollSummary, Scheduler};
pub use shared::SharedScheduler;
pub use tick::{TickCounter, TickSource, elapsed_ms};
