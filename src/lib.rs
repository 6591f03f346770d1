// String-defined call routines for super-loop firmware
//
// A routine is a pattern like ".CC..." stepped at a fixed rate: 'C'
// calls the routine's callback, '.' waits. Register routines, start
// them, and call Scheduler::poll from the main loop with a millisecond
// tick source.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod kernel;

pub use config::{DEFAULT_CAPACITY, DefaultScheduler};
pub use error::{ConfigError, SchedulerError};
pub use kernel::{
    Callback, PollSummary, RoutineConfig, RoutineStatus, RunMode, Scheduler, SharedScheduler,
    TickCounter, TickSource,
};
