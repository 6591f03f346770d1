// Compile-time configuration
//
// Capacity is a const generic on the scheduler; these are the defaults
// a board crate gets without picking its own.

use crate::kernel::Scheduler;

/// Routines a default scheduler can hold at once.
pub const DEFAULT_CAPACITY: usize = 10;

pub type DefaultScheduler<'a> = Scheduler<'a, DEFAULT_CAPACITY>;
