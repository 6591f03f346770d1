// Scheduler shared between execution contexts
//
// A Scheduler is plain &mut state. To keep one in a static and touch it
// from both the main loop and an interrupt handler, wrap it here: every
// access runs inside a critical section, and a second borrow while one
// is live (a callback calling back in during poll) comes back as Busy
// instead of iterating a table that is being mutated.
//
// Callbacks run with the critical section held, so keep them short.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::error::SchedulerError;
use crate::kernel::scheduler::{PollSummary, Scheduler};
use crate::kernel::tick::TickSource;

pub struct SharedScheduler<'a, const N: usize> {
    inner: Mutex<RefCell<Scheduler<'a, N>>>,
}

impl<'a, const N: usize> SharedScheduler<'a, N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Scheduler::new())),
        }
    }

    /// Runs `f` with exclusive access to the scheduler.
    pub fn with<R>(&self, f: impl FnOnce(&mut Scheduler<'a, N>) -> R) -> Result<R, SchedulerError> {
        critical_section::with(|cs| {
            let mut sched = self
                .inner
                .borrow(cs)
                .try_borrow_mut()
                .map_err(|_| SchedulerError::Busy)?;
            Ok(f(&mut sched))
        })
    }

    pub fn poll<T: TickSource>(&self, ticks: T) -> Result<PollSummary, SchedulerError> {
        self.with(|sched| sched.poll(ticks))
    }
}

impl<const N: usize> Default for SharedScheduler<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
