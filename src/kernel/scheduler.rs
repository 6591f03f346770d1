// Cooperative step scheduler for string-defined routines
// NOTE: No dynamic allocation, fixed-size routine table (see registry)
//
// poll() is the whole engine. Call it from the super-loop as often as
// the finest step duration needs; each call visits every enabled
// routine once, in slot order, and takes at most one step per routine:
//
//   elapsed = now - last_tick (wrapping)
//   elapsed <  step_ms  -> nothing
//   elapsed >= step_ms  -> wrap cursor if at end, take the step under
//                          the cursor, count a finished cycle, fire the
//                          callback on 'C', re-anchor last_tick
//
// last_tick is re-read after the callback, so a slow callback pushes
// that routine's next step back rather than making it fire early.
// A skipped poll is not caught up: cadence drifts by the lateness.
//
// Callbacks run inline on the caller's stack. One that never returns
// stalls every routine.

use core::fmt;

use log::{debug, trace};

use crate::error::SchedulerError;
use crate::kernel::pattern::Step;
use crate::kernel::registry::{Routine, RoutineConfig, RoutineRegistry, RoutineStatus, RunMode};
use crate::kernel::tick::{TickSource, elapsed_ms};

/// What a single [`Scheduler::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollSummary {
    /// Routines that took a step.
    pub due: usize,
    /// Callbacks invoked.
    pub fired: usize,
}

impl fmt::Display for PollSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} due, {} fired", self.due, self.fired)
    }
}

impl Routine<'_> {
    #[inline]
    fn is_due(&self, now: u32) -> bool {
        elapsed_ms(self.last_tick, now) >= self.step_ms
    }

    // Take the step under the cursor. Returns the step taken.
    fn advance(&mut self) -> Step {
        if self.cursor >= self.pattern.len() {
            self.cursor = 0;
        }
        // parsed patterns only hold alphabet bytes
        let step = self.pattern.step(self.cursor).unwrap_or(Step::Wait);
        self.cursor += 1;

        if self.cursor == self.pattern.len() {
            self.finish_cycle();
        }
        step
    }

    fn finish_cycle(&mut self) {
        if let Some(RunMode::Cycles(left)) = self.mode {
            let left = left.saturating_sub(1);
            self.mode = Some(RunMode::Cycles(left));
            if left == 0 {
                self.enabled = false;
                debug!("sched: {:?} finished its last cycle", self.id);
            }
        }
    }
}

// The routine scheduler: a routine table plus the engine that steps it.
pub struct Scheduler<'a, const N: usize> {
    routines: RoutineRegistry<'a, N>,
}

impl<'a, const N: usize> Scheduler<'a, N> {
    pub const fn new() -> Self {
        Self {
            routines: RoutineRegistry::new(),
        }
    }

    /// Advances every enabled routine whose step is due.
    pub fn poll<T: TickSource>(&mut self, mut ticks: T) -> PollSummary {
        let mut summary = PollSummary::default();

        for routine in self.routines.routines_mut() {
            if !routine.enabled {
                continue;
            }
            if !routine.is_due(ticks.now_ms()) {
                continue;
            }

            let at = routine.cursor;
            let step = routine.advance();
            summary.due += 1;
            trace!("sched: {:?} step {} -> {}", routine.id, at, step);

            if step.fires() {
                (routine.callback)();
                summary.fired += 1;
            }

            routine.last_tick = ticks.now_ms();
        }

        summary
    }

    pub fn create(&mut self, config: RoutineConfig<'a>) -> Result<(), SchedulerError> {
        self.routines.create(config)
    }

    pub fn clear(&mut self, id: &str) -> Result<(), SchedulerError> {
        self.routines.clear(id)
    }

    pub fn clear_all(&mut self) {
        self.routines.clear_all()
    }

    pub fn start_infinite(&mut self, id: &str) -> Result<(), SchedulerError> {
        self.routines.start_infinite(id)
    }

    pub fn start_for_n_cycles(&mut self, id: &str, n: u16) -> Result<(), SchedulerError> {
        self.routines.start_for_n_cycles(id, n)
    }

    pub fn stop(&mut self, id: &str) -> Result<(), SchedulerError> {
        self.routines.stop(id)
    }

    pub fn status(&self, id: &str) -> Result<RoutineStatus, SchedulerError> {
        self.routines.status(id)
    }

    pub fn registry(&self) -> &RoutineRegistry<'a, N> {
        &self.routines
    }
}

impl<const N: usize> Default for Scheduler<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    // one simulated millisecond per poll, starting at `from + 1`
    fn run_ms<const N: usize>(sched: &mut Scheduler<'_, N>, from: u32, polls: u32) -> u32 {
        let mut tick = from;
        for _ in 0..polls {
            tick = tick.wrapping_add(1);
            sched.poll(|| tick);
        }
        tick
    }

    #[test]
    fn fires_every_step() {
        let hits = AtomicU32::new(0);
        let mut cb = || {
            hits.fetch_add(1, Ordering::Relaxed);
        };
        let mut sched: Scheduler<'_, 4> = Scheduler::new();
        sched
            .create(RoutineConfig::new("green led", "C", 1, &mut cb))
            .unwrap();
        sched.start_infinite("green led").unwrap();

        run_ms(&mut sched, 0, 100);
        assert_eq!(hits.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn fires_every_step_with_delay() {
        let hits = AtomicU32::new(0);
        let mut cb = || {
            hits.fetch_add(1, Ordering::Relaxed);
        };
        let mut sched: Scheduler<'_, 4> = Scheduler::new();
        sched
            .create(RoutineConfig::new("green led", "C", 100, &mut cb))
            .unwrap();
        sched.start_infinite("green led").unwrap();

        run_ms(&mut sched, 0, 100 * 100);
        assert_eq!(hits.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn cursor_lands_on_pattern_start_after_full_cycle() {
        let hits = AtomicU32::new(0);
        let mut cb = || {
            hits.fetch_add(1, Ordering::Relaxed);
        };
        let mut sched: Scheduler<'_, 4> = Scheduler::new();
        sched
            .create(RoutineConfig::new(
                "green led",
                "C...CC....CC........",
                100,
                &mut cb,
            ))
            .unwrap();
        sched.start_infinite("green led").unwrap();

        run_ms(&mut sched, 0, 100 * 20);
        assert_eq!(hits.load(Ordering::Relaxed), 5);
        assert_eq!(sched.status("green led").unwrap().cursor, 20);

        // long gap: only one step is taken, and it is the first 'C'
        let summary = sched.poll(|| 10_000);
        assert_eq!(summary, PollSummary { due: 1, fired: 1 });
        assert_eq!(hits.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn sparse_pattern_fires_once_per_cycle() {
        let hits = AtomicU32::new(0);
        let mut cb = || {
            hits.fetch_add(1, Ordering::Relaxed);
        };
        let mut sched: Scheduler<'_, 4> = Scheduler::new();
        sched
            .create(RoutineConfig::new("green led", "C...", 100, &mut cb))
            .unwrap();
        sched.start_infinite("green led").unwrap();

        run_ms(&mut sched, 0, 10_000);
        assert_eq!(hits.load(Ordering::Relaxed), 25);
    }

    #[test]
    fn bounded_run_fires_once_per_cycle_then_disables() {
        let hits = AtomicU32::new(0);
        let mut cb = || {
            hits.fetch_add(1, Ordering::Relaxed);
        };
        let mut sched: Scheduler<'_, 4> = Scheduler::new();
        sched
            .create(RoutineConfig::new("green led", "C...", 10, &mut cb))
            .unwrap();
        sched.start_for_n_cycles("green led", 10).unwrap();

        run_ms(&mut sched, 0, 10_000);
        assert_eq!(hits.load(Ordering::Relaxed), 10);
        assert_eq!(
            sched.status("green led"),
            Ok(RoutineStatus {
                enabled: false,
                mode: Some(RunMode::Cycles(0)),
                cursor: 4,
                last_tick: 400,
            })
        );
    }

    #[test]
    fn disables_right_after_last_step_of_last_cycle() {
        let hits = AtomicU32::new(0);
        let mut cb = || {
            hits.fetch_add(1, Ordering::Relaxed);
        };
        let mut sched: Scheduler<'_, 2> = Scheduler::new();
        sched
            .create(RoutineConfig::new("tail", "..C", 10, &mut cb))
            .unwrap();
        sched.start_for_n_cycles("tail", 2).unwrap();

        // five steps in: 10, 20, 30 | 40, 50
        let tick = run_ms(&mut sched, 0, 50);
        assert!(sched.registry().is_enabled("tail").unwrap());
        assert_eq!(hits.load(Ordering::Relaxed), 1);

        // sixth step is the final 'C'
        run_ms(&mut sched, tick, 10);
        assert!(!sched.registry().is_enabled("tail").unwrap());
        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn disabled_routines_are_not_touched() {
        let mut cb = || {};
        let mut sched: Scheduler<'_, 2> = Scheduler::new();
        sched
            .create(RoutineConfig::new("idle", "C.", 1, &mut cb))
            .unwrap();

        let summary = sched.poll(|| 1_000);
        assert_eq!(summary, PollSummary::default());
        assert_eq!(sched.status("idle").unwrap().last_tick, 0);
    }

    #[test]
    fn not_due_leaves_state_alone() {
        let mut cb = || {};
        let mut sched: Scheduler<'_, 2> = Scheduler::new();
        sched
            .create(RoutineConfig::new("slow", "C.", 50, &mut cb))
            .unwrap();
        sched.start_infinite("slow").unwrap();

        assert_eq!(sched.poll(|| 49), PollSummary::default());
        let status = sched.status("slow").unwrap();
        assert_eq!((status.cursor, status.last_tick), (0, 0));

        assert_eq!(sched.poll(|| 50), PollSummary { due: 1, fired: 1 });
    }

    #[test]
    fn timestamp_is_read_after_callback() {
        let mut clock = 0u32;
        let mut cb = || {};
        let mut sched: Scheduler<'_, 2> = Scheduler::new();
        sched
            .create(RoutineConfig::new("led", "C", 10, &mut cb))
            .unwrap();
        sched.start_infinite("led").unwrap();

        // every read advances the clock by 3
        clock += 10;
        sched.poll(|| {
            clock += 3;
            clock
        });
        assert_eq!(sched.status("led").unwrap().last_tick, 16);
    }
}
