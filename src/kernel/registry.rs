// Fixed-capacity routine table
//
// NOTE: No dynamic allocation. N slots, first-fit on create, slot order
// is the evaluation order in poll. Ids are matched by content.
//
// Each slot holds the routine's immutable config (id, pattern, step
// duration, callback) next to its run-state (enabled, mode, cursor,
// last tick). Nothing else keeps routine data.

use core::fmt;

use log::{debug, warn};

use crate::error::{ConfigError, SchedulerError};
use crate::kernel::pattern::Pattern;

pub type Callback<'a> = &'a mut (dyn FnMut() + Send + 'a);

/// Everything needed to register a routine.
pub struct RoutineConfig<'a> {
    pub id: &'a str,
    /// One step per character, see [`crate::kernel::pattern`].
    pub pattern: &'a str,
    /// Duration of every step, in ms.
    pub step_ms: u32,
    pub callback: Callback<'a>,
}

impl<'a> RoutineConfig<'a> {
    pub fn new(id: &'a str, pattern: &'a str, step_ms: u32, callback: Callback<'a>) -> Self {
        Self {
            id,
            pattern,
            step_ms,
            callback,
        }
    }
}

impl fmt::Debug for RoutineConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutineConfig")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("step_ms", &self.step_ms)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Infinite,
    /// Cycles left, counting the one in progress.
    Cycles(u16),
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Infinite => write!(f, "Infinite"),
            RunMode::Cycles(n) => write!(f, "Cycles({})", n),
        }
    }
}

/// Copy of one routine's run-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutineStatus {
    pub enabled: bool,
    /// `None` until the routine is started for the first time.
    pub mode: Option<RunMode>,
    /// Next step index; equal to the pattern length right after the
    /// last step of a cycle.
    pub cursor: usize,
    pub last_tick: u32,
}

pub(crate) struct Routine<'a> {
    pub(crate) id: &'a str,
    pub(crate) pattern: Pattern<'a>,
    pub(crate) step_ms: u32,
    pub(crate) callback: Callback<'a>,

    pub(crate) enabled: bool,
    pub(crate) mode: Option<RunMode>,
    pub(crate) cursor: usize,
    pub(crate) last_tick: u32,
}

impl Routine<'_> {
    fn status(&self) -> RoutineStatus {
        RoutineStatus {
            enabled: self.enabled,
            mode: self.mode,
            cursor: self.cursor,
            last_tick: self.last_tick,
        }
    }
}

pub struct RoutineRegistry<'a, const N: usize> {
    slots: [Option<Routine<'a>>; N],
    len: usize,
}

impl<'a, const N: usize> RoutineRegistry<'a, N> {
    pub const fn new() -> Self {
        Self {
            slots: [const { None }; N],
            len: 0,
        }
    }

    /// Registers a routine, disabled, with its cursor at the first step.
    ///
    /// All checks run before the table is touched: on `Err` the registry
    /// is unchanged.
    pub fn create(&mut self, config: RoutineConfig<'a>) -> Result<(), SchedulerError> {
        let RoutineConfig {
            id,
            pattern,
            step_ms,
            callback,
        } = config;

        if id.is_empty() {
            warn!("routine: rejected config with empty id");
            return Err(ConfigError::MissingId.into());
        }
        if self.position(id).is_some() {
            return Err(SchedulerError::AlreadyExists);
        }
        if step_ms == 0 {
            warn!("routine: {:?} rejected, zero step duration", id);
            return Err(ConfigError::ZeroStepDuration.into());
        }
        let pattern = Pattern::parse(pattern).inspect_err(|e| {
            warn!("routine: {:?} rejected, {}", id, e);
        })?;

        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            warn!("routine: {:?} rejected, storage full ({} slots)", id, N);
            return Err(SchedulerError::StorageFull);
        };

        self.slots[slot] = Some(Routine {
            id,
            pattern,
            step_ms,
            callback,
            enabled: false,
            mode: None,
            cursor: 0,
            last_tick: 0,
        });
        self.len += 1;
        debug!(
            "routine: created {:?} in slot {} ({} steps x {}ms)",
            id,
            slot,
            pattern.len(),
            step_ms
        );
        Ok(())
    }

    /// Frees the routine's slot; the id can be registered again.
    pub fn clear(&mut self, id: &str) -> Result<(), SchedulerError> {
        let slot = self.find(id)?;
        self.slots[slot] = None;
        self.len -= 1;
        debug!("routine: cleared {:?} from slot {}", id, slot);
        Ok(())
    }

    pub fn clear_all(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.len = 0;
        debug!("routine: cleared all");
    }

    /// Runs the routine until stopped.
    ///
    /// Cursor and timestamp are kept, so a stopped routine resumes where
    /// it left off.
    pub fn start_infinite(&mut self, id: &str) -> Result<(), SchedulerError> {
        let routine = self.get_mut(id)?;
        routine.enabled = true;
        routine.mode = Some(RunMode::Infinite);
        debug!("routine: started {:?} (infinite)", id);
        Ok(())
    }

    /// Runs the routine for `n` complete cycles, then disables it.
    ///
    /// Same resume rule as [`Self::start_infinite`]; calling this on a
    /// running routine re-arms the count.
    pub fn start_for_n_cycles(&mut self, id: &str, n: u16) -> Result<(), SchedulerError> {
        if id.is_empty() {
            return Err(SchedulerError::NullArgument);
        }
        if n == 0 {
            return Err(SchedulerError::InvalidUsage);
        }
        let routine = self.get_mut(id)?;
        routine.enabled = true;
        routine.mode = Some(RunMode::Cycles(n));
        debug!("routine: started {:?} for {} cycles", id, n);
        Ok(())
    }

    pub fn stop(&mut self, id: &str) -> Result<(), SchedulerError> {
        let routine = self.get_mut(id)?;
        routine.enabled = false;
        debug!("routine: stopped {:?} at step {}", id, routine.cursor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn is_enabled(&self, id: &str) -> Result<bool, SchedulerError> {
        self.status(id).map(|s| s.enabled)
    }

    pub fn status(&self, id: &str) -> Result<RoutineStatus, SchedulerError> {
        let slot = self.find(id)?;
        self.slots[slot]
            .as_ref()
            .map(Routine::status)
            .ok_or(SchedulerError::NotFound)
    }

    /// Registered ids in slot order.
    pub fn ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.slots.iter().flatten().map(|r| r.id)
    }

    pub(crate) fn routines_mut(&mut self) -> impl Iterator<Item = &mut Routine<'a>> {
        self.slots.iter_mut().flatten()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|r| r.id == id))
    }

    fn find(&self, id: &str) -> Result<usize, SchedulerError> {
        if id.is_empty() {
            return Err(SchedulerError::NullArgument);
        }
        self.position(id).ok_or(SchedulerError::NotFound)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Routine<'a>, SchedulerError> {
        let slot = self.find(id)?;
        self.slots[slot].as_mut().ok_or(SchedulerError::NotFound)
    }
}

impl<const N: usize> Default for RoutineRegistry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
