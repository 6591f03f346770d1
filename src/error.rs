// Status taxonomy for registry and scheduler calls
//
// Every failure is reported before any state is written, so an Err
// always means "nothing changed".

use core::fmt;

/// Why a routine configuration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Identifier is empty.
    MissingId,
    /// Step duration of 0 ms.
    ZeroStepDuration,
    /// Pattern has no steps.
    EmptyPattern,
    /// Character outside the step alphabet, at byte `index`.
    InvalidStep { index: usize, found: char },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingId => write!(f, "routine id is empty"),
            ConfigError::ZeroStepDuration => write!(f, "step duration must be at least 1 ms"),
            ConfigError::EmptyPattern => write!(f, "pattern is empty"),
            ConfigError::InvalidStep { index, found } => {
                write!(f, "invalid step {:?} at index {}", found, index)
            }
        }
    }
}

impl core::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// Empty identifier handed to an operation on an existing routine.
    NullArgument,
    InvalidConfig(ConfigError),
    /// Another registered routine already uses this identifier.
    AlreadyExists,
    /// Every slot is taken.
    StorageFull,
    /// No registered routine has this identifier.
    NotFound,
    /// Bounded start asked for zero cycles.
    InvalidUsage,
    /// Shared scheduler is already borrowed, e.g. a callback re-entering
    /// it during `poll`.
    Busy,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::NullArgument => write!(f, "empty routine id"),
            SchedulerError::InvalidConfig(e) => write!(f, "invalid routine config: {}", e),
            SchedulerError::AlreadyExists => write!(f, "routine id already registered"),
            SchedulerError::StorageFull => write!(f, "routine storage full"),
            SchedulerError::NotFound => write!(f, "routine not found"),
            SchedulerError::InvalidUsage => write!(f, "cycle count must be at least 1"),
            SchedulerError::Busy => write!(f, "scheduler already in use"),
        }
    }
}

impl core::error::Error for SchedulerError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            SchedulerError::InvalidConfig(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SchedulerError {
    fn from(e: ConfigError) -> Self {
        SchedulerError::InvalidConfig(e)
    }
}
