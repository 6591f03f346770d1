// Step patterns: one character per fixed-duration time slot
//
//   'C'  fire the routine callback, then wait one step
//   '.'  wait one step
//   'c'  muted call, waits like '.'; keeps a pattern's shape while a
//        beat is switched off
//
// Validated once at creation. Only ASCII is accepted, so byte index ==
// step index and the cursor never lands inside a code point.

use core::fmt;

use crate::error::ConfigError;

pub const FIRE: u8 = b'C';
pub const WAIT: u8 = b'.';
pub const MUTED: u8 = b'c';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fire,
    Wait,
}

impl Step {
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            FIRE => Some(Step::Fire),
            WAIT | MUTED => Some(Step::Wait),
            _ => None,
        }
    }

    #[inline]
    pub const fn fires(self) -> bool {
        matches!(self, Step::Fire)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Fire => write!(f, "Fire"),
            Step::Wait => write!(f, "Wait"),
        }
    }
}

/// A validated, borrowed step pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern<'a> {
    raw: &'a str,
}

impl<'a> Pattern<'a> {
    /// Checks every character against the step alphabet.
    ///
    /// Reports the first offending character with its position.
    pub fn parse(raw: &'a str) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }
        for (index, found) in raw.char_indices() {
            let known = found.is_ascii() && Step::from_byte(found as u8).is_some();
            if !known {
                return Err(ConfigError::InvalidStep { index, found });
            }
        }
        Ok(Self { raw })
    }

    // patterns are non-empty once parsed
    #[allow(clippy::len_without_is_empty)]
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn step(&self, index: usize) -> Option<Step> {
        self.raw.as_bytes().get(index).copied().and_then(Step::from_byte)
    }

    pub fn steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.raw.bytes().filter_map(Step::from_byte)
    }

    pub fn fire_count(&self) -> usize {
        self.steps().filter(|s| s.fires()).count()
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }
}

impl fmt::Display for Pattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}
