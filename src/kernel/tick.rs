// Millisecond tick sources
//
// The scheduler never owns a clock; each poll is handed one. Anything
// returning a u32 millisecond count works: a HAL getter, a closure over
// a simulated clock, or TickCounter below advanced from a timer ISR.
// Counters are allowed to wrap; elapsed time is modular.

use core::cell::Cell;

use critical_section::Mutex;

pub trait TickSource {
    fn now_ms(&mut self) -> u32;
}

impl<F> TickSource for F
where
    F: FnMut() -> u32,
{
    #[inline]
    fn now_ms(&mut self) -> u32 {
        self()
    }
}

impl TickSource for &TickCounter {
    #[inline]
    fn now_ms(&mut self) -> u32 {
        self.now()
    }
}

// Milliseconds from `then` to `now`, correct across one u32 wrap.
#[inline]
pub const fn elapsed_ms(then: u32, now: u32) -> u32 {
    now.wrapping_sub(then)
}

/// Uptime counter shared between a timer interrupt and the main loop.
///
/// cs: targets like riscv32imc have no atomic add, so the
/// read-modify-write happens inside a critical section.
pub struct TickCounter {
    ms: Mutex<Cell<u32>>,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            ms: Mutex::new(Cell::new(0)),
        }
    }

    // call from the timer ISR
    #[inline]
    pub fn advance(&self, ms: u32) {
        critical_section::with(|cs| {
            let ticks = self.ms.borrow(cs);
            ticks.set(ticks.get().wrapping_add(ms));
        });
    }

    pub fn now(&self) -> u32 {
        critical_section::with(|cs| self.ms.borrow(cs).get())
    }

    pub fn set(&self, ms: u32) {
        critical_section::with(|cs| self.ms.borrow(cs).set(ms));
    }

    pub fn reset(&self) {
        self.set(0);
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}
