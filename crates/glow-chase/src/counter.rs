//! The bounded speed counter shared across the interrupt boundary.
//!
//! The edge handlers run in interrupt context while the chase loop runs in a task, so every
//! access goes through a critical section. The ESP32-C3 core (riscv32imc) has no atomic
//! read-modify-write instructions, so an `AtomicU8::fetch_add` isn't an option there. Only the
//! single scalar needs to be consistent; a reader may see the value from just before or just
//! after a concurrent update.

use core::cell::Cell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use embassy_time::Duration;

use crate::fmt::debug;
use crate::{DELAY_MULTIPLIER, MAX_COUNTER, MIN_COUNTER};

/// Inter-step delay for a given counter value
pub fn step_delay(value: u8) -> Duration {
    DELAY_MULTIPLIER * u32::from(value)
}

const fn clamp(value: u8) -> u8 {
    if value < MIN_COUNTER {
        MIN_COUNTER
    } else if value > MAX_COUNTER {
        MAX_COUNTER
    } else {
        value
    }
}

/// Speed counter, always within `MIN_COUNTER..=MAX_COUNTER`
pub struct Counter {
    value: Mutex<CriticalSectionRawMutex, Cell<u8>>,
}

impl Counter {
    /// Creates a counter. Out of range initial values are clamped.
    pub const fn new(initial: u8) -> Self {
        Self {
            value: Mutex::new(Cell::new(clamp(initial))),
        }
    }

    pub fn get(&self) -> u8 {
        self.value.lock(Cell::get)
    }

    /// Adds one, saturating at `MAX_COUNTER`. Returns the value after the update.
    pub fn increment(&self) -> u8 {
        self.update(|v| v.saturating_add(1))
    }

    /// Subtracts one, saturating at `MIN_COUNTER`. Returns the value after the update.
    pub fn decrement(&self) -> u8 {
        self.update(|v| v.saturating_sub(1))
    }

    /// The delay the chase loop should sleep for right now
    pub fn step_delay(&self) -> Duration {
        step_delay(self.get())
    }

    fn update(&self, f: impl FnOnce(u8) -> u8) -> u8 {
        let (old, new) = self.value.lock(|cell| {
            let old = cell.get();
            let new = clamp(f(old));
            cell.set(new);
            (old, new)
        });
        if old != new {
            debug!("COUNTER: now {} (step delay {} ms)", new, step_delay(new).as_millis());
        }
        new
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new(crate::DEFAULT_COUNTER)
    }
}
