//! Edge handling for the increase/decrease buttons.
//!
//! The handlers are meant to be called straight from the GPIO interrupt, once per detected
//! transition, with the level the line read at that moment. They never block, never sleep and
//! never touch the output lines.

use embassy_time::Instant;
use embedded_hal::digital::PinState;

use crate::fmt::trace;
use crate::{ACTIVE_LEVEL, Counter, Debounce, Debouncer};

/// Monotonic time source used for debouncing
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// The two input lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    Increase,
    Decrease,
}

/// Owns the debounce state of both lines and adjusts the shared counter on genuine presses
pub struct InputController<'a, C: Clock> {
    counter: &'a Counter,
    clock: C,
    increase: Debouncer,
    decrease: Debouncer,
    active: PinState,
}

impl<'a, C: Clock> InputController<'a, C> {
    /// Controller for buttons that read [`ACTIVE_LEVEL`] when pressed
    pub fn new(counter: &'a Counter, clock: C) -> Self {
        Self::with_debouncers(counter, clock, Debouncer::default(), Debouncer::default())
    }

    pub fn with_debouncers(
        counter: &'a Counter,
        clock: C,
        increase: Debouncer,
        decrease: Debouncer,
    ) -> Self {
        Self {
            counter,
            clock,
            increase,
            decrease,
            active: ACTIVE_LEVEL,
        }
    }

    /// Changes the level treated as "pressed"
    pub fn with_active_level(mut self, active: PinState) -> Self {
        self.active = active;
        self
    }

    /// Edge on the increase line. Returns the new counter value if the edge was applied.
    pub fn on_increase_edge(&mut self, level: PinState) -> Option<u8> {
        self.on_edge(Line::Increase, level)
    }

    /// Edge on the decrease line. Returns the new counter value if the edge was applied.
    pub fn on_decrease_edge(&mut self, level: PinState) -> Option<u8> {
        self.on_edge(Line::Decrease, level)
    }

    pub fn on_edge(&mut self, line: Line, level: PinState) -> Option<u8> {
        // The debouncer has to see every edge, including releases, so it runs before the level
        // check
        if self.debounce_check(line) == Debounce::Reject {
            trace!("INPUT: {} edge rejected", line);
            return None;
        }
        if level != self.active {
            return None;
        }
        let value = match line {
            Line::Increase => self.counter.increment(),
            Line::Decrease => self.counter.decrement(),
        };
        trace!("INPUT: {} edge accepted, counter {}", line, value);
        Some(value)
    }

    /// Runs the line's debounce filter against the current time
    pub fn debounce_check(&mut self, line: Line) -> Debounce {
        let now = self.clock.now();
        self.debouncer_mut(line).check(now)
    }

    pub fn debouncer(&self, line: Line) -> &Debouncer {
        match line {
            Line::Increase => &self.increase,
            Line::Decrease => &self.decrease,
        }
    }

    fn debouncer_mut(&mut self, line: Line) -> &mut Debouncer {
        match line {
            Line::Increase => &mut self.increase,
            Line::Decrease => &mut self.decrease,
        }
    }
}
