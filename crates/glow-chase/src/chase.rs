//! The bidirectional chase.
//!
//! [`ChasePattern`] is the state machine on its own: an endless iterator of [`ChaseStep`]s that
//! sweeps forward over the lines, then back, then forward again. [`ChaseAnimator`] applies those
//! steps to real output pins and sleeps between them for as long as the shared [`Counter`] says.
//!
//! The line that ends one sweep is also the line that starts the next one. It isn't switched off
//! in between, so the chase never shows a blank frame at the turn and the end line dwells for
//! two steps.

use core::convert::Infallible;

use embassy_time::Duration;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::Counter;
use crate::fmt::{debug, info};

/// Sweep direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Ascending line index
    #[default]
    Forward,
    /// Descending line index
    Backward,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// Line index visited at position `step` of a sweep over `len` lines
    pub fn index(self, step: usize, len: usize) -> usize {
        match self {
            Direction::Forward => step,
            Direction::Backward => len - 1 - step,
        }
    }
}

/// One frame of the chase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChaseStep {
    /// Line to switch off before lighting `on`. Always `None` on the first step of a sweep
    pub off: Option<usize>,
    /// Line to light
    pub on: usize,
    /// Direction of the sweep this step belongs to
    pub direction: Direction,
    /// True on the last step of a sweep
    pub last: bool,
}

/// Endless chase over `N` lines, starting forward
#[derive(Debug, Clone)]
pub struct ChasePattern<const N: usize> {
    direction: Direction,
    /// Position within the current sweep
    position: usize,
    /// Line lit by the previous step of this sweep
    previous: Option<usize>,
}

impl<const N: usize> ChasePattern<N> {
    pub const fn new() -> Self {
        const { assert!(N >= 2, "a chase needs at least two lines") };
        Self {
            direction: Direction::Forward,
            position: 0,
            previous: None,
        }
    }

    /// Direction of the sweep the next step belongs to
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Produces the next step. The pattern never runs out
    pub fn advance(&mut self) -> ChaseStep {
        let on = self.direction.index(self.position, N);
        let step = ChaseStep {
            off: self.previous,
            on,
            direction: self.direction,
            last: self.position == N - 1,
        };

        if step.last {
            self.direction = self.direction.flip();
            self.position = 0;
            self.previous = None;
        } else {
            self.position += 1;
            self.previous = Some(on);
        }
        step
    }
}

impl<const N: usize> Default for ChasePattern<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Iterator for ChasePattern<N> {
    type Item = ChaseStep;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.advance())
    }
}

/// Whole microseconds in `delay`, saturating at `u32::MAX`
fn micros(delay: Duration) -> u32 {
    u32::try_from(delay.as_micros()).unwrap_or(u32::MAX)
}

/// Drives the chase on `N` output lines.
///
/// The step delay is read from the counter before every sleep, so a button press changes the
/// speed from the very next step.
pub struct ChaseAnimator<'a, P, D, const N: usize> {
    lines: [P; N],
    delay: D,
    counter: &'a Counter,
    pattern: ChasePattern<N>,
}

impl<'a, P, D, const N: usize> ChaseAnimator<'a, P, D, N>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Takes ownership of the lines in chase order. They are not touched until the first step.
    pub fn new(lines: [P; N], delay: D, counter: &'a Counter) -> Self {
        Self {
            lines,
            delay,
            counter,
            pattern: ChasePattern::new(),
        }
    }

    /// Direction of the sweep the next step belongs to
    pub fn direction(&self) -> Direction {
        self.pattern.direction()
    }

    /// Lights the next line and sleeps for the current step delay
    pub async fn step(&mut self) -> Result<ChaseStep, P::Error> {
        let step = self.pattern.advance();
        if let Some(off) = step.off {
            self.lines[off].set_low()?;
        }
        self.lines[step.on].set_high()?;

        let delay = self.counter.step_delay();
        self.delay.delay_us(micros(delay)).await;

        if step.last {
            debug!("CHASE: {} sweep done, reversing", step.direction);
        }
        Ok(step)
    }

    /// Runs one complete sweep. Returns the direction it ran in.
    pub async fn traverse(&mut self) -> Result<Direction, P::Error> {
        loop {
            let step = self.step().await?;
            if step.last {
                return Ok(step.direction);
            }
        }
    }

    /// Runs the chase forever
    pub async fn run(&mut self) -> Result<Infallible, P::Error> {
        info!("CHASE: Starting over {} lines", N);
        loop {
            self.traverse().await?;
        }
    }

    /// Hands the lines back
    pub fn release(self) -> ([P; N], D) {
        (self.lines, self.delay)
    }
}
