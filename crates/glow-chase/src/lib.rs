#![cfg_attr(not(test), no_std)]

//! Debounced, speed-adjustable chase lights.
//!
//! - `counter` - the bounded speed value shared between the edge handlers and the animation loop
//! - `debounce` - time based filter for mechanical contact bounce
//! - `input` - turns edges on the increase/decrease lines into counter updates
//! - `chase` - the bidirectional chase pattern and the loop that drives the output lines
//!
//! Nothing in here touches a concrete HAL. Output lines are `embedded-hal` pins, sleeping goes
//! through `embedded-hal-async` and time comes from a [`Clock`], so the firmware supplies the
//! board and the tests supply fakes.

pub(crate) mod fmt;

pub mod chase;
pub mod counter;
pub mod debounce;
pub mod input;

use embassy_time::Duration;
use embedded_hal::digital::PinState;

pub use chase::{ChaseAnimator, ChasePattern, ChaseStep, Direction};
pub use counter::{Counter, step_delay};
pub use debounce::{Debounce, Debouncer};
pub use input::{Clock, InputController, Line, SystemClock};

/// Shortest step delay setting. The step delay must never collapse to zero
pub const MIN_COUNTER: u8 = 1;

/// Longest step delay setting
pub const MAX_COUNTER: u8 = 50;

/// The counter value at power on
pub const DEFAULT_COUNTER: u8 = 25;

/// Minimum quiet time on an input line before another edge is accepted
pub const DEBOUNCE_THRESHOLD: Duration = Duration::from_millis(50);

/// Delay per counter step (0.01s)
pub const DELAY_MULTIPLIER: Duration = Duration::from_millis(10);

/// The inputs are pulled down, so a pressed button reads high
pub const ACTIVE_LEVEL: PinState = PinState::High;
