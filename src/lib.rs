#![no_std]

pub mod drivers;
pub mod tasks;

pub use tasks::*;

use glow_chase::{Counter, DEFAULT_COUNTER};

/// The number of LEDs in the chase
pub const LINE_COUNT: usize = 5;

/// Chase speed. Written by the button interrupt, read by the chase task on every step
pub static COUNTER: Counter = Counter::new(DEFAULT_COUNTER);
