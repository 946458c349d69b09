use defmt::info;
use embassy_time::Delay;
use esp_hal::gpio::Output;
use glow_chase::ChaseAnimator;

use crate::{COUNTER, LINE_COUNT};

/// The chase LEDs, in chase order
pub type ChaseLines = [Output<'static>; LINE_COUNT];

/// Chase main task.
/// Runs the chase over `lines` for as long as the board is powered, picking up speed changes
/// from [`COUNTER`] on every step.
///
/// # Parameters
/// * `lines` - The LED outputs, initialised low
#[embassy_executor::task]
pub async fn chase_task(lines: ChaseLines) {
    info!(
        "CHASE_TASK: Task started, {} ms per step",
        COUNTER.step_delay().as_millis()
    );
    let mut chase = ChaseAnimator::new(lines, Delay, &COUNTER);
    // GPIO outputs can't fail, so neither can the chase
    match chase.run().await {
        Ok(never) => match never {},
        Err(never) => match never {},
    }
}
