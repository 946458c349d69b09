#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use defmt::info;
use embassy_executor::Spawner;
#[cfg(not(feature = "rtt"))]
use esp_backtrace as _;
use esp_hal::{
    Config,
    clock::CpuClock,
    gpio::{Level, Output, OutputConfig},
    timer::systimer::SystemTimer,
};
use let_it_glow::{COUNTER, drivers::button::init_speed_buttons, tasks::chase_task};
#[cfg(feature = "rtt")]
use panic_rtt_target as _;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    #[cfg(all(feature = "rtt", feature = "defmt"))]
    rtt_target::rtt_init_defmt!();

    let peripherals = esp_hal::init(Config::default().with_cpu_clock(CpuClock::max()));
    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);

    // Increase on GPIO3, decrease on GPIO10
    init_speed_buttons(peripherals.IO_MUX, peripherals.GPIO3, peripherals.GPIO10);

    let config = OutputConfig::default();
    let lines = [
        Output::new(peripherals.GPIO4, Level::Low, config),
        Output::new(peripherals.GPIO5, Level::Low, config),
        Output::new(peripherals.GPIO6, Level::Low, config),
        Output::new(peripherals.GPIO7, Level::Low, config),
        Output::new(peripherals.GPIO8, Level::Low, config),
    ];

    spawner
        .spawn(chase_task(lines))
        .expect("Failed to spawn chase task");

    info!("MAIN: Chase started with counter at {}", COUNTER.get());
}
