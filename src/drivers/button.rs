//! Speed buttons, serviced straight from the GPIO interrupt.
//!
//! Both lines interrupt on every edge. The handler reads the level, acknowledges the interrupt and
//! hands the edge to the [`InputController`], which owns the debounce state of both lines and
//! updates [`COUNTER`]. Nothing in here blocks or touches the LEDs.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use embedded_hal::digital::PinState;
use esp_hal::{
    gpio::{Event, Input, InputConfig, InputPin, Io, Pull},
    handler,
    peripherals::IO_MUX,
    ram,
};
use glow_chase::{InputController, Line, SystemClock};

use crate::COUNTER;

struct SpeedButtons {
    increase: Input<'static>,
    decrease: Input<'static>,
    controller: InputController<'static, SystemClock>,
}

impl SpeedButtons {
    fn service(&mut self) {
        for line in [Line::Increase, Line::Decrease] {
            let input = match line {
                Line::Increase => &mut self.increase,
                Line::Decrease => &mut self.decrease,
            };
            if !input.is_interrupt_set() {
                continue;
            }
            let level = PinState::from(input.is_high());
            input.clear_interrupt();
            self.controller.on_edge(line, level);
        }
    }
}

static BUTTONS: Mutex<CriticalSectionRawMutex, RefCell<Option<SpeedButtons>>> =
    Mutex::new(RefCell::new(None));

/// Sets up the increase/decrease buttons and starts listening for edges.
///
/// # Parameters
/// * `mux` - The IO MUX, used to install the GPIO interrupt handler
/// * `increase` - Button that slows the chase down (pulled down, pressed is high)
/// * `decrease` - Button that speeds the chase up (pulled down, pressed is high)
pub fn init_speed_buttons(
    mux: IO_MUX<'static>,
    increase: impl InputPin + 'static,
    decrease: impl InputPin + 'static,
) {
    let mut io = Io::new(mux);
    io.set_interrupt_handler(handle_speed_buttons);

    let config = InputConfig::default().with_pull(Pull::Down);
    let mut increase = Input::new(increase, config);
    let mut decrease = Input::new(decrease, config);

    // Listening inside the lock means the handler can't fire before the buttons are stored
    BUTTONS.lock(|cell| {
        increase.listen(Event::AnyEdge);
        decrease.listen(Event::AnyEdge);
        cell.borrow_mut().replace(SpeedButtons {
            increase,
            decrease,
            controller: InputController::new(&COUNTER, SystemClock),
        });
    });
    defmt::info!("BUTTONS: Listening, counter at {}", COUNTER.get());
}

#[handler]
#[ram]
fn handle_speed_buttons() {
    BUTTONS.lock(|cell| {
        if let Some(buttons) = cell.borrow_mut().as_mut() {
            buttons.service();
        }
    });
}
