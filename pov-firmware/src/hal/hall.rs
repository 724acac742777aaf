// Hall-Sensor: GPIO-Interrupt → RotationTracker
//
// Der Sensor zieht die Leitung einmal pro Umdrehung auf Low.
// Der Interrupt-Handler stempelt die Flanke und gibt sie an den Tracker,
// alles andere passiert im Rotor-Task.

use core::cell::RefCell;

use critical_section::Mutex;
use esp_hal::gpio::{Event, Input, InputConfig, InputPin, Io, Pull};
use esp_hal::handler;
use esp_hal::peripherals::IO_MUX;
use pov_core::RotationTracker;

use super::now_us;

/// Eingang + Ziel-Tracker, vom Interrupt-Handler aus erreichbar
struct HallSensor {
    input: Input<'static>,
    tracker: &'static RotationTracker,
}

/// Einziger Slot für den Sensor (wird in `install()` einmal befüllt)
static HALL_SENSOR: Mutex<RefCell<Option<HallSensor>>> = Mutex::new(RefCell::new(None));

/// Richtet den Hall-Eingang ein und registriert den Interrupt-Handler
///
/// # Parameter
/// - `io_mux`: IO_MUX Peripheral (für den GPIO-Interrupt-Handler)
/// - `pin`: GPIO des Hall-Sensors (Pull-Up, fallende Flanke)
/// - `tracker`: Tracker, der jede Flanke erhält
pub fn install(
    io_mux: IO_MUX<'static>,
    pin: impl InputPin + 'static,
    tracker: &'static RotationTracker,
) {
    let mut io = Io::new(io_mux);
    io.set_interrupt_handler(hall_interrupt);

    let mut input = Input::new(pin, InputConfig::default().with_pull(Pull::Up));

    critical_section::with(|cs| {
        input.listen(Event::FallingEdge);
        HALL_SENSOR
            .borrow_ref_mut(cs)
            .replace(HallSensor { input, tracker });
    });
}

#[handler]
fn hall_interrupt() {
    let now = now_us();

    critical_section::with(|cs| {
        if let Some(sensor) = HALL_SENSOR.borrow_ref_mut(cs).as_mut() {
            if sensor.input.is_interrupt_set() {
                sensor.input.clear_interrupt();
                sensor.tracker.on_edge(now);
            }
        }
    });
}
