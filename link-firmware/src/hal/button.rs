// Button an GPIO9 mit Interrupt auf fallende Flanke
//
// Der Input gehört nach install() dem Interrupt-Handler; der Main-Loop liest
// den Pegel über is_pressed(). Der Handler selbst schreibt nur atomare
// Felder des SharedState.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::Instant;
use esp_hal::gpio::{Event, Input, Io};
use esp_hal::handler;
use link_core::SharedState;

struct Button {
    input: Input<'static>,
    state: &'static SharedState,
}

static BUTTON: Mutex<RefCell<Option<Button>>> = Mutex::new(RefCell::new(None));

/// Registriert den Handler und aktiviert den Flanken-Interrupt
pub fn install(io: &mut Io<'_>, mut input: Input<'static>, state: &'static SharedState) {
    io.set_interrupt_handler(button_isr);

    critical_section::with(|cs| {
        input.listen(Event::FallingEdge);
        BUTTON.borrow_ref_mut(cs).replace(Button { input, state });
    });
}

/// Aktueller Pegel: `true` solange der Button gedrückt (LOW) ist
pub fn is_pressed() -> bool {
    critical_section::with(|cs| {
        BUTTON
            .borrow_ref(cs)
            .as_ref()
            .is_some_and(|button| button.input.is_low())
    })
}

#[handler]
fn button_isr() {
    critical_section::with(|cs| {
        if let Some(button) = BUTTON.borrow_ref_mut(cs).as_mut() {
            if button.input.is_interrupt_set() {
                // Zeitstempel wird in u32 gespeichert, poll_hold rechnet wrapping
                button.state.button_edge(Instant::now().as_millis() as u32);
                button.input.clear_interrupt();
            }
        }
    });
}
