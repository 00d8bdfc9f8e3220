// Die drei Anzeige-LEDs an GPIO-Ausgängen
//
// Zusätzlich wird die Farbe der leuchtenden LED auf die Onboard-Status-LED
// gespiegelt (siehe link_core::status_color).

use esp_hal::gpio::{Level, Output};
use link_core::{LED_COUNT, LedBank, LedError, LedPattern, SmartLedWriter, status_color};
use rgb::RGB8;

pub struct GpioLedBank<'a, W: SmartLedWriter> {
    pins: [Output<'a>; LED_COUNT],
    status: W,
    palette: [RGB8; LED_COUNT],
}

impl<'a, W: SmartLedWriter> GpioLedBank<'a, W> {
    pub fn new(pins: [Output<'a>; LED_COUNT], status: W, palette: [RGB8; LED_COUNT]) -> Self {
        Self {
            pins,
            status,
            palette,
        }
    }
}

impl<W: SmartLedWriter> LedBank for GpioLedBank<'_, W> {
    fn show(&mut self, pattern: LedPattern) -> Result<(), LedError> {
        for (pin, lit) in self.pins.iter_mut().zip(pattern) {
            pin.set_level(Level::from(lit));
        }
        self.status.write(status_color(pattern, &self.palette))
    }
}
