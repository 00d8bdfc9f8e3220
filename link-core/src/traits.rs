//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung.

use rgb::RGB8;

use crate::link::LinkConfig;
use crate::types::{LedPattern, ToggleCommand};

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    WriteFailed,
}

/// Fehler-Typ für die serielle Leitung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Port wurde nicht geöffnet oder bereits geschlossen
    NotOpen,
    /// Hardware hat die Konfiguration abgelehnt
    ConfigRejected,
    ReadFailed,
    WriteFailed,
}

/// Trait für SmartLED Hardware-Zugriff
///
/// Abstrahiert den Zugriff auf RGB LEDs (WS2812/Neopixel).
///
/// # Implementierungen
/// - **Production:** RmtLedWriter (ESP32 RMT Peripheral, Onboard-Status-LED)
/// - **Testing:** MockLedWriter (in-memory Mock)
pub trait SmartLedWriter: Send {
    /// Schreibt eine RGB-Farbe auf die LED
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn write(&mut self, color: RGB8) -> Result<(), LedError>;
}

/// Trait für die drei Anzeige-LEDs eines Geräts
///
/// # Implementierungen
/// - **Production:** GpioLedBank (drei GPIO-Ausgänge + Status-LED)
/// - **Testing:** MockLedBank
pub trait LedBank {
    /// Setzt alle LEDs gleichzeitig (`true` = HIGH)
    fn show(&mut self, pattern: LedPattern) -> Result<(), LedError>;
}

/// Trait für den seriellen Transport zwischen den Geräten
///
/// Alle Operationen sind nicht-blockierend.
pub trait SerialPort {
    /// Öffnet den Kanal mit Baudrate und Bit-Framing aus `config`
    fn open(&mut self, config: &LinkConfig) -> Result<(), LinkError>;

    /// Liest ein Byte, falls eines gepuffert ist
    ///
    /// Gibt `Ok(None)` sofort zurück wenn nichts anliegt.
    fn try_read(&mut self) -> Result<Option<u8>, LinkError>;

    /// Schreibt genau ein Byte (fire-and-forget)
    fn write(&mut self, byte: u8) -> Result<(), LinkError>;

    /// Schließt den Kanal
    fn close(&mut self);
}

/// Empfänger für eingehende Kommandos
///
/// Wird einmalig beim Erzeugen eines `CommandLink` registriert.
pub trait CommandHandler {
    /// Reagiert auf ein Kommando; `Some(reply)` wird sofort zurückgesendet
    fn on_command(&mut self, command: ToggleCommand) -> Option<ToggleCommand>;
}

impl<F> CommandHandler for F
where
    F: FnMut(ToggleCommand) -> Option<ToggleCommand>,
{
    fn on_command(&mut self, command: ToggleCommand) -> Option<ToggleCommand> {
        self(command)
    }
}
