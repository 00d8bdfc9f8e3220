//! Serielle Kommando-Leitung zwischen den beiden Geräten
//!
//! Ein Kommando = ein Byte, ohne Rahmen oder Prüfsumme.

use crate::traits::{CommandHandler, LinkError, SerialPort};
use crate::types::{LinkEvent, ToggleCommand};

/// Paritäts-Bit der UART-Konfiguration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Bit-Framing und Baudrate der Leitung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
}

impl LinkConfig {
    /// 115200 Baud, 8E2 - beide Geräte müssen identisch konfiguriert sein
    pub const DEFAULT: LinkConfig = LinkConfig {
        baud_rate: 115_200,
        data_bits: 8,
        parity: Parity::Even,
        stop_bits: 2,
    };
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Kommando-Leitung über einen `SerialPort`
///
/// Der Handler wird einmal beim Erzeugen registriert und bei jedem
/// empfangenen `On` aufgerufen. Beim Drop wird der Port geschlossen.
/// Bis `init()` erfolgreich war, liest `poll()` nichts vom Port.
pub struct CommandLink<P: SerialPort, H: CommandHandler> {
    port: P,
    handler: H,
    open: bool,
}

impl<P: SerialPort, H: CommandHandler> CommandLink<P, H> {
    pub fn new(port: P, handler: H) -> Self {
        Self {
            port,
            handler,
            open: false,
        }
    }

    /// Öffnet den Port mit `LinkConfig::DEFAULT`
    pub fn init(&mut self) -> Result<(), LinkError> {
        self.port.open(&LinkConfig::DEFAULT)?;
        self.open = true;
        Ok(())
    }


    /// Sendet ein Kommando als einzelnes Byte, ohne auf Quittung zu warten
    pub fn send(&mut self, command: ToggleCommand) -> Result<(), LinkError> {
        self.port.write(command.into())
    }

    /// Verarbeitet höchstens ein empfangenes Byte
    ///
    /// Nur `On` erreicht den Handler; alle anderen Bytes werden gelesen und
    /// als `Discarded` gemeldet.
    pub fn poll(&mut self) -> Result<Option<LinkEvent>, LinkError> {
        if !self.open {
            return Ok(None);
        }
        let Some(byte) = self.port.try_read()? else {
            return Ok(None);
        };

        match ToggleCommand::try_from(byte) {
            Ok(command @ ToggleCommand::On) => {
                let reply = self.handler.on_command(command);
                if let Some(reply) = reply {
                    self.send(reply)?;
                }
                Ok(Some(LinkEvent::Dispatched { command, reply }))
            }
            _ => Ok(Some(LinkEvent::Discarded(byte))),
        }
    }

}

impl<P: SerialPort, H: CommandHandler> Drop for CommandLink<P, H> {
    fn drop(&mut self) {
        self.port.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimaler Port: ein Byte Eingang, letztes geschriebenes Byte
    struct OneShotPort {
        incoming: Option<u8>,
        written: Option<u8>,
    }

    impl SerialPort for OneShotPort {
        fn open(&mut self, _config: &LinkConfig) -> Result<(), LinkError> {
            Ok(())
        }

        fn try_read(&mut self) -> Result<Option<u8>, LinkError> {
            Ok(self.incoming.take())
        }

        fn write(&mut self, byte: u8) -> Result<(), LinkError> {
            self.written = Some(byte);
            Ok(())
        }

        fn close(&mut self) {}
    }

    #[test]
    fn test_on_is_dispatched_and_answered() {
        let port = OneShotPort {
            incoming: Some(0x14),
            written: None,
        };
        let mut link = CommandLink::new(port, |_: ToggleCommand| -> Option<ToggleCommand> {
            Some(ToggleCommand::SuccessfullyReceived)
        });
        link.init().unwrap();

        let event = link.poll().unwrap();
        assert_eq!(
            event,
            Some(LinkEvent::Dispatched {
                command: ToggleCommand::On,
                reply: Some(ToggleCommand::SuccessfullyReceived),
            })
        );
        assert_eq!(link.port.written, Some(0x28));
    }

    #[test]
    fn test_acknowledgement_is_discarded() {
        let port = OneShotPort {
            incoming: Some(0x28),
            written: None,
        };
        let mut calls = 0;
        let mut link = CommandLink::new(port, |_: ToggleCommand| -> Option<ToggleCommand> {
            calls += 1;
            None
        });
        link.init().unwrap();

        assert_eq!(link.poll().unwrap(), Some(LinkEvent::Discarded(0x28)));
        assert_eq!(link.poll().unwrap(), None);
        drop(link);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_poll_before_init_reads_nothing() {
        // Ohne erfolgreiches `init()` bleibt die Leitung stumm
        let port = OneShotPort {
            incoming: Some(0x14),
            written: None,
        };
        let mut link = CommandLink::new(port, |_: ToggleCommand| -> Option<ToggleCommand> {
            Some(ToggleCommand::SuccessfullyReceived)
        });

        assert_eq!(link.poll().unwrap(), None);
        // Byte bleibt im Port liegen
        assert_eq!(link.port.incoming, Some(0x14));
        assert_eq!(link.port.written, None);
    }
}
