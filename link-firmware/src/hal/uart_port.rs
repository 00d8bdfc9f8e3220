// Serielle Leitung zum Partner-Gerät über UART1
//
// Blocking-Treiber, aber alle Zugriffe sind nicht-blockierend:
// gelesen wird nur wenn read_ready() ein Byte meldet.

use defmt::warn;
use esp_hal::Blocking;
use esp_hal::uart::{
    Config as UartConfig, DataBits, Parity as UartParity, StopBits, Uart,
};
use link_core::{LinkConfig, LinkError, Parity, SerialPort};

pub struct UartPort<'a> {
    uart: Uart<'a, Blocking>,
    open: bool,
}

impl<'a> UartPort<'a> {
    /// Übernimmt einen bereits an TX/RX gebundenen UART
    ///
    /// Die Leitungs-Parameter werden erst mit `open()` gesetzt.
    pub fn new(uart: Uart<'a, Blocking>) -> Self {
        Self { uart, open: false }
    }
}

/// Übersetzt die Leitungs-Parameter in die esp-hal Konfiguration
fn uart_config(config: &LinkConfig) -> Result<UartConfig, LinkError> {
    let data_bits = match config.data_bits {
        5 => DataBits::_5,
        6 => DataBits::_6,
        7 => DataBits::_7,
        8 => DataBits::_8,
        _ => return Err(LinkError::ConfigRejected),
    };
    let stop_bits = match config.stop_bits {
        1 => StopBits::_1,
        2 => StopBits::_2,
        _ => return Err(LinkError::ConfigRejected),
    };
    let parity = match config.parity {
        Parity::None => UartParity::None,
        Parity::Even => UartParity::Even,
        Parity::Odd => UartParity::Odd,
    };

    Ok(UartConfig::default()
        .with_baudrate(config.baud_rate)
        .with_data_bits(data_bits)
        .with_parity(parity)
        .with_stop_bits(stop_bits))
}

impl SerialPort for UartPort<'_> {
    fn open(&mut self, config: &LinkConfig) -> Result<(), LinkError> {
        let uart_config = uart_config(config)?;
        self.uart
            .apply_config(&uart_config)
            .map_err(|_| LinkError::ConfigRejected)?;
        self.open = true;
        Ok(())
    }

    fn try_read(&mut self) -> Result<Option<u8>, LinkError> {
        if !self.open {
            return Err(LinkError::NotOpen);
        }
        if !self.uart.read_ready() {
            return Ok(None);
        }

        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(_) => Err(LinkError::ReadFailed),
        }
    }

    fn write(&mut self, byte: u8) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::NotOpen);
        }
        match self.uart.write(&[byte]) {
            Ok(1) => Ok(()),
            _ => Err(LinkError::WriteFailed),
        }
    }

    fn close(&mut self) {
        if self.open && self.uart.flush().is_err() {
            warn!("LINK: Flush on close failed");
        }
        self.open = false;
    }
}
