// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die Traits aus link-core für die ESP32-C6 Peripherie.

pub mod button;
pub mod led_bank;
pub mod led_writer;
pub mod uart_port;

pub use led_bank::GpioLedBank;
pub use led_writer::{LED_BUFFER_SIZE, RmtLedWriter};
pub use uart_port::UartPort;
