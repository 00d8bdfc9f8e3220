//! Gemeinsame Mocks für die Host-Tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use link_core::{LedBank, LedError, LedPattern, LinkConfig, LinkError, SerialPort};

// ============================================================================
// Mock Serial Port
// ============================================================================

/// Eine Richtung der Leitung: Bytes in Sende-Reihenfolge
pub type Wire = Rc<RefCell<VecDeque<u8>>>;

#[derive(Default)]
pub struct PortLog {
    pub opened_with: Option<LinkConfig>,
    pub closed: bool,
    pub written: Vec<u8>,
}

/// In-memory Port: liest von `rx`, schreibt auf `tx`
pub struct MockSerialPort {
    pub rx: Wire,
    pub tx: Wire,
    pub log: Rc<RefCell<PortLog>>,
    pub fail_next_write: bool,
    pub fail_open: bool,
}

impl MockSerialPort {
    /// Einzelner Port mit eigenem Ein- und Ausgang
    pub fn new() -> Self {
        Self {
            rx: Wire::default(),
            tx: Wire::default(),
            log: Rc::default(),
            fail_next_write: false,
            fail_open: false,
        }
    }

    /// Zwei über Kreuz verbundene Ports (TX ↔ RX)
    pub fn pair() -> (Self, Self) {
        let a_to_b = Wire::default();
        let b_to_a = Wire::default();
        let a = Self {
            rx: b_to_a.clone(),
            tx: a_to_b.clone(),
            log: Rc::default(),
            fail_next_write: false,
            fail_open: false,
        };
        let b = Self {
            rx: a_to_b,
            tx: b_to_a,
            log: Rc::default(),
            fail_next_write: false,
            fail_open: false,
        };
        (a, b)
    }

    /// Legt Bytes in den Empfangspuffer
    pub fn feed(&self, bytes: &[u8]) {
        self.rx.borrow_mut().extend(bytes.iter().copied());
    }
}

impl SerialPort for MockSerialPort {
    fn open(&mut self, config: &LinkConfig) -> Result<(), LinkError> {
        if self.fail_open {
            return Err(LinkError::ConfigRejected);
        }
        self.log.borrow_mut().opened_with = Some(*config);
        Ok(())
    }

    fn try_read(&mut self) -> Result<Option<u8>, LinkError> {
        Ok(self.rx.borrow_mut().pop_front())
    }

    fn write(&mut self, byte: u8) -> Result<(), LinkError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(LinkError::WriteFailed);
        }
        self.tx.borrow_mut().push_back(byte);
        self.log.borrow_mut().written.push(byte);
        Ok(())
    }

    fn close(&mut self) {
        self.log.borrow_mut().closed = true;
    }
}

// ============================================================================
// Mock LED Bank
// ============================================================================

#[derive(Default)]
pub struct MockLedBank {
    pub last_pattern: Option<LedPattern>,
    pub history: Vec<LedPattern>,
    pub fail_next_write: bool,
}

impl MockLedBank {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedBank for MockLedBank {
    fn show(&mut self, pattern: LedPattern) -> Result<(), LedError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(LedError::WriteFailed);
        }
        self.last_pattern = Some(pattern);
        self.history.push(pattern);
        Ok(())
    }
}
