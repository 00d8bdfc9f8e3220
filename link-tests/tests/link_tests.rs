//! Integration Tests für die serielle Kommando-Leitung
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen MockSerialPort

mod common;

use common::MockSerialPort;
use link_core::{CommandLink, LinkConfig, LinkError, LinkEvent, Parity, ToggleCommand};

// ============================================================================
// Tests: init / send / teardown
// ============================================================================

#[test]
fn test_init_opens_with_8e2_at_115200() {
    let port = MockSerialPort::new();
    let log = port.log.clone();
    let mut link = CommandLink::new(port, |_: ToggleCommand| -> Option<ToggleCommand> { None });

    link.init().unwrap();

    let opened = log.borrow().opened_with.unwrap();
    assert_eq!(opened, LinkConfig::DEFAULT);
    assert_eq!(opened.baud_rate, 115_200);
    assert_eq!(opened.data_bits, 8);
    assert_eq!(opened.parity, Parity::Even);
    assert_eq!(opened.stop_bits, 2);
}

#[test]
fn test_send_writes_exactly_one_raw_byte() {
    let port = MockSerialPort::new();
    let log = port.log.clone();
    let mut link = CommandLink::new(port, |_: ToggleCommand| -> Option<ToggleCommand> { None });

    link.send(ToggleCommand::On).unwrap();
    assert_eq!(log.borrow().written, vec![0x14]);

    link.send(ToggleCommand::SuccessfullyReceived).unwrap();
    assert_eq!(log.borrow().written, vec![0x14, 0x28]);
}

#[test]
fn test_send_failure_is_reported() {
    let mut port = MockSerialPort::new();
    port.fail_next_write = true;
    let mut link = CommandLink::new(port, |_: ToggleCommand| -> Option<ToggleCommand> { None });

    assert_eq!(link.send(ToggleCommand::On), Err(LinkError::WriteFailed));
    assert_eq!(link.send(ToggleCommand::On), Ok(()));
}

#[test]
fn test_drop_closes_port() {
    let port = MockSerialPort::new();
    let log = port.log.clone();
    let link = CommandLink::new(port, |_: ToggleCommand| -> Option<ToggleCommand> { None });

    assert!(!log.borrow().closed);
    drop(link);
    assert!(log.borrow().closed);
}

// ============================================================================
// Tests: poll / Dispatch
// ============================================================================

#[test]
fn test_poll_without_data_returns_immediately() {
    let mut link = CommandLink::new(MockSerialPort::new(), |_: ToggleCommand| -> Option<ToggleCommand> {
        panic!("handler must not run without data")
    });
    link.init().unwrap();
    assert_eq!(link.poll(), Ok(None));
}

#[test]
fn test_only_on_reaches_handler() {
    let port = MockSerialPort::new();
    // Alle Byte-Werte außer 0x14 dürfen den Handler nicht erreichen
    let bytes: Vec<u8> = (0..=255u8).collect();
    port.feed(&bytes);

    let mut dispatched = Vec::new();
    let mut link = CommandLink::new(port, |command: ToggleCommand| -> Option<ToggleCommand> {
        dispatched.push(command);
        None
    });
    link.init().unwrap();

    let mut discarded = 0;
    for _ in 0..256 {
        match link.poll().unwrap() {
            Some(LinkEvent::Dispatched { command, reply }) => {
                assert_eq!(command, ToggleCommand::On);
                assert_eq!(reply, None);
            }
            Some(LinkEvent::Discarded(byte)) => {
                assert_ne!(byte, 0x14);
                discarded += 1;
            }
            None => panic!("byte missing"),
        }
    }
    assert_eq!(link.poll(), Ok(None));
    drop(link);

    assert_eq!(discarded, 255);
    assert_eq!(dispatched, vec![ToggleCommand::On]);
}

#[test]
fn test_poll_reads_one_byte_per_call() {
    let port = MockSerialPort::new();
    port.feed(&[0x14, 0x14]);
    let rx = port.rx.clone();
    let mut link = CommandLink::new(port, |_: ToggleCommand| -> Option<ToggleCommand> { None });
    link.init().unwrap();

    link.poll().unwrap();
    assert_eq!(rx.borrow().len(), 1);
    link.poll().unwrap();
    assert!(rx.borrow().is_empty());
}

#[test]
fn test_reply_is_sent_immediately() {
    let port = MockSerialPort::new();
    port.feed(&[0x14]);
    let log = port.log.clone();
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
    assert_eq!(log.borrow().written, vec![0x28]);
}

#[test]
fn test_acknowledgement_is_never_dispatched() {
    let port = MockSerialPort::new();
    port.feed(&[0x28]);
    let log = port.log.clone();
    let mut link = CommandLink::new(port, |_: ToggleCommand| -> Option<ToggleCommand> {
        Some(ToggleCommand::On)
    });
    link.init().unwrap();

    assert_eq!(link.poll(), Ok(Some(LinkEvent::Discarded(0x28))));
    assert!(log.borrow().written.is_empty());
}

#[test]
fn test_failed_init_keeps_link_silent() {
    let mut port = MockSerialPort::new();
    port.fail_open = true;
    port.feed(&[0x14]);
    let rx = port.rx.clone();
    let mut link = CommandLink::new(port, |_: ToggleCommand| -> Option<ToggleCommand> {
        panic!("handler must not run on a closed link")
    });

    assert_eq!(link.init(), Err(LinkError::ConfigRejected));

    // Jeder Poll-Durchlauf bleibt fehlerfrei und liest nichts
    for _ in 0..100 {
        assert_eq!(link.poll(), Ok(None));
    }
    assert_eq!(rx.borrow().len(), 1);
}

// ============================================================================
// Tests: zwei verbundene Leitungen
// ============================================================================

#[test]
fn test_send_is_visible_on_peer_within_one_poll() {
    let (a, b) = MockSerialPort::pair();
    let mut sender = CommandLink::new(a, |_: ToggleCommand| -> Option<ToggleCommand> { None });
    let mut received = 0;
    let mut receiver = CommandLink::new(b, |_: ToggleCommand| -> Option<ToggleCommand> {
        received += 1;
        Some(ToggleCommand::SuccessfullyReceived)
    });
    sender.init().unwrap();
    receiver.init().unwrap();

    sender.send(ToggleCommand::On).unwrap();
    assert!(matches!(
        receiver.poll(),
        Ok(Some(LinkEvent::Dispatched { .. }))
    ));
    // Quittung kommt beim Sender an, wird aber nur verworfen
    assert_eq!(sender.poll(), Ok(Some(LinkEvent::Discarded(0x28))));

    drop(receiver);
    assert_eq!(received, 1);
}
