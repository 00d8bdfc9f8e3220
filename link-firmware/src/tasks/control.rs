// Control Task - Main-Loop eines Geräts
use defmt::{debug, error, info, warn};
use embassy_time::{Duration, Instant, Timer};
use esp_hal::Blocking;
use esp_hal::gpio::Output;
use esp_hal::uart::Uart;
use esp_hal_smartled::smart_led_buffer;
use link_core::{
    DirectionNode, LED_COUNT, LinkEvent, Node, NodeError, NodeEvent, NodeResult, SharedState,
    SpeedNode,
};

use crate::config::{
    CONTROL_POLL_MS, DIRECTION_PALETTE, HOLD_THRESHOLD_MS, RMT_CLOCK_MHZ, SPEED_PALETTE,
};
use crate::hal::{GpioLedBank, RmtLedWriter, UartPort, button};
use crate::{RequestReceiver, SnapshotPublisher};

/// Peripherie, die dem Main-Loop gehört
pub struct NodePeripherals {
    pub leds: [Output<'static>; LED_COUNT],
    pub uart: Uart<'static, Blocking>,
    pub status_pin: esp_hal::peripherals::GPIO8<'static>,
    pub rmt: esp_hal::peripherals::RMT<'static>,
}

/// Main-Loop - Testbare Ablauf-Logik ohne Hardware-Abhängigkeit
///
/// Reihenfolge pro Durchlauf (alle `CONTROL_POLL_MS`):
/// 1. Button auswerten
/// 2. LEDs weiterschalten, falls fällig
/// 3. Alle anstehenden Web-Requests abarbeiten
/// 4. Höchstens ein Byte von der seriellen Leitung verarbeiten
///
/// Fehler werden geloggt, der Loop läuft weiter.
pub async fn control_logic<N: Node>(
    mut node: N,
    button_low: fn() -> bool,
    requests: RequestReceiver,
    publisher: SnapshotPublisher,
) -> ! {
    match node.start() {
        Ok(()) => info!("LINK: {} node started", node.kind()),
        Err(e) => error!("LINK: {} node start failed: {}", node.kind(), e),
    }

    loop {
        let now_ms = Instant::now().as_millis();

        report(node.poll_button(now_ms, button_low()), &publisher);
        report(node.poll_leds(now_ms), &publisher);
        while let Ok(request) = requests.try_receive() {
            report(node.handle_request(request), &publisher);
        }
        report(node.poll_link(), &publisher);

        // Async Delay: gibt CPU an HTTP- und WiFi-Tasks zurück
        Timer::after(Duration::from_millis(CONTROL_POLL_MS)).await;
    }
}

/// Loggt ein Poll-Ergebnis und veröffentlicht LED-Snapshots
fn report(result: NodeResult, publisher: &SnapshotPublisher) {
    match result {
        Ok(None) => {}
        Ok(Some(NodeEvent::LedsAdvanced(snapshot))) => {
            debug!("LED: {}", snapshot);
            publisher.publish_immediate(snapshot);
        }
        Ok(Some(NodeEvent::IntervalChanged {
            interval_ms,
            source,
        })) => info!("LED: Interval now {} ms ({})", interval_ms, source),
        Ok(Some(NodeEvent::DirectionChanged { direction, source })) => {
            info!("LED: Direction now {} ({})", direction, source)
        }
        Ok(Some(NodeEvent::CommandSent(command))) => info!("LINK: Sent {}", command),
        Ok(Some(NodeEvent::Link(LinkEvent::Dispatched { command, reply }))) => {
            info!("LINK: Received {}, reply {}", command, reply)
        }
        Ok(Some(NodeEvent::Link(LinkEvent::Discarded(byte)))) => {
            warn!("LINK: Discarded byte {=u8:#x}", byte)
        }
        Err(NodeError::Led(e)) => error!("LED: Write failed: {}", e),
        Err(NodeError::Link(e)) => error!("LINK: {}", e),
    }
}

/// Device 1: Control Task
///
/// Initialisiert LEDs, Status-LED und UART und ruft dann `control_logic()` auf.
#[embassy_executor::task]
pub async fn speed_control_task(
    state: &'static SharedState,
    peripherals: NodePeripherals,
    requests: RequestReceiver,
    publisher: SnapshotPublisher,
) {
    let mut rmt_buffer = smart_led_buffer!(1);
    let status = match RmtLedWriter::new(
        peripherals.status_pin,
        peripherals.rmt,
        RMT_CLOCK_MHZ,
        &mut rmt_buffer,
    ) {
        Ok(status) => status,
        Err(e) => {
            error!("LED: Status LED init failed: {}", e);
            return;
        }
    };

    let leds = GpioLedBank::new(peripherals.leds, status, SPEED_PALETTE);
    let port = UartPort::new(peripherals.uart);
    let node = SpeedNode::new(state, leds, port, HOLD_THRESHOLD_MS);

    control_logic(node, button::is_pressed, requests, publisher).await
}

/// Device 2: Control Task
#[embassy_executor::task]
pub async fn direction_control_task(
    state: &'static SharedState,
    peripherals: NodePeripherals,
    requests: RequestReceiver,
    publisher: SnapshotPublisher,
) {
    let mut rmt_buffer = smart_led_buffer!(1);
    let status = match RmtLedWriter::new(
        peripherals.status_pin,
        peripherals.rmt,
        RMT_CLOCK_MHZ,
        &mut rmt_buffer,
    ) {
        Ok(status) => status,
        Err(e) => {
            error!("LED: Status LED init failed: {}", e);
            return;
        }
    };

    let leds = GpioLedBank::new(peripherals.leds, status, DIRECTION_PALETTE);
    let port = UartPort::new(peripherals.uart);
    let node = DirectionNode::new(state, leds, port);

    control_logic(node, button::is_pressed, requests, publisher).await
}
