// Device 2: Direction Node
//
// Button (oder `On` vom Partner) kehrt die Laufrichtung um und löst den
// Partner aus; solange der Button gedrückt ist, läuft die Anzeige gespiegelt.

// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Ipv4Cidr, Stack, StackResources, StaticConfigV4};
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Io, Level, Output, OutputConfig, Pull};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::uart::{Config as UartConfig, Uart};

// Backtrace bei Panic und println!() Support
use defmt::info;
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use link_core::{ButtonMode, NodeKind, SharedState, SpeedProfile};
use link_firmware::config::{
    AP_IP, AP_PREFIX_LEN, DIRECTION_AP_PASSWORD, DIRECTION_AP_SSID, DIRECTION_STEP_MS,
    EXTRA_HEAP_SIZE, HTTP_TASK_COUNT, WIFI_HEAP_SIZE,
};
use link_firmware::hal::button;
use link_firmware::tasks::{
    NodePeripherals, access_point_task, dhcp_server_task, net_task, direction_control_task,
    direction_http_task,
};
use link_firmware::{RequestChannel, SnapshotChannel};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
esp_bootloader_esp_idf::esp_app_desc!();

/// Geteilter Zustand: Button-ISR, Main-Loop und HTTP-Tasks
static STATE: SharedState = SharedState::new(
    NodeKind::Direction,
    ButtonMode::ToggleDirection,
    SpeedProfile::fixed(DIRECTION_STEP_MS),
);

/// Main Entry Point
///
/// Initialisiert Hardware, Access Point und spawnt Tasks.
/// Danach schläft main() - alle Arbeit läuft in Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Zwei Heap-Bereiche: reclaimed RAM + extra
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    info!("Direction node booting");

    // Button: Interrupt auf fallende Flanke, Pull-Up (Button gegen GND)
    let mut io = Io::new(peripherals.IO_MUX);
    let button_input = Input::new(peripherals.GPIO9, InputConfig::default().with_pull(Pull::Up));
    button::install(&mut io, button_input, &STATE);

    // LEDs, Status-LED und UART gehören dem Main-Loop
    let uart = Uart::new(peripherals.UART1, UartConfig::default())
        .expect("Failed to initialize UART1")
        .with_tx(peripherals.GPIO4)
        .with_rx(peripherals.GPIO5);
    let node_peripherals = NodePeripherals {
        leds: [
            Output::new(peripherals.GPIO18, Level::Low, OutputConfig::default()),
            Output::new(peripherals.GPIO19, Level::Low, OutputConfig::default()),
            Output::new(peripherals.GPIO20, Level::Low, OutputConfig::default()),
        ],
        uart,
        status_pin: peripherals.GPIO8,
        rmt: peripherals.RMT,
    };

    // WiFi Hardware initialisieren
    static RADIO_INIT: static_cell::StaticCell<esp_radio::Controller> =
        static_cell::StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Sockets: HTTP-Tasks + DHCP + Reserve
    static RESOURCES: static_cell::StaticCell<StackResources<8>> = static_cell::StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    // Statische Adresse im eigenen Netz (AP-Interface)
    let net_config = NetConfig::ipv4_static(StaticConfigV4 {
        address: Ipv4Cidr::new(AP_IP, AP_PREFIX_LEN),
        gateway: Some(AP_IP),
        dns_servers: Default::default(),
    });
    let (stack, runner) = embassy_net::new(wifi_interface.ap, net_config, resources, seed);

    static STACK: static_cell::StaticCell<Stack<'static>> = static_cell::StaticCell::new();
    let stack = &*STACK.init(stack);

    // Snapshot-Channel: Main-Loop → WebSocket-Clients
    static SNAPSHOT_CHANNEL: static_cell::StaticCell<SnapshotChannel> =
        static_cell::StaticCell::new();
    let snapshot_channel = &*SNAPSHOT_CHANNEL.init(SnapshotChannel::new());
    let snapshot_publisher = snapshot_channel
        .publisher()
        .expect("Snapshot channel has no publisher slot");

    // Request-Channel: HTTP → Main-Loop
    static REQUEST_CHANNEL: static_cell::StaticCell<RequestChannel> =
        static_cell::StaticCell::new();
    let request_channel = REQUEST_CHANNEL.init(RequestChannel::new());

    spawner
        .spawn(direction_control_task(
            &STATE,
            node_peripherals,
            request_channel.receiver(),
            snapshot_publisher,
        ))
        .unwrap();

    // Spawn WiFi Tasks
    spawner
        .spawn(access_point_task(
            wifi_controller,
            DIRECTION_AP_SSID,
            DIRECTION_AP_PASSWORD,
        ))
        .unwrap();
    spawner.spawn(net_task(runner)).unwrap();
    spawner.spawn(dhcp_server_task(stack)).unwrap();

    // Spawn HTTP Server Tasks (Seite + WebSocket gleichzeitig)
    for task_id in 0..HTTP_TASK_COUNT {
        spawner
            .spawn(direction_http_task(
                task_id,
                stack,
                &STATE,
                snapshot_channel,
                request_channel.sender(),
            ))
            .unwrap();
    }

    // Main-Loop: schläft, hält `io` am Leben
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
