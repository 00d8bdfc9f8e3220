// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

use core::net::Ipv4Addr;

use link_core::SpeedProfile;
use rgb::RGB8;

// ============================================================================
// GPIO-Zuordnung (identisch auf beiden Geräten)
// ============================================================================
//
// LED_1..3:  GPIO18, GPIO19, GPIO20 (aktiv HIGH)
// Button:    GPIO9 (BOOT-Taster, gegen GND, interner Pull-Up)
// UART1:     TX = GPIO4, RX = GPIO5 (über Kreuz zum Partner-Gerät)
// Status:    GPIO8 (Onboard WS2812)

/// GPIO-Pin für die Onboard RGB LED (WS2812/Neopixel)
pub const STATUS_LED_GPIO_PIN: u8 = 8;

/// Helligkeits-Level für die Status-LED (0-255)
/// Wert ist gedimmt für Augenschonung
pub const LED_BRIGHTNESS: u8 = 10;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

// ============================================================================
// Device 1: Speed Node
// ============================================================================

/// Blink-Intervall: Start 1000 ms, -200 ms pro Hold/Klick, ab 200 ms zurück auf 1000 ms
pub const SPEED_PROFILE: SpeedProfile = SpeedProfile {
    default_ms: 1000,
    step_ms: 200,
    floor_ms: 200,
};

/// Mindestdauer eines Button-Drucks, der als Hold zählt
pub const HOLD_THRESHOLD_MS: u32 = 1000;

/// Farben der drei LEDs (Grün, Rot, Blau) für die Status-LED
pub const SPEED_PALETTE: [RGB8; 3] = [
    RGB8 {
        r: 0,
        g: LED_BRIGHTNESS,
        b: 0,
    },
    RGB8 {
        r: LED_BRIGHTNESS,
        g: 0,
        b: 0,
    },
    RGB8 {
        r: 0,
        g: 0,
        b: LED_BRIGHTNESS,
    },
];

// ============================================================================
// Device 2: Direction Node
// ============================================================================

/// Festes Schritt-Intervall
pub const DIRECTION_STEP_MS: u32 = 300;

/// Farben der drei LEDs (Grün, Blau, Grün) für die Status-LED
pub const DIRECTION_PALETTE: [RGB8; 3] = [
    RGB8 {
        r: 0,
        g: LED_BRIGHTNESS,
        b: 0,
    },
    RGB8 {
        r: 0,
        g: 0,
        b: LED_BRIGHTNESS,
    },
    RGB8 {
        r: 0,
        g: LED_BRIGHTNESS,
        b: 0,
    },
];

// ============================================================================
// Main-Loop
// ============================================================================

/// Poll-Periode des Main-Loops in Millisekunden
/// Deutlich kleiner als das kürzeste LED-Intervall (300 ms)
pub const CONTROL_POLL_MS: u64 = 10;

/// Kapazität der Request-Queue (Web → Main-Loop)
pub const REQUEST_QUEUE_SIZE: usize = 4;

// ============================================================================
// Access Point Konfiguration
// ============================================================================

/// SSID/Passwort werden zur Build-Zeit aus der Environment geladen
/// (siehe build.rs und .env.example), sonst gelten die Defaults.
pub const SPEED_AP_SSID: &str = match option_env!("SPEED_AP_SSID") {
    Some(ssid) => ssid,
    None => "LinkNode-Speed",
};

pub const SPEED_AP_PASSWORD: &str = match option_env!("SPEED_AP_PASSWORD") {
    Some(password) => password,
    None => "12345678",
};

pub const DIRECTION_AP_SSID: &str = match option_env!("DIRECTION_AP_SSID") {
    Some(ssid) => ssid,
    None => "LinkNode-Direction",
};

pub const DIRECTION_AP_PASSWORD: &str = match option_env!("DIRECTION_AP_PASSWORD") {
    Some(password) => password,
    None => "123456789",
};

/// IP-Adresse des Geräts im eigenen Netz (gleichzeitig Gateway)
pub const AP_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 1);

/// Netzmaske als Präfix-Länge
pub const AP_PREFIX_LEN: u8 = 24;

/// Wartezeit nach AP-Fehler vor erneutem Start
pub const AP_RESTART_DELAY_SECS: u64 = 5;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// DHCP-Server Konfiguration
// ============================================================================

/// Maximale Anzahl gleichzeitiger DHCP-Leases
pub const DHCP_MAX_LEASES: usize = 8;

/// Paket-Buffer für DHCP-Nachrichten
pub const DHCP_PACKET_BUFFER_SIZE: usize = 1500;

/// Wartezeit nach DHCP-Fehler
pub const DHCP_RESTART_DELAY_MS: u64 = 500;

// ============================================================================
// HTTP Server Konfiguration
// ============================================================================

/// Anzahl paralleler HTTP-Server-Tasks
pub const HTTP_TASK_COUNT: usize = 4;

/// HTTP Port
pub const HTTP_PORT: u16 = 80;

/// HTTP Buffer-Größe in Bytes
/// Für HTTP Request/Response Headers und Body
pub const HTTP_BUFFER_SIZE: usize = 1024;

/// TCP RX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
pub const TCP_TX_BUFFER_SIZE: usize = 1024;

/// WebSocket Message Buffer-Größe in Bytes
/// Eingehende Nachrichten sind kurz ("TOGGLE")
pub const WEBSOCKET_BUFFER_SIZE: usize = 128;

/// JSON Serialisierungs-Buffer für GET /status
/// Für {"node":"direction","phase":2,"interval_ms":1000,"reversed":false}
pub const JSON_STATUS_BUFFER_SIZE: usize = 128;

/// Maximale Anzahl WebSocket-Clients (Subscriber des Snapshot-Channels)
///
/// Jeder Client belegt einen HTTP-Task für die ganze Verbindung. Ein Task
/// bleibt frei für Seite und Aktionen, und ein weiterer Upgrade-Versuch
/// landet dort und bekommt HTTP 503.
pub const MAX_WEBSOCKET_CLIENTS: usize = HTTP_TASK_COUNT - 1;

const _: () = assert!(
    MAX_WEBSOCKET_CLIENTS > 0 && MAX_WEBSOCKET_CLIENTS < HTTP_TASK_COUNT,
    "WebSocket clients must leave at least one HTTP task free"
);
