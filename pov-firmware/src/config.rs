// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
//
// Geometrie und Timing der Pipeline liegen in pov_core::config,
// hier steht nur was Board, Netzwerk und Tasks betrifft.
#![allow(dead_code)]

use pov_core::config::COLUMN_BUFFER_SIZE;

// ============================================================================
// Pin-Zuordnung (ESP32-S3)
// ============================================================================

/// GPIO-Pin des Hall-Sensors (Pull-Up, fallende Flanke = Referenzpunkt)
pub const HALL_GPIO_PIN: u8 = 4;

/// Strip A: Takt (SPI2 SCK) und Daten (SPI2 MOSI)
pub const STRIP_A_CLOCK_PIN: u8 = 12;
pub const STRIP_A_DATA_PIN: u8 = 11;

/// Strip B: Takt (SPI3 SCK) und Daten (SPI3 MOSI)
pub const STRIP_B_CLOCK_PIN: u8 = 14;
pub const STRIP_B_DATA_PIN: u8 = 13;

// ============================================================================
// LED-Ausgabe Konfiguration
// ============================================================================

/// SPI Taktfrequenz in MHz für beide Strips
pub const SPI_FREQUENCY_MHZ: u32 = 16;

/// Größe eines Spalten-Buffers in Bytes (Start + LEDs + Ende, je 4 Byte)
pub const COLUMN_BYTES: usize = COLUMN_BUFFER_SIZE * 4;

/// Maximale Spin-Zeit beim Warten auf einen DMA-Transfer in µs
/// Ein Transfer dauert bei 16 MHz ~110 µs, danach wird gewarnt
/// und blockierend gewartet
pub const TRANSFER_TIMEOUT_US: u64 = 2_000;

/// Intervall für die Statistik-Logs des Rotor-Tasks in Sekunden
pub const STATS_INTERVAL_SECS: u64 = 10;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Wartezeit nach einem WiFi-Fehler vor erneutem Versuch
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// Bild-Server Konfiguration
// ============================================================================

/// Hostname oder IP-Adresse des Bild-Servers
/// Wird zur Build-Zeit aus der Environment Variable IMAGE_HOST geladen
pub const IMAGE_HOST: &str = env!(
    "IMAGE_HOST",
    "Bild-Server nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Port des Bild-Servers (IMAGE_PORT, Standard: 80)
pub const IMAGE_PORT: u16 = match option_env!("IMAGE_PORT") {
    Some(port) => parse_port(port),
    None => 80,
};

/// Pfad der Regionen-Bitmap (IMAGE_PATH, Standard: "/regions")
pub const IMAGE_PATH: &str = match option_env!("IMAGE_PATH") {
    Some(path) => path,
    None => "/regions",
};

/// Abfrage-Intervall in Sekunden
pub const REFRESH_INTERVAL_SECS: u64 = 5;

/// Timeout für Verbindung und Antwort in Sekunden
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;

/// Buffer für den GET-Request
pub const REQUEST_BUFFER_SIZE: usize = 256;

/// Buffer für die komplette Antwort (Header + Bitmap)
pub const RESPONSE_BUFFER_SIZE: usize = 1024;

/// TCP Buffer-Größen für den Abruf
pub const FETCH_TCP_BUFFER_SIZE: usize = 1024;

// ============================================================================
// HTTP Status-Server Konfiguration
// ============================================================================

/// Port des Status-Servers
pub const HTTP_PORT: u16 = 80;

/// Anzahl paralleler Server-Tasks
pub const HTTP_TASK_POOL_SIZE: usize = 2;

/// HTTP Buffer-Größe in Bytes
/// Für HTTP Request/Response Headers und Body
pub const HTTP_BUFFER_SIZE: usize = 1024;

/// TCP RX Buffer-Größe in Bytes
/// Für eingehende TCP-Daten vom Client
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
/// Für ausgehende TCP-Daten zum Client
pub const TCP_TX_BUFFER_SIZE: usize = 1024;

/// JSON Serialisierungs-Buffer für /status
pub const JSON_STATUS_BUFFER_SIZE: usize = 384;

// ============================================================================
// Hilfsfunktionen
// ============================================================================

/// Parst eine Portnummer zur Compile-Zeit
const fn parse_port(text: &str) -> u16 {
    let bytes = text.as_bytes();
    assert!(!bytes.is_empty(), "IMAGE_PORT ist leer");
    let mut port: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        assert!(digit.is_ascii_digit(), "IMAGE_PORT ist keine Zahl");
        port = port * 10 + (digit - b'0') as u32;
        assert!(port <= u16::MAX as u32, "IMAGE_PORT ist zu groß");
        i += 1;
    }
    port as u16
}
