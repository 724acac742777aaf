//! Geometrie- und Timing-Konstanten
//!
//! Alles hier ist zur Compile-Zeit fest. Hardware-spezifische Werte
//! (Pins, SPI-Takt, WiFi) liegen in `pov-firmware/src/config.rs`.

// ============================================================================
// Geometrie
// ============================================================================

/// Anzahl der LEDs pro Strip
pub const LED_COUNT: usize = 52;

/// Vertikale Auflösung des Bildes (Zeilen)
/// Zwei Strips mit halbem LED-Abstand versetzt → doppelte Zeilenzahl
pub const VERTICAL_RESOLUTION: usize = LED_COUNT * 2;

/// Horizontale Auflösung des Bildes (Spalten pro Umdrehung)
pub const HORIZONTAL_RESOLUTION: usize = 120;

/// Länge eines Spalten-Buffers: Start-Frame + LEDs + End-Frame
pub const COLUMN_BUFFER_SIZE: usize = LED_COUNT + 2;

/// Anzahl der physischen Strips
pub const STRIP_COUNT: usize = 2;

// ============================================================================
// Rotations-Messung
// ============================================================================

/// Anzahl der Umdrehungen im gleitenden Mittelwert
pub const ROTATION_WINDOW: usize = 32;

/// Ab dieser Umdrehungsdauer gilt der Rotor als stehend (100 ms)
pub const STILLNESS_THRESHOLD_US: u64 = 100_000;

/// Zeitquantum für die langsame Bild-Rotation (200 ms pro Spalte)
pub const PHASE_STEP_US: u64 = 200_000;

// ============================================================================
// Farben
// ============================================================================

/// Globale Helligkeit im LED-Protokoll (0-31)
pub const BRIGHTNESS: u8 = 6;

/// Farbe für inaktive Regionen (gedimmtes Grau, 0x00BBGGRR)
pub const INACTIVE_COLOR: u32 = 0x0005_0505;

/// Farbe für ausgeschaltete Pixel
pub const OFF_COLOR: u32 = 0;

// ============================================================================
// Regionen
// ============================================================================

/// Anzahl der Regionen, die das Bild kacheln
pub const REGION_COUNT: usize = 16;

/// Bytes pro Masken-Spalte (bis zu 48 Pixel Höhe)
pub const REGION_MASK_BYTES: usize = 6;
