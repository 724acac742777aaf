// Hardware Abstraction Layer (HAL) Module
//
// Kapselt die beiden Hardware-Anbindungen der Pipeline:
// Hall-Sensor (Interrupt → RotationTracker) und SPI-DMA (OutputTransfer).

pub mod hall;
pub mod spi_transfer;

pub use spi_transfer::{DmaColumn, SpiStrip};

/// Monotone Zeit in µs seit Boot
///
/// Gemeinsame Uhr für Hall-Interrupt und Rotor-Task: beide müssen
/// dieselbe Zeitbasis nutzen, sonst stimmt die Spalten-Berechnung nicht.
pub fn now_us() -> u64 {
    esp_hal::time::Instant::now()
        .duration_since_epoch()
        .as_micros()
}
