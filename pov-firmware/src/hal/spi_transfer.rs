// SPI + DMA Output Transfer für einen LED-Strip
//
// Implementiert pov_core::OutputTransfer auf einem SpiDma-Peripheral.
// Der Buffer wandert beim Start in den DMA-Transfer und kommt erst nach
// `wait()` zurück, genau wie es das Trait verlangt.

use defmt::{Debug2Format, error, warn};
use embassy_time::{Duration, Instant};
use esp_hal::Blocking;
use esp_hal::dma::DmaTxBuf;
use esp_hal::spi::master::{SpiDma, SpiDmaTransfer};
use pov_core::{ColumnBuffer, OutputTransfer};

use crate::config::{COLUMN_BYTES, TRANSFER_TIMEOUT_US};

/// Spalten-Buffer im DMA-fähigen Speicher
///
/// Die LED-Worte werden MSB first (Big Endian) abgelegt, so wie der
/// Strip sie auf der Datenleitung erwartet.
pub struct DmaColumn(DmaTxBuf);

impl DmaColumn {
    pub fn new(mut buffer: DmaTxBuf) -> Self {
        buffer.set_length(COLUMN_BYTES);
        Self(buffer)
    }
}

impl ColumnBuffer for DmaColumn {
    fn put(&mut self, index: usize, word: u32) {
        let start = index * 4;
        if let Some(bytes) = self.0.as_mut_slice().get_mut(start..start + 4) {
            bytes.copy_from_slice(&word.to_be_bytes());
        }
    }
}

/// Zustand des SPI-Peripherals: frei oder in einem Transfer gebunden
enum SpiState {
    Idle(SpiDma<'static, Blocking>),
    Busy(SpiDmaTransfer<'static, Blocking, DmaTxBuf>),
}

/// Output Transfer für einen Strip
pub struct SpiStrip {
    name: &'static str,
    state: Option<SpiState>,
    /// Buffer eines fehlgeschlagenen Starts, wird von `wait_idle()` zurückgegeben
    returned: Option<DmaColumn>,
}

impl SpiStrip {
    /// # Parameter
    /// - `name`: Name für Logs ("A" / "B")
    /// - `spi`: SPI mit gebundenem DMA-Kanal (Takt + MOSI bereits zugewiesen)
    pub fn new(name: &'static str, spi: SpiDma<'static, Blocking>) -> Self {
        Self {
            name,
            state: Some(SpiState::Idle(spi)),
            returned: None,
        }
    }

    /// Schließt einen Transfer ab: erst begrenzt spinnen, dann blockierend warten
    fn finish(
        &self,
        transfer: SpiDmaTransfer<'static, Blocking, DmaTxBuf>,
    ) -> (SpiDma<'static, Blocking>, DmaTxBuf) {
        let started = Instant::now();
        let timeout = Duration::from_micros(TRANSFER_TIMEOUT_US);
        while !transfer.is_done() {
            if started.elapsed() > timeout {
                warn!(
                    "Strip {}: transfer still busy after {} us, blocking",
                    self.name, TRANSFER_TIMEOUT_US
                );
                break;
            }
        }
        transfer.wait()
    }
}

impl OutputTransfer for SpiStrip {
    type Buffer = DmaColumn;

    fn start(&mut self, buffer: DmaColumn) {
        let spi = match self.state.take() {
            Some(SpiState::Idle(spi)) => spi,
            Some(SpiState::Busy(transfer)) => {
                // Vertragsbruch: vorherigen Transfer abschließen, dessen Buffer behalten
                error!("Strip {}: start() while busy", self.name);
                let (spi, previous) = self.finish(transfer);
                self.returned = Some(DmaColumn(previous));
                spi
            }
            None => return,
        };

        match spi.write(COLUMN_BYTES, buffer.0) {
            Ok(transfer) => self.state = Some(SpiState::Busy(transfer)),
            Err((e, spi, buffer)) => {
                error!("Strip {}: DMA start failed: {}", self.name, Debug2Format(&e));
                self.state = Some(SpiState::Idle(spi));
                self.returned = Some(DmaColumn(buffer));
            }
        }
    }

    fn is_busy(&self) -> bool {
        match &self.state {
            Some(SpiState::Busy(transfer)) => !transfer.is_done(),
            _ => false,
        }
    }

    fn wait_idle(&mut self) -> Option<DmaColumn> {
        match self.state.take() {
            Some(SpiState::Busy(transfer)) => {
                let (spi, buffer) = self.finish(transfer);
                self.state = Some(SpiState::Idle(spi));
                Some(DmaColumn(buffer))
            }
            other => {
                self.state = other;
                self.returned.take()
            }
        }
    }
}
