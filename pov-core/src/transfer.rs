//! Output Transfer Abstraktion
//!
//! Abstrahiert den asynchronen Hardware-Push (SPI + DMA) eines Spalten-Buffers
//! auf einen Strip.
//!
//! # Ownership statt Konvention
//! `start()` übernimmt den Buffer, `wait_idle()` gibt ihn zurück. Solange ein
//! Transfer läuft, hat die Pipeline schlicht keinen Zugriff auf den Buffer.
//!
//! # Implementierungen
//! - **Production:** `SpiDmaTransfer` (ESP32-S3 SPI2/SPI3 mit DMA)
//! - **Testing:** Mock-Transfers in `pov-tests`

use crate::config::COLUMN_BUFFER_SIZE;

/// Ein Spalten-Buffer aus `COLUMN_BUFFER_SIZE` LED-Worten
pub trait ColumnBuffer {
    /// Schreibt ein LED-Wort an Position `index`
    fn put(&mut self, index: usize, word: u32);
}

impl ColumnBuffer for [u32; COLUMN_BUFFER_SIZE] {
    fn put(&mut self, index: usize, word: u32) {
        if let Some(slot) = self.get_mut(index) {
            *slot = word;
        }
    }
}

impl<B: ColumnBuffer + ?Sized> ColumnBuffer for &mut B {
    fn put(&mut self, index: usize, word: u32) {
        (**self).put(index, word);
    }
}

/// Trait für asynchrone Strip-Transfers
pub trait OutputTransfer {
    type Buffer: ColumnBuffer;

    /// Startet den Push und kehrt sofort zurück
    ///
    /// Darf nur aufgerufen werden, wenn kein Transfer mehr läuft
    /// (siehe [`StripLane::push`]).
    fn start(&mut self, buffer: Self::Buffer);

    /// Läuft der letzte Push noch?
    fn is_busy(&self) -> bool;

    /// Wartet bis der laufende Push fertig ist und gibt dessen Buffer zurück
    ///
    /// `None` wenn gerade kein Transfer lief.
    fn wait_idle(&mut self) -> Option<Self::Buffer>;
}

/// Ein Strip mit seinem Transfer und zwei Ping-Pong Buffern
///
/// Immer einer der Buffer ist frei zum Beschreiben (`idle`), der andere ist
/// entweder im Transfer oder liegt als `spare` bereit.
pub struct StripLane<T: OutputTransfer> {
    transfer: T,
    idle: Option<T::Buffer>,
    spare: Option<T::Buffer>,
}

impl<T: OutputTransfer> StripLane<T> {
    pub fn new(transfer: T, front: T::Buffer, back: T::Buffer) -> Self {
        Self {
            transfer,
            idle: Some(front),
            spare: Some(back),
        }
    }

    /// Der Buffer, der als nächstes beschrieben wird
    pub fn idle_buffer(&mut self) -> Option<&mut T::Buffer> {
        self.idle.as_mut()
    }

    /// Blockiert bis kein Transfer mehr läuft
    pub fn wait_idle(&mut self) {
        if let Some(buffer) = self.transfer.wait_idle() {
            self.spare = Some(buffer);
        }
    }

    /// Schickt den frisch beschriebenen Buffer raus und tauscht die Buffer
    ///
    /// Der vorherige Transfer wird erst abgeschlossen, dann gestartet: zwei
    /// Transfers auf einem Strip können sich nie überlappen.
    pub fn push(&mut self) -> bool {
        let Some(next) = self.idle.take() else {
            return false;
        };
        let previous = self.transfer.wait_idle();
        self.transfer.start(next);
        self.idle = previous.or_else(|| self.spare.take());
        true
    }

    pub fn is_busy(&self) -> bool {
        self.transfer.is_busy()
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }
}
