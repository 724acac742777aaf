//! Double-Buffered Frame Store
//!
//! Zwei Bild-Buffer, von denen immer genau einer "aktiv" ist:
//! - Der Renderer schreibt über den [`FrameWriter`] nur in den inaktiven Buffer
//!   und veröffentlicht ihn am Ende mit [`FrameWriter::publish`].
//! - Die Spalten-Pipeline liest über den [`FrameReader`] nur den aktiven Buffer.
//!
//! Die Zellen sind `AtomicU32`, damit der Übergabe-Mechanismus ohne Locks
//! auskommt. Kippt der aktive Buffer mitten in einem Tick, liest die Pipeline
//! den alten Buffer zu Ende (sichtbares Tearing, kein Datenfehler).

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use crate::config::{HORIZONTAL_RESOLUTION, VERTICAL_RESOLUTION};

/// Eine Bild-Spalte (eine Zelle pro Zeile)
pub type FrameColumn = [AtomicU32; VERTICAL_RESOLUTION];

/// Ein komplettes Bild, spaltenweise abgelegt (`frame[x][y]`)
pub type Frame = [FrameColumn; HORIZONTAL_RESOLUTION];

const fn blank_frame() -> Frame {
    [const { [const { AtomicU32::new(0) }; VERTICAL_RESOLUTION] }; HORIZONTAL_RESOLUTION]
}

/// Fehler beim Aufteilen des Frame Stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Writer und Reader wurden bereits vergeben
    AlreadySplit,
}

/// Frame Store mit zwei Buffern und einem atomaren Aktiv-Index
pub struct FrameStore {
    buffers: [Frame; 2],
    active: AtomicUsize,
    split: AtomicBool,
}

impl FrameStore {
    pub const fn new() -> Self {
        Self {
            buffers: [const { blank_frame() }; 2],
            active: AtomicUsize::new(0),
            split: AtomicBool::new(false),
        }
    }

    /// Vergibt den einzigen Writer und den einzigen Reader
    ///
    /// Jeder weitere Aufruf liefert `FrameError::AlreadySplit`.
    pub fn split(&self) -> Result<(FrameWriter<'_>, FrameReader<'_>), FrameError> {
        if self.split.swap(true, Ordering::AcqRel) {
            return Err(FrameError::AlreadySplit);
        }
        Ok((FrameWriter { store: self }, FrameReader { store: self }))
    }

    /// Index des aktuell veröffentlichten Buffers (0 oder 1)
    pub fn active_index(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Exklusiver Schreibzugriff auf den inaktiven Buffer
///
/// Nur der Writer kippt den Aktiv-Index, daher bleibt sein Ziel-Buffer
/// stabil bis zum nächsten `publish()`.
pub struct FrameWriter<'a> {
    store: &'a FrameStore,
}

impl<'a> FrameWriter<'a> {
    fn target(&self) -> &'a Frame {
        &self.store.buffers[self.store.active.load(Ordering::Relaxed) ^ 1]
    }

    /// Füllt den inaktiven Buffer mit einer Farbe
    pub fn clear(&mut self, color: u32) {
        for column in self.target() {
            for cell in column {
                cell.store(color, Ordering::Relaxed);
            }
        }
    }

    /// ODER-verknüpft eine Farbe in ein Pixel, Pixel außerhalb werden ignoriert
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: u32) {
        if let Some(cell) = self.target().get(x).and_then(|column| column.get(y)) {
            cell.fetch_or(color, Ordering::Relaxed);
        }
    }

    /// Liest ein Pixel des inaktiven Buffers zurück
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        self.target()
            .get(x)
            .and_then(|column| column.get(y))
            .map(|cell| cell.load(Ordering::Relaxed))
    }

    /// Veröffentlicht den inaktiven Buffer
    ///
    /// Danach ist der bisher aktive Buffer das neue Schreibziel.
    pub fn publish(&mut self) {
        let active = self.store.active.load(Ordering::Relaxed);
        self.store.active.store(active ^ 1, Ordering::Release);
    }
}

/// Lesezugriff auf den jeweils aktiven Buffer
pub struct FrameReader<'a> {
    store: &'a FrameStore,
}

impl<'a> FrameReader<'a> {
    /// Tastet den aktiven Buffer einmal ab
    ///
    /// Die Pipeline ruft das einmal pro Tick auf und liest dann nur noch
    /// über die zurückgegebene Ansicht.
    pub fn active(&self) -> FrameView<'a> {
        let index = self.store.active.load(Ordering::Acquire);
        FrameView {
            frame: &self.store.buffers[index],
        }
    }
}

/// Ansicht auf einen veröffentlichten Buffer
#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    frame: &'a Frame,
}

impl<'a> FrameView<'a> {
    /// Pixel an (x, y), außerhalb des Bildes schwarz
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.frame
            .get(x)
            .and_then(|column| column.get(y))
            .map_or(0, |cell| cell.load(Ordering::Relaxed))
    }

    /// Alle Pixel einer Spalte von oben nach unten
    pub fn column(&self, x: usize) -> impl Iterator<Item = u32> + 'a {
        self.frame
            .get(x)
            .into_iter()
            .flat_map(|column| column.iter().map(|cell| cell.load(Ordering::Relaxed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_only_once() {
        let store = Box::new(FrameStore::new());
        assert!(store.split().is_ok());
        assert_eq!(store.split().err(), Some(FrameError::AlreadySplit));
    }

    #[test]
    fn test_writer_never_touches_active_buffer() {
        let store = Box::new(FrameStore::new());
        let (mut writer, reader) = store.split().unwrap();

        writer.clear(0x0000_00ff);
        assert_eq!(reader.active().pixel(0, 0), 0);

        writer.publish();
        assert_eq!(reader.active().pixel(0, 0), 0x0000_00ff);
        assert_eq!(store.active_index(), 1);

        // Neues Schreibziel ist der alte aktive Buffer
        writer.clear(0x0000_ff00);
        assert_eq!(reader.active().pixel(5, 5), 0x0000_00ff);
    }

    #[test]
    fn test_view_sampled_before_flip_keeps_old_buffer() {
        let store = Box::new(FrameStore::new());
        let (mut writer, reader) = store.split().unwrap();
        writer.clear(1);
        writer.publish();

        let view = reader.active();
        writer.clear(2);
        writer.publish();

        assert_eq!(view.pixel(0, 0), 1);
        assert_eq!(reader.active().pixel(0, 0), 2);
    }

    #[test]
    fn test_blend_pixel_ors_and_ignores_out_of_range() {
        let store = Box::new(FrameStore::new());
        let (mut writer, _reader) = store.split().unwrap();
        writer.clear(0);
        writer.blend_pixel(3, 4, 0x0000_0f00);
        writer.blend_pixel(3, 4, 0x0000_00f0);
        writer.blend_pixel(HORIZONTAL_RESOLUTION, 0, 0xff);
        writer.blend_pixel(0, VERTICAL_RESOLUTION, 0xff);
        assert_eq!(writer.pixel(3, 4), Some(0x0000_0ff0));
        assert_eq!(writer.pixel(HORIZONTAL_RESOLUTION, 0), None);
    }

    #[test]
    fn test_view_column_length() {
        let store = Box::new(FrameStore::new());
        let (_writer, reader) = store.split().unwrap();
        assert_eq!(reader.active().column(0).count(), VERTICAL_RESOLUTION);
        assert_eq!(reader.active().column(HORIZONTAL_RESOLUTION).count(), 0);
    }
}
