//! Regionen: feste Masken + Farbe
//!
//! Eine Region ist eine bit-gepackte Maske (eine Masken-Spalte pro Bildspalte),
//! die mit einem Offset ins Bild gelegt wird. Pixel `y` einer Spalte ist
//! Bit `y % 8` von Byte `y / 8`.

use crate::config::REGION_MASK_BYTES;

/// Eine Masken-Spalte
pub type MaskColumn = [u8; REGION_MASK_BYTES];

/// Maximale Höhe einer Maske in Pixeln
pub const MASK_HEIGHT: usize = REGION_MASK_BYTES * 8;

/// Eine Region des Bildes
#[derive(Debug, Clone, Copy)]
pub struct Region<'a> {
    pub mask: &'a [MaskColumn],
    pub offset_x: usize,
    pub offset_y: usize,
    /// Farbe im Frame-Format `0x00BBGGRR`
    pub color: u32,
}

impl<'a> Region<'a> {
    pub const fn new(mask: &'a [MaskColumn], offset_x: usize, offset_y: usize, color: u32) -> Self {
        Self {
            mask,
            offset_x,
            offset_y,
            color,
        }
    }

    /// Ist das Masken-Pixel (x, y) gesetzt? (Masken-Koordinaten)
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        match self.mask.get(x) {
            Some(column) if y < MASK_HEIGHT => column[y / 8] & (1 << (y % 8)) != 0,
            _ => false,
        }
    }

    /// Alle gesetzten Pixel in Bild-Koordinaten
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.mask.len()).flat_map(move |x| {
            (0..MASK_HEIGHT)
                .filter(move |&y| self.is_set(x, y))
                .map(move |y| (x + self.offset_x, y + self.offset_y))
        })
    }

    /// Deckt die Region das Bild-Pixel (x, y) ab?
    pub fn covers(&self, x: usize, y: usize) -> bool {
        x >= self.offset_x
            && y >= self.offset_y
            && self.is_set(x - self.offset_x, y - self.offset_y)
    }
}

/// Baut eine Masken-Spalte mit gesetzten Zeilen `top..bottom`
pub const fn band_column(top: usize, bottom: usize) -> MaskColumn {
    let mut column = [0u8; REGION_MASK_BYTES];
    let mut y = top;
    while y < bottom && y < MASK_HEIGHT {
        column[y / 8] |= 1 << (y % 8);
        y += 1;
    }
    column
}

/// Rechteckige Maske mit `W` Spalten und den Zeilen `top..bottom`
pub const fn band_mask<const W: usize>(top: usize, bottom: usize) -> [MaskColumn; W] {
    [band_column(top, bottom); W]
}
