// Regionen-Tabelle: 16 Felder in einem 8×2 Raster über den Globus
//
// Jede Region ist ein Rechteck mit 1 Pixel Rand, damit benachbarte
// Felder auch bei gleicher Farbe getrennt sichtbar bleiben.

use pov_core::config::{HORIZONTAL_RESOLUTION, REGION_COUNT, VERTICAL_RESOLUTION};
use pov_core::region::{MaskColumn, band_mask};
use pov_core::{Region, pack_rgb};
use rgb::RGB8;

/// Anzahl der Felder pro Zeile bzw. Spalte des Rasters
const TILES_X: usize = 8;
const TILES_Y: usize = 2;

/// Rastermaß eines Feldes in Pixeln
const TILE_PITCH_X: usize = HORIZONTAL_RESOLUTION / TILES_X;
const TILE_PITCH_Y: usize = 48;

/// Oberer Rand bis zum ersten Feld (Raster vertikal zentriert)
const OFFSET_Y: usize = (VERTICAL_RESOLUTION - TILES_Y * TILE_PITCH_Y) / 2;

/// Maske eines Feldes: Rastermaß minus 1 Pixel Rand rechts und unten
static TILE_MASK: [MaskColumn; TILE_PITCH_X - 1] =
    band_mask::<{ TILE_PITCH_X - 1 }>(0, TILE_PITCH_Y - 1);

/// Farbe pro Region (obere Zeile links → rechts, dann untere Zeile)
const COLORS: [RGB8; REGION_COUNT] = [
    RGB8 { r: 0xff, g: 0x00, b: 0x00 },
    RGB8 { r: 0xff, g: 0x60, b: 0x00 },
    RGB8 { r: 0xff, g: 0xc0, b: 0x00 },
    RGB8 { r: 0x80, g: 0xff, b: 0x00 },
    RGB8 { r: 0x00, g: 0xff, b: 0x00 },
    RGB8 { r: 0x00, g: 0xff, b: 0x80 },
    RGB8 { r: 0x00, g: 0xff, b: 0xff },
    RGB8 { r: 0x00, g: 0x80, b: 0xff },
    RGB8 { r: 0x00, g: 0x00, b: 0xff },
    RGB8 { r: 0x60, g: 0x00, b: 0xff },
    RGB8 { r: 0xc0, g: 0x00, b: 0xff },
    RGB8 { r: 0xff, g: 0x00, b: 0xc0 },
    RGB8 { r: 0xff, g: 0x00, b: 0x60 },
    RGB8 { r: 0xff, g: 0x80, b: 0x80 },
    RGB8 { r: 0x80, g: 0xff, b: 0x80 },
    RGB8 { r: 0x80, g: 0x80, b: 0xff },
];

/// Alle Regionen, Index = Position im Bitmap vom Bild-Server
pub static REGIONS: [Region<'static>; REGION_COUNT] = tile_regions(&TILE_MASK);

const fn tile_regions(mask: &'static [MaskColumn]) -> [Region<'static>; REGION_COUNT] {
    let mut regions = [Region::new(mask, 0, 0, 0); REGION_COUNT];
    let mut index = 0;
    while index < REGION_COUNT {
        let offset_x = (index % TILES_X) * TILE_PITCH_X;
        let offset_y = OFFSET_Y + (index / TILES_X) * TILE_PITCH_Y;
        regions[index] = Region::new(mask, offset_x, offset_y, pack_rgb(COLORS[index]));
        index += 1;
    }
    regions
}

// Raster muss genau REGION_COUNT Felder haben und ins Bild passen
const _: () = assert!(TILES_X * TILES_Y == REGION_COUNT);
const _: () = assert!(OFFSET_Y + TILES_Y * TILE_PITCH_Y <= VERTICAL_RESOLUTION);
