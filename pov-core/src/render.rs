//! Renderer: Regionen-Flags → Frame
//!
//! Malt den inaktiven Buffer neu und veröffentlicht ihn danach.

use crate::config::OFF_COLOR;
use crate::frame::FrameWriter;
use crate::region::Region;

/// Renderer mit exklusivem Schreibzugriff auf den Frame Store
pub struct Renderer<'a> {
    writer: FrameWriter<'a>,
    regions: &'a [Region<'a>],
    inactive_color: u32,
}

impl<'a> Renderer<'a> {
    pub fn new(writer: FrameWriter<'a>, regions: &'a [Region<'a>], inactive_color: u32) -> Self {
        Self {
            writer,
            regions,
            inactive_color,
        }
    }

    /// Malt alle Regionen und veröffentlicht den Buffer
    pub fn render(&mut self, flags: &[bool]) {
        render(&mut self.writer, self.regions, flags, self.inactive_color);
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

/// Malt die Regionen in den inaktiven Buffer und kippt den Aktiv-Index
///
/// Aktive Regionen bekommen ihre eigene Farbe, alle anderen `inactive_color`.
/// Fehlt ein Flag (zu kurze Sequenz), gilt die Region als inaktiv.
pub fn render(writer: &mut FrameWriter<'_>, regions: &[Region<'_>], flags: &[bool], inactive_color: u32) {
    writer.clear(OFF_COLOR);

    for (index, region) in regions.iter().enumerate() {
        let color = match flags.get(index) {
            Some(true) => region.color,
            _ => inactive_color,
        };
        for (x, y) in region.pixels() {
            writer.blend_pixel(x, y, color);
        }
    }

    writer.publish();
}
