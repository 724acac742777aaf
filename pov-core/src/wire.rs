//! LED-Protokoll (APA102-kompatibel)
//!
//! Pure Functions für das Wire-Format der LEDs (testbar!)

use rgb::RGB8;

/// Start-Frame eines Strips: 32 Null-Bits
pub const START_FRAME: u32 = 0x0000_0000;

/// End-Frame eines Strips: 32 Eins-Bits
pub const END_FRAME: u32 = 0xFFFF_FFFF;

/// Markierung in den oberen drei Bits jedes LED-Wortes
const LED_MARKER: u32 = 0b111 << 29;

/// Maske für die 5-Bit Helligkeit
const BRIGHTNESS_MASK: u32 = 0x1f;

/// Maske für die 24-Bit Farbe
const COLOR_MASK: u32 = 0x00ff_ffff;

/// Packt eine RGB-Farbe in das Frame-Format `0x00BBGGRR`
///
/// Die Byte-Lanes entsprechen direkt dem LED-Wort, dadurch ist
/// [`encode`] nur noch ein OR.
///
/// ```
/// # use rgb::RGB8;
/// # use pov_core::pack_rgb;
/// assert_eq!(pack_rgb(RGB8::new(0x33, 0x22, 0x11)), 0x0011_2233);
/// ```
pub const fn pack_rgb(color: RGB8) -> u32 {
    (color.b as u32) << 16 | (color.g as u32) << 8 | color.r as u32
}

/// Gegenstück zu [`pack_rgb`]
pub const fn unpack_rgb(packed: u32) -> RGB8 {
    RGB8 {
        r: packed as u8,
        g: (packed >> 8) as u8,
        b: (packed >> 16) as u8,
    }
}

/// Kodiert eine gepackte Farbe als LED-Wort
///
/// Layout: `111` | Helligkeit (5 Bit) | Blau | Grün | Rot
///
/// ```
/// # use pov_core::encode;
/// assert_eq!(encode(0x0011_2233, 16), 0xF011_2233);
/// ```
pub const fn encode(color: u32, brightness: u8) -> u32 {
    LED_MARKER | (brightness as u32 & BRIGHTNESS_MASK) << 24 | color & COLOR_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_documented_layout() {
        assert_eq!(encode(0x0011_2233, 16), 0xF011_2233);
    }

    #[test]
    fn test_encode_black_keeps_marker() {
        assert_eq!(encode(0, 0), 0xE000_0000);
        assert_eq!(encode(0, 31), 0xFF00_0000);
    }

    #[test]
    fn test_encode_masks_brightness_overflow() {
        // 32 passt nicht in 5 Bit → darf den Marker nicht verändern
        assert_eq!(encode(0, 32), 0xE000_0000);
    }

    #[test]
    fn test_encode_ignores_upper_color_byte() {
        assert_eq!(encode(0xAB00_00FF, 1), 0xE100_00FF);
    }

    #[test]
    fn test_pack_unpack() {
        let color = RGB8 { r: 1, g: 2, b: 3 };
        assert_eq!(pack_rgb(color), 0x0003_0201);
        assert_eq!(unpack_rgb(0x0003_0201), color);
    }
}
