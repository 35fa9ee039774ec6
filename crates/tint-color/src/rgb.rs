//! 24-bit sRGB colors.
//!
//! Everything downstream of configuration works on [`Rgb`]: palette slots,
//! true-color SGR values, contrast adjustments. Channels are `u8`, so the
//! [0, 255] invariant holds by construction; every constructor that accepts
//! wider input clamps rather than wraps.

use std::fmt;

/// A 24-bit sRGB color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack `0xRRGGBB`. Bits above the low 24 are ignored.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Masked to 8 bits first.
    pub const fn from_packed(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xff) as u8,
            g: ((v >> 8) & 0xff) as u8,
            b: (v & 0xff) as u8,
        }
    }

    /// Pack into `0xRRGGBB`.
    #[inline]
    #[must_use]
    pub const fn packed(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Build from SGR-style channel parameters, clamping each to 255.
    ///
    /// `38;2;300;0;0` is nonsense on the wire, but it must not wrap around
    /// into a different color.
    #[must_use]
    pub fn from_channels(r: u32, g: u32, b: u32) -> Self {
        let clamp = |c: u32| u8::try_from(c).unwrap_or(u8::MAX);
        Self::new(clamp(r), clamp(g), clamp(b))
    }

    /// CSS hex notation: `#rrggbb`, lowercase.
    #[must_use]
    pub fn css(self) -> String {
        format!("#{:06x}", self.packed())
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.packed())
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_roundtrip() {
        let c = Rgb::new(0x12, 0xab, 0xef);
        assert_eq!(c.packed(), 0x12abef);
        assert_eq!(Rgb::from_packed(0x12abef), c);
    }

    #[test]
    fn from_packed_ignores_high_bits() {
        assert_eq!(Rgb::from_packed(0xff_00_00_01), Rgb::new(0, 0, 1));
    }

    #[test]
    fn css_is_lowercase_and_zero_padded() {
        assert_eq!(Rgb::new(0, 0, 5).css(), "#000005");
        assert_eq!(Rgb::new(0xE0, 0x55, 0x61).css(), "#e05561");
    }

    #[test]
    fn channels_clamp_instead_of_wrapping() {
        assert_eq!(Rgb::from_channels(300, 256, 7), Rgb::new(255, 255, 7));
    }

    #[test]
    fn display_matches_css() {
        let c = Rgb::new(1, 2, 3);
        assert_eq!(c.to_string(), c.css());
    }
}
