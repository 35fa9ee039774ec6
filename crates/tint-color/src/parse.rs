//! Textual color syntax for theme configuration.
//!
//! Accepts what a user would write in a CSS file: hex (`#rgb`, `#rgba`,
//! `#rrggbb`, `#rrggbbaa`, hash optional), `rgb()`/`rgba()` and
//! `hsl()`/`hsla()` in both the legacy comma form and the modern
//! space-separated form with an optional `/ alpha`, and named colors.
//! Alpha is accepted and discarded; output markup is always opaque.
//!
//! This only runs while building a palette, never on the conversion hot path.

use std::sync::LazyLock;

use regex::Regex;

use crate::named::named_color;
use crate::rgb::Rgb;

/// A signed, optionally fractional number.
const NUM: &str = r"[+-]?(?:\d*\.)?\d+";

static HEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?(?:([0-9A-Fa-f]{6})(?:[0-9A-Fa-f]{2})?|([0-9A-Fa-f]{3})[0-9A-Fa-f]?)$")
        .expect("hex color pattern is valid")
});

static RGB_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^rgba?\(\s*({NUM})\s*,\s*({NUM})\s*,\s*({NUM})\s*(?:,\s*{NUM}\s*)?\)$"
    ))
    .expect("rgb pattern is valid")
});

static RGB_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^rgba?\(\s*({NUM})\s+({NUM})\s+({NUM})\s*(?:/\s*{NUM}\s*)?\)$"
    ))
    .expect("rgb pattern is valid")
});

static HSL_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^hsla?\(\s*({NUM})\s*,\s*({NUM})%\s*,\s*({NUM})%\s*(?:,\s*{NUM}\s*)?\)$"
    ))
    .expect("hsl pattern is valid")
});

static HSL_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^hsla?\(\s*({NUM})\s+({NUM})%\s+({NUM})%\s*(?:/\s*{NUM}\s*)?\)$"
    ))
    .expect("hsl pattern is valid")
});

/// Parse a color in any supported syntax.
///
/// Returns `None` for anything unrecognized.
#[must_use]
pub fn parse_color(value: &str) -> Option<Rgb> {
    let value = value.trim();
    parse_hex(value)
        .or_else(|| parse_rgb(value))
        .or_else(|| parse_hsl(value))
        .or_else(|| named_color(value))
}

fn parse_hex(value: &str) -> Option<Rgb> {
    let caps = HEX.captures(value)?;
    if let Some(six) = caps.get(1) {
        return u32::from_str_radix(six.as_str(), 16).ok().map(Rgb::from_packed);
    }
    let three = u32::from_str_radix(caps.get(2)?.as_str(), 16).ok()?;
    // Each nibble doubles: f80 -> ff8800.
    let expand = |n: u32| n << 4 | n;
    let r = expand((three >> 8) & 0xf);
    let g = expand((three >> 4) & 0xf);
    let b = expand(three & 0xf);
    Some(Rgb::from_packed(r << 16 | g << 8 | b))
}

fn parse_rgb(value: &str) -> Option<Rgb> {
    let caps = RGB_COMMA.captures(value).or_else(|| RGB_SPACE.captures(value))?;
    let channel = |i: usize| caps.get(i).map(|m| to_channel(number(m.as_str())));
    Some(Rgb::new(channel(1)?, channel(2)?, channel(3)?))
}

fn parse_hsl(value: &str) -> Option<Rgb> {
    let caps = HSL_COMMA.captures(value).or_else(|| HSL_SPACE.captures(value))?;
    let get = |i: usize| caps.get(i).map(|m| number(m.as_str()));
    let h = get(1)?.rem_euclid(360.0);
    let s = get(2)?.clamp(0.0, 100.0) / 100.0;
    let l = get(3)?.clamp(0.0, 100.0) / 100.0;
    Some(hsl_to_rgb(h, s, l))
}

/// The regexes only admit well-formed numbers, so a failed parse means 0.
fn number(s: &str) -> f64 {
    s.parse().unwrap_or(0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(v: f64) -> u8 {
    // Clamped to [0, 255] before the cast.
    v.clamp(0.0, 255.0).round() as u8
}

/// Standard HSL to sRGB. `h` in degrees [0, 360), `s` and `l` in [0, 1].
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let q = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let p = l.mul_add(2.0, -q);
    let sector = h / 60.0;

    let channel = |hue: f64| {
        let hue = if hue < 0.0 {
            hue + 6.0
        } else if hue >= 6.0 {
            hue - 6.0
        } else {
            hue
        };
        let v = if hue < 1.0 {
            (q - p).mul_add(hue, p)
        } else if hue < 3.0 {
            q
        } else if hue < 4.0 {
            (q - p).mul_add(4.0 - hue, p)
        } else {
            p
        };
        to_channel(v * 255.0)
    };

    Rgb::new(channel(sector + 2.0), channel(sector), channel(sector - 2.0))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_long_and_short() {
        assert_eq!(parse_color("#e05561"), Some(Rgb::new(0xe0, 0x55, 0x61)));
        assert_eq!(parse_color("e05561"), Some(Rgb::new(0xe0, 0x55, 0x61)));
        assert_eq!(parse_color("#eee"), Some(Rgb::new(0xee, 0xee, 0xee)));
        assert_eq!(parse_color("#f80"), Some(Rgb::new(0xff, 0x88, 0x00)));
    }

    #[test]
    fn hex_alpha_is_discarded() {
        assert_eq!(parse_color("#11223344"), Some(Rgb::new(0x11, 0x22, 0x33)));
        assert_eq!(parse_color("#1234"), Some(Rgb::new(0x11, 0x22, 0x33)));
    }

    #[test]
    fn hex_rejects_bad_lengths() {
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#1234567"), None);
        assert_eq!(parse_color("#ggg"), None);
    }

    #[test]
    fn rgb_comma_and_space_forms() {
        let expected = Some(Rgb::new(55, 129, 128));
        assert_eq!(parse_color("rgb(55, 129, 128)"), expected);
        assert_eq!(parse_color("rgb(  55  ,  129, 128  )"), expected);
        assert_eq!(parse_color("rgb(55 129 128)"), expected);
        assert_eq!(parse_color("rgba(55, 129, 128, 0.5)"), expected);
        assert_eq!(parse_color("rgb(55 129 128 / 1)"), expected);
    }

    #[test]
    fn rgb_components_clamp_and_round() {
        assert_eq!(
            parse_color("rgb(  -55  ,  +129.5, 128.4  )"),
            Some(Rgb::new(0, 130, 128))
        );
        assert_eq!(parse_color("rgb(-55 +254.4 2128.5/1)"), Some(Rgb::new(0, 254, 255)));
    }

    #[test]
    fn hsl_matches_equivalent_rgb() {
        assert_eq!(parse_color("hsl( 357, 60%, 57%)"), parse_color("rgb(211 80  86)"));
        assert_eq!(parse_color("hsl(357 60% 57%)"), Some(Rgb::new(211, 80, 86)));
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(parse_color("hsl(0, 100%, 50%)"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_color("hsl(120, 100%, 50%)"), Some(Rgb::new(0, 255, 0)));
        assert_eq!(parse_color("hsla(240, 100%, 50%, 0.3)"), Some(Rgb::new(0, 0, 255)));
        assert_eq!(parse_color("hsl(0, 0%, 100%)"), Some(Rgb::WHITE));
    }

    #[test]
    fn hsl_hue_wraps() {
        assert_eq!(parse_color("hsl(480, 100%, 50%)"), parse_color("hsl(120, 100%, 50%)"));
        assert_eq!(parse_color("hsl(-240, 100%, 50%)"), parse_color("hsl(120, 100%, 50%)"));
    }

    #[test]
    fn named_colors_resolve() {
        assert_eq!(parse_color("tomato"), Some(Rgb::new(0xff, 0x63, 0x47)));
        assert_eq!(parse_color(" Navy "), Some(Rgb::new(0, 0, 0x80)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_color(""), None);
        assert_eq!(parse_color("rgb(1, 2)"), None);
        assert_eq!(parse_color("hsl(1, 2, 3)"), None);
        assert_eq!(parse_color("color: red"), None);
    }
}
