//! WCAG contrast ratio enforcement for readable text.
//!
//! A foreground that is too close in luminance to its background gets pushed
//! away from it: darker foregrounds toward black, lighter ones toward white.
//! Adjustment works on raw sRGB channels in 10% geometric steps, so the walk
//! is monotonic and always terminates at a channel boundary.
//!
//! Luminance follows the WCAG 2.0 definition, including its `0.03928`
//! linearization threshold (WCAG 2.1 later corrected this to `0.04045`; the
//! two differ only for channel values 10 and below).

use crate::rgb::Rgb;

/// Fraction of the remaining distance covered per adjustment step.
const STEP: u16 = 10;

/// Linearize one 8-bit sRGB channel.
#[inline]
fn linearize(c: u8) -> f64 {
    let c = f64::from(c) / 255.0;
    if c <= 0.039_28 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance per WCAG 2.0.
///
///   L = 0.2126 * `R_lin` + 0.7152 * `G_lin` + 0.0722 * `B_lin`
///
/// Returns a value in [0.0, 1.0] where 0 is black and 1 is white.
#[must_use]
pub fn relative_luminance(color: Rgb) -> f64 {
    0.2126f64.mul_add(
        linearize(color.r),
        0.7152f64.mul_add(linearize(color.g), 0.0722 * linearize(color.b)),
    )
}

/// Contrast ratio between two luminances, in [1.0, 21.0].
///
/// The result is the same regardless of argument order.
#[must_use]
pub fn luminance_ratio(l1: f64, l2: f64) -> f64 {
    let (lighter, darker) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Contrast ratio between two colors.
#[must_use]
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    luminance_ratio(relative_luminance(a), relative_luminance(b))
}

/// Adjust `fg` until it reaches `ratio` contrast against `bg`.
///
/// Returns `None` when the pair already meets the ratio. Otherwise returns the
/// adjusted foreground, which either meets the ratio or has saturated at pure
/// black (darkening) or pure white (lightening).
#[must_use]
pub fn ensure_contrast_ratio(fg: Rgb, bg: Rgb, ratio: f64) -> Option<Rgb> {
    let fg_l = relative_luminance(fg);
    let bg_l = relative_luminance(bg);
    if luminance_ratio(fg_l, bg_l) >= ratio {
        return None;
    }
    if fg_l < bg_l {
        Some(reduce_luminance(fg, bg_l, ratio))
    } else {
        Some(increase_luminance(fg, bg_l, ratio))
    }
}

/// Darken channel-wise by `max(1, ceil(c * 10%))` per step.
fn reduce_luminance(mut fg: Rgb, bg_l: f64, ratio: f64) -> Rgb {
    let darken = |c: u8| {
        let step = u16::from(c).div_ceil(STEP).max(1);
        u8::try_from(u16::from(c).saturating_sub(step)).unwrap_or(0)
    };
    while luminance_ratio(relative_luminance(fg), bg_l) < ratio && fg != Rgb::BLACK {
        fg = Rgb::new(darken(fg.r), darken(fg.g), darken(fg.b));
    }
    fg
}

/// Lighten channel-wise by `ceil((255 - c) * 10%)` per step.
fn increase_luminance(mut fg: Rgb, bg_l: f64, ratio: f64) -> Rgb {
    let lighten = |c: u8| {
        let step = (255 - u16::from(c)).div_ceil(STEP);
        u8::try_from(u16::from(c) + step).unwrap_or(u8::MAX)
    };
    while luminance_ratio(relative_luminance(fg), bg_l) < ratio && fg != Rgb::WHITE {
        fg = Rgb::new(lighten(fg.r), lighten(fg.g), lighten(fg.b));
    }
    fg
}

// ─── Tests ───────────────────────────────────────────────────────────────────
