// SPDX-License-Identifier: MIT
//
// Style resolution: from raw SGR state to something markup can print.
//
// Pipeline for one resolution:
//
//   AttrState
//     │  inverse: swap fg/bg specs (mode and value together)
//     │  normalize: 256-color indices < 16 become ANSI slots
//     │  bold: fg indices 0–7 become 8–15
//     ▼
//   ColorSpec pair ── palette lookup ──▶ Rgb pair (or theme defaults)
//     │
//     ▼  minimum contrast ratio > 1: adjust fg against bg (cached)
//   ResolvedStyle { fg: Paint, bg: Paint, attrs }
//
// In class mode indexed colors become tokens ("9", "inverse") instead of
// RGB, but they are still range-checked against the palette so an
// undefined index fails the same way in both modes.

use tint_color::{ensure_contrast_ratio, Palette, Rgb};

use crate::attr::{Attr, AttrState, ColorSpec};
use crate::cache::{ContrastCache, ContrastKey};
use crate::error::{Error, Result};

/// Token used in class mode for a default color swapped in by SGR 7.
pub const INVERSE_TOKEN: &str = "inverse";

// ─── Paint ───────────────────────────────────────────────────────────────────

/// One resolved color slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Paint {
    /// Nothing to emit.
    #[default]
    None,
    /// A concrete color, emitted as a CSS property.
    Rgb(Rgb),
    /// A class token, emitted as `<prefix>fg-<token>` / `<prefix>bg-<token>`.
    Token(String),
}

impl Paint {
    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[inline]
    #[must_use]
    pub const fn rgb(&self) -> Option<Rgb> {
        match self {
            Self::Rgb(rgb) => Some(*rgb),
            Self::None | Self::Token(_) => None,
        }
    }
}

impl From<Option<Rgb>> for Paint {
    fn from(rgb: Option<Rgb>) -> Self {
        rgb.map_or(Self::None, Self::Rgb)
    }
}

// ─── ResolvedStyle ───────────────────────────────────────────────────────────

/// The rendering-ready projection of [`AttrState`].
///
/// `attrs` never contains [`Attr::INVERSE`]; inversion is already applied to
/// the colors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedStyle {
    pub fg: Paint,
    pub bg: Paint,
    pub attrs: Attr,
}

impl ResolvedStyle {
    /// Whether this style needs no span at all.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_empty()
    }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

fn slot(index: u32) -> usize {
    usize::try_from(index).unwrap_or(usize::MAX)
}

/// Resolves attribute state against a palette, enforcing minimum contrast.
#[derive(Debug)]
pub struct Resolver {
    palette: Palette,
    minimum_contrast_ratio: f64,
    class_tokens: bool,
    cache: ContrastCache,
}

impl Resolver {
    /// `class_tokens` selects class-mode output for indexed colors.
    #[must_use]
    pub fn new(palette: Palette, minimum_contrast_ratio: f64, class_tokens: bool) -> Self {
        Self {
            palette,
            minimum_contrast_ratio,
            class_tokens,
            cache: ContrastCache::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    #[must_use]
    pub const fn cache(&self) -> &ContrastCache {
        &self.cache
    }

    #[inline]
    pub fn cache_mut(&mut self) -> &mut ContrastCache {
        &mut self.cache
    }

    /// Forget every memoized contrast adjustment.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Resolve the current attribute state.
    ///
    /// # Errors
    ///
    /// [`Error::ColorUndefined`] when an indexed color lies past the palette.
    pub fn resolve(&mut self, state: &AttrState) -> Result<ResolvedStyle> {
        let inverse = state.has(Attr::INVERSE);
        let (fg, bg) = if inverse {
            (state.bg, state.fg)
        } else {
            (state.fg, state.bg)
        };
        let bg = bg.normalized();
        let mut fg = fg.normalized();
        if state.has(Attr::BOLD) {
            fg = fg.brightened();
        }

        let (fg_default, bg_default) = if inverse {
            (self.palette.background, self.palette.foreground)
        } else {
            (self.palette.foreground, self.palette.background)
        };
        let fg_rgb = self.lookup(fg, fg_default)?;
        let bg_rgb = self.lookup(bg, bg_default)?;

        let fg_paint = match self.token(fg, inverse) {
            Some(token) => token,
            None => {
                let key = ContrastKey { bg, fg, inverse };
                let adjusted = self.enforce_contrast(key, fg_rgb, bg_rgb);
                Paint::from(adjusted.or(fg_rgb))
            }
        };
        let bg_paint = self.token(bg, inverse).unwrap_or_else(|| Paint::from(bg_rgb));

        Ok(ResolvedStyle {
            fg: fg_paint,
            bg: bg_paint,
            attrs: state.attrs.difference(Attr::INVERSE),
        })
    }

    /// RGB for a spec, or `default` for the `Default` spec.
    fn lookup(&self, spec: ColorSpec, default: Option<Rgb>) -> Result<Option<Rgb>> {
        match spec {
            ColorSpec::Default => Ok(default),
            ColorSpec::Indexed16(i) | ColorSpec::Indexed256(i) => self
                .palette
                .color(slot(i))
                .map(Some)
                .ok_or(Error::ColorUndefined(slot(i))),
            ColorSpec::TrueColor(rgb) => Ok(Some(rgb)),
        }
    }

    /// Class token for a spec, when class mode can express it.
    ///
    /// True colors have no class and always resolve to RGB.
    fn token(&self, spec: ColorSpec, inverse: bool) -> Option<Paint> {
        if !self.class_tokens {
            return None;
        }
        match spec {
            ColorSpec::Indexed16(i) | ColorSpec::Indexed256(i) => Some(Paint::Token(i.to_string())),
            ColorSpec::Default if inverse => Some(Paint::Token(INVERSE_TOKEN.to_owned())),
            ColorSpec::Default => Some(Paint::None),
            ColorSpec::TrueColor(_) => None,
        }
    }

    /// Adjusted foreground, or `None` when the pair is already readable or
    /// either side has no concrete color.
    fn enforce_contrast(
        &mut self,
        key: ContrastKey,
        fg: Option<Rgb>,
        bg: Option<Rgb>,
    ) -> Option<Rgb> {
        if self.minimum_contrast_ratio <= 1.0 {
            return None;
        }
        let (fg, bg) = (fg?, bg?);
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }
        let adjusted = ensure_contrast_ratio(fg, bg, self.minimum_contrast_ratio);
        log::trace!("contrast {fg} on {bg}: {adjusted:?}");
        self.cache.insert(key, adjusted);
        adjusted
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tint_color::{palette::ANSI16, Theme};

    fn state(params: &[u32]) -> AttrState {
        let mut s = AttrState::new();
        s.apply_sgr(params);
        s
    }

    fn inline(ratio: f64) -> Resolver {
        Resolver::new(Palette::default(), ratio, false)
    }

    fn rgb(hex: u32) -> Paint {
        Paint::Rgb(Rgb::from_packed(hex))
    }

    #[test]
    fn empty_state_is_empty_style() {
        let style = inline(3.0).resolve(&AttrState::new()).unwrap();
        assert!(style.is_empty());
    }

    #[test]
    fn flags_alone_are_not_empty() {
        let style = inline(1.0).resolve(&state(&[3])).unwrap();
        assert!(!style.is_empty());
        assert_eq!(style.attrs, Attr::ITALIC);
    }

    #[test]
    fn inverse_flag_is_not_rendered() {
        let style = inline(1.0).resolve(&state(&[7])).unwrap();
        assert!(style.is_empty());
    }

    #[test]
    fn bold_red_is_bright_red() {
        let mut r = inline(1.0);
        let bold = r.resolve(&state(&[1, 31])).unwrap();
        let bright = r.resolve(&state(&[91])).unwrap();
        assert_eq!(bold.fg, bright.fg);
        assert_eq!(bold.fg, Paint::Rgb(ANSI16[9]));
    }

    #[test]
    fn bold_does_not_brighten_background() {
        let style = inline(1.0).resolve(&state(&[1, 41])).unwrap();
        assert_eq!(style.bg, Paint::Rgb(ANSI16[1]));
    }

    #[test]
    fn low_256_indices_use_ansi_slots() {
        let style = inline(1.0).resolve(&state(&[38, 5, 2, 1])).unwrap();
        assert_eq!(style.fg, rgb(0xa5e075));
    }

    #[test]
    fn truecolor_bypasses_palette() {
        let style = inline(1.0).resolve(&state(&[38, 2, 2, 4, 6])).unwrap();
        assert_eq!(style.fg, rgb(0x020406));
    }

    #[test]
    fn out_of_range_index_is_undefined() {
        assert!(matches!(
            inline(1.0).resolve(&state(&[38, 5, 288])),
            Err(Error::ColorUndefined(288))
        ));
        assert!(matches!(
            inline(1.0).resolve(&state(&[48, 5, 728])),
            Err(Error::ColorUndefined(728))
        ));
    }

    #[test]
    fn out_of_range_index_is_undefined_in_class_mode() {
        let mut r = Resolver::new(Palette::default(), 1.0, true);
        assert!(matches!(r.resolve(&state(&[48, 5, 300])), Err(Error::ColorUndefined(300))));
    }

    #[test]
    fn theme_defaults_fill_default_slots() {
        let theme = Theme {
            foreground: Some("#eee".into()),
            ..Theme::default()
        };
        let mut r = Resolver::new(Palette::from_theme(&theme).unwrap(), 3.0, false);
        let plain = r.resolve(&AttrState::new()).unwrap();
        assert_eq!(plain.fg, rgb(0xeeeeee));
        assert_eq!(plain.bg, Paint::None);

        let inverted = r.resolve(&state(&[7])).unwrap();
        assert_eq!(inverted.fg, Paint::None);
        assert_eq!(inverted.bg, rgb(0xeeeeee));
    }

    #[test]
    fn inverse_swaps_indexed_colors() {
        let style = inline(1.0).resolve(&state(&[7, 31, 44])).unwrap();
        assert_eq!(style.fg, Paint::Rgb(ANSI16[4]));
        assert_eq!(style.bg, Paint::Rgb(ANSI16[1]));
    }

    #[test]
    fn contrast_lightens_same_color() {
        let mut r = inline(4.5);
        let style = r.resolve(&state(&[31, 41])).unwrap();
        assert_eq!(style.fg, rgb(0xffffff));
        assert_eq!(style.bg, rgb(0xe05561));

        let mut r = inline(3.0);
        assert_eq!(r.resolve(&state(&[31, 41])).unwrap().fg, rgb(0xfde3e6));
    }

    #[test]
    fn contrast_darkens_darker_foreground() {
        let style = inline(4.5).resolve(&state(&[107, 92])).unwrap();
        assert_eq!(style.fg, rgb(0x455e30));
    }

    #[test]
    fn ratio_one_disables_contrast() {
        let mut r = inline(1.0);
        assert_eq!(r.resolve(&state(&[31, 41])).unwrap().fg, rgb(0xe05561));
        assert!(r.cache().is_empty());
    }

    #[test]
    fn contrast_needs_both_colors() {
        let mut r = inline(21.0);
        assert_eq!(r.resolve(&state(&[31])).unwrap().fg, Paint::Rgb(ANSI16[1]));
        assert!(r.cache().is_empty());
    }

    #[test]
    fn cache_is_consulted_and_clearable() {
        let mut r = inline(4.5);
        let first = r.resolve(&state(&[31, 41])).unwrap();
        assert_eq!(r.cache().len(), 1);
        assert_eq!(r.resolve(&state(&[31, 41])).unwrap(), first);

        let key = ContrastKey {
            bg: ColorSpec::Indexed16(1),
            fg: ColorSpec::Indexed16(1),
            inverse: false,
        };
        r.cache_mut().insert(key, Some(Rgb::new(1, 2, 3)));
        assert_eq!(r.resolve(&state(&[31, 41])).unwrap().fg, rgb(0x010203));

        r.clear_cache();
        assert_eq!(r.resolve(&state(&[31, 41])).unwrap(), first);
    }

    #[test]
    fn cache_hit_still_checks_palette() {
        let mut r = inline(4.5);
        let key = ContrastKey {
            bg: ColorSpec::Indexed16(1),
            fg: ColorSpec::Indexed256(300),
            inverse: false,
        };
        r.cache_mut().insert(key, Some(Rgb::new(1, 2, 3)));
        assert!(matches!(
            r.resolve(&state(&[38, 5, 300, 41])),
            Err(Error::ColorUndefined(300))
        ));
    }

    #[test]
    fn bold_uses_its_own_cache_entry() {
        let mut r = inline(4.5);
        r.resolve(&state(&[31, 41])).unwrap();
        r.resolve(&state(&[1, 31, 41])).unwrap();
        assert_eq!(r.cache().len(), 2);
    }

    mod class_mode {
        use super::*;
        use pretty_assertions::assert_eq;

        fn class() -> Resolver {
            Resolver::new(Palette::default(), 1.0, true)
        }

        fn token(t: &str) -> Paint {
            Paint::Token(t.to_owned())
        }

        #[test]
        fn inverse_defaults_are_tokens() {
            let style = class().resolve(&state(&[7])).unwrap();
            assert_eq!(style.fg, token("inverse"));
            assert_eq!(style.bg, token("inverse"));
        }

        #[test]
        fn indexed_colors_are_numbers() {
            let style = class().resolve(&state(&[1, 44, 38, 5, 1])).unwrap();
            assert_eq!(style.fg, token("9"));
            assert_eq!(style.bg, token("4"));
            assert_eq!(style.attrs, Attr::BOLD);
        }

        #[test]
        fn high_indices_keep_their_number() {
            let style = class().resolve(&state(&[38, 5, 200])).unwrap();
            assert_eq!(style.fg, token("200"));
        }

        #[test]
        fn truecolor_stays_rgb() {
            let style = class()
                .resolve(&state(&[2, 31, 48, 2, 255, 240, 103, 38, 2, 2, 2, 2]))
                .unwrap();
            assert_eq!(style.fg, rgb(0x020202));
            assert_eq!(style.bg, rgb(0xfff067));
            assert_eq!(style.attrs, Attr::DIM);
        }

        #[test]
        fn plain_default_has_no_token() {
            let style = class().resolve(&state(&[4])).unwrap();
            assert_eq!(style.fg, Paint::None);
            assert_eq!(style.bg, Paint::None);
        }
    }
}
