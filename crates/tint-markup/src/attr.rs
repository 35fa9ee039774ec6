// SPDX-License-Identifier: MIT
//
// SGR attribute state: what the terminal would be drawing with right now.
//
// The scanner hands every completed `CSI ... m` parameter list to
// `AttrState::apply_sgr`. The state is raw: colors stay as the stream named
// them (palette index, 24-bit value, or "default"). Inversion, bold-bright
// remapping and palette lookup all happen later, in the style resolver, so
// that the state itself is cheap to mutate and trivially comparable.
//
// Extended colors tolerate truncation the way real terminals do:
//
//   38;5       → palette index 0
//   38;2;R;G   → RGB 0 (missing blue)
//
// A truncated group consumes the rest of the parameter list.

use tint_color::Rgb;

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// ```
    /// use tint_markup::Attr;
    ///
    /// let style = Attr::BOLD | Attr::ITALIC;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1: increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 2: decreased intensity (faint).
        const DIM       = 1 << 1;
        /// SGR 3: italic.
        const ITALIC    = 1 << 2;
        /// SGR 4: underline.
        const UNDERLINE = 1 << 3;
        /// SGR 7: swap foreground and background.
        const INVERSE   = 1 << 4;
        /// SGR 8: invisible text.
        const HIDDEN    = 1 << 5;
        /// SGR 9: crossed-out text.
        const STRIKE    = 1 << 6;
    }
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// How a color slot is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    /// No color set; the theme default (if any) applies.
    #[default]
    Default,
    /// One of the sixteen ANSI slots (SGR 30–37, 90–97 and friends).
    Indexed16,
    /// A 256-color palette slot (`38;5;N`).
    Indexed256,
    /// A raw 24-bit value (`38;2;R;G;B`).
    TrueColor,
}

/// A color slot as set by the stream.
///
/// Indices are kept as received; an index past the palette is only an error
/// once something tries to render with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpec {
    #[default]
    Default,
    Indexed16(u32),
    Indexed256(u32),
    TrueColor(Rgb),
}

impl ColorSpec {
    #[inline]
    #[must_use]
    pub const fn mode(self) -> ColorMode {
        match self {
            Self::Default => ColorMode::Default,
            Self::Indexed16(_) => ColorMode::Indexed16,
            Self::Indexed256(_) => ColorMode::Indexed256,
            Self::TrueColor(_) => ColorMode::TrueColor,
        }
    }

    /// Palette index for indexed modes.
    #[inline]
    #[must_use]
    pub const fn index(self) -> Option<u32> {
        match self {
            Self::Indexed16(i) | Self::Indexed256(i) => Some(i),
            Self::Default | Self::TrueColor(_) => None,
        }
    }

    /// 256-color indices below 16 are the ANSI slots and behave as such.
    #[inline]
    #[must_use]
    pub const fn normalized(self) -> Self {
        match self {
            Self::Indexed256(i) if i < 16 => Self::Indexed16(i),
            other => other,
        }
    }

    /// Bold-bright remap: indices 0–7 move to their bright variants 8–15.
    #[inline]
    #[must_use]
    pub const fn brightened(self) -> Self {
        match self {
            Self::Indexed16(i) if i < 8 => Self::Indexed16(i + 8),
            Self::Indexed256(i) if i < 8 => Self::Indexed256(i + 8),
            other => other,
        }
    }
}

/// Outcome of decoding the selector and operands after SGR 38/48.
enum Extended {
    /// A complete group; `usize` counts the parameters consumed after 38/48.
    Complete(ColorSpec, usize),
    /// Operands ran out; the color is set to zero and the list is exhausted.
    Truncated(ColorSpec),
    /// No selector, or one that is neither 2 nor 5.
    Unknown,
}

fn extended_color(rest: &[u32]) -> Extended {
    match rest.first() {
        Some(5) => rest
            .get(1)
            .map_or(Extended::Truncated(ColorSpec::Indexed256(0)), |&n| {
                Extended::Complete(ColorSpec::Indexed256(n), 2)
            }),
        Some(2) => match rest.get(1..4) {
            Some(&[r, g, b]) => Extended::Complete(ColorSpec::TrueColor(Rgb::from_channels(r, g, b)), 4),
            _ => Extended::Truncated(ColorSpec::TrueColor(Rgb::BLACK)),
        },
        _ => Extended::Unknown,
    }
}

// ─── Attribute State ─────────────────────────────────────────────────────────

/// Current SGR state: two color slots plus attribute flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttrState {
    pub fg: ColorSpec,
    pub bg: ColorSpec,
    pub attrs: Attr,
}

impl AttrState {
    /// No colors, no flags.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: ColorSpec::Default,
            bg: ColorSpec::Default,
            attrs: Attr::empty(),
        }
    }

    /// Back to [`AttrState::new`] (SGR 0).
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether any of `attr` is set.
    #[inline]
    #[must_use]
    pub const fn has(&self, attr: Attr) -> bool {
        self.attrs.intersects(attr)
    }

    /// Apply one SGR parameter list.
    ///
    /// An empty list never reaches here: `CSI m` arrives as `[0]`.
    pub fn apply_sgr(&mut self, params: &[u32]) {
        let mut i = 0;
        while i < params.len() {
            let code = params[i];
            i += 1;
            match code {
                0 => self.reset(),
                1 => self.attrs.insert(Attr::BOLD),
                2 => self.attrs.insert(Attr::DIM),
                3 => self.attrs.insert(Attr::ITALIC),
                4 => self.attrs.insert(Attr::UNDERLINE),
                // Blink: accepted, never rendered.
                5 | 6 => {}
                7 => self.attrs.insert(Attr::INVERSE),
                8 => self.attrs.insert(Attr::HIDDEN),
                9 => self.attrs.insert(Attr::STRIKE),
                30..=37 => self.fg = ColorSpec::Indexed16(code - 30),
                39 => self.fg = ColorSpec::Default,
                40..=47 => self.bg = ColorSpec::Indexed16(code - 40),
                49 => self.bg = ColorSpec::Default,
                90..=97 => self.fg = ColorSpec::Indexed16(code - 90 + 8),
                100..=107 => self.bg = ColorSpec::Indexed16(code - 100 + 8),
                38 | 48 => {
                    let slot = if code == 38 { &mut self.fg } else { &mut self.bg };
                    match extended_color(&params[i..]) {
                        Extended::Complete(spec, used) => {
                            *slot = spec;
                            i += used;
                        }
                        Extended::Truncated(spec) => {
                            *slot = spec;
                            return;
                        }
                        // The selector gets its own turn as a plain code.
                        Extended::Unknown => {}
                    }
                }
                _ => log::trace!("ignoring SGR code {code}"),
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
