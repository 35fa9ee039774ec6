//! Palettes: the bridge from a user theme to concrete slot colors.
//!
//! The 256-color palette consists of:
//! - Colors 0–15: the sixteen ANSI colors (overridable by a [`Theme`])
//! - Colors 16–231: a 6×6×6 RGB color cube
//! - Colors 232–255: a 24-step grayscale ramp
//!
//! A palette is built once per converter and never mutated afterwards.

use serde::Deserialize;

use crate::parse::parse_color;
use crate::rgb::Rgb;

/// Number of palette slots addressable by SGR `38;5;N` / `48;5;N`.
pub const PALETTE_SIZE: usize = 256;

/// Default ANSI-16 colors.
///
/// Slots 0–7 answer SGR 30–37 / 40–47, slots 8–15 answer SGR 90–97 / 100–107
/// and the bold-bright remap.
pub const ANSI16: [Rgb; 16] = [
    Rgb::new(0x3f, 0x44, 0x51), // 0: Black
    Rgb::new(0xe0, 0x55, 0x61), // 1: Red
    Rgb::new(0x8c, 0xc2, 0x65), // 2: Green
    Rgb::new(0xd1, 0x8f, 0x52), // 3: Yellow
    Rgb::new(0x4a, 0xa5, 0xf0), // 4: Blue
    Rgb::new(0xc1, 0x62, 0xde), // 5: Magenta
    Rgb::new(0x42, 0xb3, 0xc2), // 6: Cyan
    Rgb::new(0xe6, 0xe6, 0xe6), // 7: White
    Rgb::new(0x4f, 0x56, 0x66), // 8: Gray
    Rgb::new(0xff, 0x61, 0x6e), // 9: Bright Red
    Rgb::new(0xa5, 0xe0, 0x75), // 10: Bright Green
    Rgb::new(0xf0, 0xa4, 0x5d), // 11: Bright Yellow
    Rgb::new(0x4d, 0xc4, 0xff), // 12: Bright Blue
    Rgb::new(0xde, 0x73, 0xff), // 13: Bright Magenta
    Rgb::new(0x4c, 0xd1, 0xe0), // 14: Bright Cyan
    Rgb::new(0xd7, 0xda, 0xe0), // 15: Bright White
];

/// The full default 256-color table.
pub static DEFAULT_COLORS: [Rgb; PALETTE_SIZE] = build_default_colors();

#[allow(clippy::cast_possible_truncation)] // idx < 256 throughout.
const fn build_default_colors() -> [Rgb; PALETTE_SIZE] {
    let mut colors = [Rgb::BLACK; PALETTE_SIZE];
    let mut idx = 0;
    while idx < PALETTE_SIZE {
        colors[idx] = match idx {
            0..=15 => ANSI16[idx],
            16..=231 => {
                let i = (idx - 16) as u8;
                Rgb::new(cube_level(i / 36), cube_level((i % 36) / 6), cube_level(i % 6))
            }
            _ => {
                let v = 8 + 10 * (idx - 232) as u8;
                Rgb::new(v, v, v)
            }
        };
        idx += 1;
    }
    colors
}

/// The cube uses: 0, 95, 135, 175, 215, 255.
const fn cube_level(i: u8) -> u8 {
    if i == 0 { 0 } else { 55 + 40 * i }
}

// ─── Theme ───────────────────────────────────────────────────────────────────

/// User-facing color overrides, each in any syntax [`parse_color`] accepts.
///
/// Unset slots keep the default palette. `foreground`/`background` have no
/// default: without them, uncolored text gets no color at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Theme {
    pub foreground: Option<String>,
    pub background: Option<String>,
    pub black: Option<String>,
    pub red: Option<String>,
    pub green: Option<String>,
    pub yellow: Option<String>,
    pub blue: Option<String>,
    pub magenta: Option<String>,
    pub cyan: Option<String>,
    pub white: Option<String>,
    pub gray: Option<String>,
    pub bright_red: Option<String>,
    pub bright_green: Option<String>,
    pub bright_yellow: Option<String>,
    pub bright_blue: Option<String>,
    pub bright_magenta: Option<String>,
    pub bright_cyan: Option<String>,
    pub bright_white: Option<String>,
}

impl Theme {
    /// The sixteen ANSI slots in palette order, paired with their names.
    fn ansi_slots(&self) -> [(&'static str, Option<&str>); 16] {
        [
            ("black", self.black.as_deref()),
            ("red", self.red.as_deref()),
            ("green", self.green.as_deref()),
            ("yellow", self.yellow.as_deref()),
            ("blue", self.blue.as_deref()),
            ("magenta", self.magenta.as_deref()),
            ("cyan", self.cyan.as_deref()),
            ("white", self.white.as_deref()),
            ("gray", self.gray.as_deref()),
            ("bright-red", self.bright_red.as_deref()),
            ("bright-green", self.bright_green.as_deref()),
            ("bright-yellow", self.bright_yellow.as_deref()),
            ("bright-blue", self.bright_blue.as_deref()),
            ("bright-magenta", self.bright_magenta.as_deref()),
            ("bright-cyan", self.bright_cyan.as_deref()),
            ("bright-white", self.bright_white.as_deref()),
        ]
    }

    /// Layer `other` on top of `self`: fields set in `other` win.
    #[must_use]
    pub fn merged_with(mut self, other: &Self) -> Self {
        macro_rules! layer {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() {
                    self.$field.clone_from(&other.$field);
                })*
            };
        }
        layer!(
            foreground, background, black, red, green, yellow, blue, magenta, cyan, white, gray,
            bright_red, bright_green, bright_yellow, bright_blue, bright_magenta, bright_cyan,
            bright_white,
        );
        self
    }
}

/// A theme value that could not be parsed as a color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid color {value:?} for theme slot `{slot}`")]
    Invalid { slot: &'static str, value: String },
}

// ─── Palette ─────────────────────────────────────────────────────────────────

/// Resolved palette: 256 slot colors plus optional explicit defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
    /// Color for text with no SGR foreground.
    pub foreground: Option<Rgb>,
    /// Color for text with no SGR background.
    pub background: Option<Rgb>,
}

impl Palette {
    /// Build a palette from theme overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::Invalid`] naming the first slot whose value is
    /// not a recognizable color.
    pub fn from_theme(theme: &Theme) -> Result<Self, ColorError> {
        let parse = |slot: &'static str, value: Option<&str>| -> Result<Option<Rgb>, ColorError> {
            value
                .map(|v| {
                    parse_color(v).ok_or_else(|| ColorError::Invalid {
                        slot,
                        value: v.to_owned(),
                    })
                })
                .transpose()
        };

        let mut palette = Self::default();
        for (idx, (slot, value)) in theme.ansi_slots().into_iter().enumerate() {
            if let Some(rgb) = parse(slot, value)? {
                palette.colors[idx] = rgb;
            }
        }
        palette.foreground = parse("foreground", theme.foreground.as_deref())?;
        palette.background = parse("background", theme.background.as_deref())?;
        log::debug!(
            "palette built: foreground {:?}, background {:?}",
            palette.foreground,
            palette.background
        );
        Ok(palette)
    }

    /// Slot color, or `None` past the end of the palette.
    #[inline]
    #[must_use]
    pub fn color(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    /// Number of slots (always [`PALETTE_SIZE`]).
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS,
            foreground: None,
            background: None,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
