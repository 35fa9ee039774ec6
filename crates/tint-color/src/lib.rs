//! # tint-color: color model for ANSI-to-HTML conversion
//!
//! Everything the converter needs to know about color, and nothing about
//! escape sequences or markup:
//!
//! ```text
//! Theme (user strings)
//!     │  parse.rs / named.rs: hex, rgb(), hsl(), CSS names
//!     ▼
//! Palette: 256 slots + optional default fg/bg
//!     │
//!     ▼
//! contrast.rs: WCAG luminance and minimum-ratio enforcement
//! ```
//!
//! Palettes are built once and are read-only afterwards; the conversion hot
//! path only indexes into them.

pub mod builtin;
pub mod contrast;
pub mod named;
pub mod palette;
pub mod parse;
pub mod rgb;

pub use contrast::{contrast_ratio, ensure_contrast_ratio, relative_luminance};
pub use palette::{ColorError, Palette, Theme, PALETTE_SIZE};
pub use parse::parse_color;
pub use rgb::Rgb;
