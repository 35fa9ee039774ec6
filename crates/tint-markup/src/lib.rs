// SPDX-License-Identifier: MIT
//
// tint-markup: streaming ANSI escape sequence to HTML markup converter.
//
// A single pass over the input turns SGR styling into `<span>`s and OSC 8
// hyperlinks into `<a>`s. Colors come from a `tint_color::Palette`, can be
// pushed to a minimum WCAG contrast ratio, and render either as inline CSS
// or as prefixed class names. Every other escape sequence is consumed and
// dropped; text passes through untouched apart from HTML escaping.
//
// Spans are only opened when the resolved style actually changes, and are
// always nested inside anchors, never around them.

pub mod attr;
pub mod cache;
pub mod convert;
pub mod error;
pub mod markup;
pub mod scan;
pub mod style;

pub use attr::{Attr, AttrState, ColorMode, ColorSpec};
pub use convert::{CancelToken, Converter, Mode, Options};
pub use error::{Error, Result};
pub use markup::Anchor;
pub use style::{Paint, ResolvedStyle};
pub use tint_color::{ColorError, Palette, Theme};
