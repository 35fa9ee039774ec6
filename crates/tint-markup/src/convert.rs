// SPDX-License-Identifier: MIT
//
// Converter: the single-pass transducer that wires everything together.
//
//   bytes ─▶ Chars ─▶ ESC? ─┬─ '[' ─▶ read_csi ─▶ AttrState::apply_sgr
//                           ├─ ']' ─▶ read_osc ─▶ MarkupWriter::set_anchor
//                           └─ else: dropped
//                   text ──▶ Resolver (only after an SGR) ─▶ MarkupWriter
//
// Output is staged per character in an `OutputBuffer` and drained into the
// sink once the character (or escape sequence) is complete, so a failure or
// cancellation never leaves half a tag behind. The sink is flushed at the
// end of the stream and on every early exit.
//
// Cancellation is cooperative: the token is polled once per top-level code
// point, never inside an escape sequence.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tint_color::{ColorError, Palette, Theme};

use crate::attr::AttrState;
use crate::error::{Error, Result};
use crate::markup::{CssClasses, InlineStyles, MarkupWriter, OutputBuffer, StyleMarkup};
use crate::scan::{self, Chars, BS, DEL, ESC, VT};
use crate::style::Resolver;

// ─── Options ─────────────────────────────────────────────────────────────────

/// How styles are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// `style="…"` properties on every span.
    #[default]
    Inline,
    /// Prefixed class names; true colors still go inline.
    Class,
}

/// Converter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub mode: Mode,
    /// Prefix for every generated class name, including the link class.
    pub class_prefix: String,
    /// WCAG contrast floor between foreground and background; `<= 1`
    /// disables adjustment.
    pub minimum_contrast_ratio: f64,
    /// Escape `< > & " '` in text and attribute values.
    pub escape_html: bool,
    pub theme: Theme,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::Inline,
            class_prefix: "ansi-".to_owned(),
            minimum_contrast_ratio: 3.0,
            escape_html: true,
            theme: Theme::default(),
        }
    }
}

// ─── Cancellation ────────────────────────────────────────────────────────────

/// Cooperative cancellation flag, cheap to clone across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every conversion polling this token to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

// ─── Converter ───────────────────────────────────────────────────────────────

/// Streaming ANSI-to-markup converter.
///
/// One instance converts one stream at a time; every method takes
/// `&mut self`, so sharing an instance across threads needs external
/// synchronization (a `Mutex`, typically). Style, anchor and cache state
/// carry over between calls: call [`Converter::reset`] between unrelated
/// streams.
pub struct Converter {
    resolver: Resolver,
    writer: MarkupWriter,
    state: AttrState,
    /// An SGR arrived since the last emitted character.
    style_changed: bool,
    out: OutputBuffer,
}

impl Converter {
    /// Build a converter, parsing the theme into a palette.
    ///
    /// # Errors
    ///
    /// [`ColorError::Invalid`] if a theme color cannot be parsed.
    pub fn new(options: Options) -> std::result::Result<Self, ColorError> {
        let palette = Palette::from_theme(&options.theme)?;
        Ok(Self::with_palette(palette, options))
    }

    /// Build a converter around an existing palette; `options.theme` is
    /// ignored.
    #[must_use]
    pub fn with_palette(palette: Palette, options: Options) -> Self {
        let markup: Box<dyn StyleMarkup + Send> = match options.mode {
            Mode::Inline => Box::new(InlineStyles::new(palette.foreground)),
            Mode::Class => Box::new(CssClasses::new(options.class_prefix.clone())),
        };
        log::debug!(
            "converter: {:?} mode, prefix {:?}, minimum contrast {}",
            options.mode,
            options.class_prefix,
            options.minimum_contrast_ratio
        );
        Self {
            resolver: Resolver::new(
                palette,
                options.minimum_contrast_ratio,
                options.mode == Mode::Class,
            ),
            writer: MarkupWriter::new(markup, options.class_prefix, options.escape_html),
            state: AttrState::new(),
            style_changed: true,
            out: OutputBuffer::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        self.resolver.palette()
    }

    /// Number of memoized contrast adjustments.
    #[inline]
    #[must_use]
    pub fn cached_contrasts(&self) -> usize {
        self.resolver.cache().len()
    }

    /// Return to the initial state, keeping palette and options.
    pub fn reset(&mut self) {
        self.state.reset();
        self.resolver.clear_cache();
        self.writer.reset();
        self.style_changed = true;
        self.out.clear();
    }

    /// Convert `src` into markup written to `dst`.
    ///
    /// # Errors
    ///
    /// See [`Converter::convert_with_cancel`].
    pub fn convert<R: Read, W: Write>(&mut self, src: R, dst: W) -> Result<()> {
        self.convert_with_cancel(src, dst, &CancelToken::new())
    }

    /// Convert `src` into markup written to `dst`, stopping early if `cancel`
    /// is tripped.
    ///
    /// On error, output up to the last completed character stays in `dst`.
    ///
    /// # Errors
    ///
    /// - [`Error::ColorUndefined`] for an indexed color outside the palette
    /// - [`Error::UnexpectedEndOfSequence`] for a malformed OSC terminator
    /// - [`Error::Cancelled`] when `cancel` is tripped
    /// - [`Error::Io`] for read or write failures
    pub fn convert_with_cancel<R: Read, W: Write>(
        &mut self,
        src: R,
        mut dst: W,
        cancel: &CancelToken,
    ) -> Result<()> {
        let mut chars = Chars::new(BufReader::new(src));
        // Attributes may carry over from a previous call whose spans were closed.
        self.style_changed = true;

        match self.run(&mut chars, &mut dst, cancel) {
            Ok(()) => {
                self.writer.finish(&mut self.out);
                self.out.flush_to(&mut dst)?;
                Ok(())
            }
            Err(err) => {
                self.out.clear();
                if let Err(flush_err) = dst.flush() {
                    log::warn!("flush after failed conversion: {flush_err}");
                }
                Err(err)
            }
        }
    }

    /// Convert a whole string in memory.
    ///
    /// # Errors
    ///
    /// Same as [`Converter::convert`], minus I/O failures.
    pub fn convert_str(&mut self, input: &str) -> Result<String> {
        let mut buf = Vec::with_capacity(input.len() * 2);
        self.convert(input.as_bytes(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn run<R: BufRead, W: Write>(
        &mut self,
        chars: &mut Chars<R>,
        dst: &mut W,
        cancel: &CancelToken,
    ) -> Result<()> {
        loop {
            if cancel.is_cancelled() {
                log::debug!("conversion cancelled");
                return Err(Error::Cancelled);
            }
            let Some(ch) = chars.next_char()? else {
                return Ok(());
            };
            match ch {
                ESC => self.escape(chars)?,
                BS | VT | DEL => {}
                _ => self.text(ch)?,
            }
            self.out.drain_to(dst)?;
        }
    }

    /// Dispatch on the code point after `ESC`.
    fn escape<R: BufRead>(&mut self, chars: &mut Chars<R>) -> Result<()> {
        match chars.next_char()? {
            Some('[') => match scan::read_csi(chars)? {
                Some(csi) if csi.is_sgr() => {
                    self.state.apply_sgr(&csi.params);
                    self.style_changed = true;
                }
                Some(csi) => log::debug!("discarding CSI {:?} {:?}", csi.params, csi.final_char),
                None => {}
            },
            Some(']') => match scan::read_osc(chars)? {
                Some(osc) if osc.is_hyperlink() => {
                    self.writer.set_anchor(&mut self.out, osc.hyperlink());
                }
                Some(osc) => log::debug!("discarding OSC mode {:?}", osc.mode),
                None => {}
            },
            Some(other) => log::trace!("ignoring ESC {other:?}"),
            None => {}
        }
        Ok(())
    }

    /// Emit one text code point, re-resolving the style first if needed.
    fn text(&mut self, ch: char) -> Result<()> {
        let style = if self.style_changed {
            Some(self.resolver.resolve(&self.state)?)
        } else {
            None
        };
        self.style_changed = false;
        self.writer.write_char(&mut self.out, style, ch);
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
