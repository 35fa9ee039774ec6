// SPDX-License-Identifier: MIT
//
// Control sequence scanner: code points in, CSI/OSC records out.
//
// Input handling is tolerant by default. Real terminal captures are full of
// sequences we don't render (cursor moves, screen clears, private modes), of
// half-written sequences cut off at a buffer edge, and of bytes that are not
// UTF-8 at all. None of that may abort a conversion:
//
// - Invalid UTF-8 decodes to U+FFFD and the stream continues.
// - CSI parameter bytes we don't understand are skipped without ending the
//   sequence; any code point outside 0x20..0x40 terminates it.
// - End of input inside a sequence drops the partial sequence.
//
// The single exception is an OSC string whose `ESC` is not followed by `\`.
// That is a framing error in the stream, not a sequence we could skip.

use std::collections::BTreeMap;
use std::io::{self, BufRead};

use crate::error::{Error, Result};
use crate::markup::Anchor;

pub const ESC: char = '\x1b';
pub const BEL: char = '\x07';
pub const BS: char = '\x08';
pub const VT: char = '\x0b';
pub const DEL: char = '\x7f';
/// 8-bit String Terminator.
pub const ST: char = '\u{9c}';

// ─── UTF-8 Decoding ──────────────────────────────────────────────────────────

/// Expected UTF-8 sequence length from the lead byte; 0 for bytes that can
/// never start a sequence.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

/// Incremental UTF-8 decoder over a buffered byte stream.
///
/// A malformed sequence yields one U+FFFD covering its lead byte and any
/// continuation bytes already consumed; the first byte that breaks the
/// sequence is left in place to start the next character.
pub struct Chars<R> {
    inner: R,
}

impl<R: BufRead> Chars<R> {
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Decode the next code point, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Propagates read errors from the underlying stream.
    pub fn next_char(&mut self) -> io::Result<Option<char>> {
        let Some(lead) = self.peek_byte()? else {
            return Ok(None);
        };
        self.inner.consume(1);

        let len = utf8_char_len(lead);
        match len {
            0 => return Ok(Some(char::REPLACEMENT_CHARACTER)),
            1 => return Ok(Some(char::from(lead))),
            _ => {}
        }

        let mut bytes = [lead, 0, 0, 0];
        for slot in bytes.iter_mut().take(len).skip(1) {
            match self.peek_byte()? {
                Some(b) if b & 0xC0 == 0x80 => {
                    *slot = b;
                    self.inner.consume(1);
                }
                _ => return Ok(Some(char::REPLACEMENT_CHARACTER)),
            }
        }
        // Catches overlong forms and surrogates the lead byte alone can't.
        Ok(Some(
            std::str::from_utf8(&bytes[..len])
                .ok()
                .and_then(|s| s.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER),
        ))
    }

    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: BufRead> Iterator for Chars<R> {
    type Item = io::Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_char().transpose()
    }
}

// ─── CSI ─────────────────────────────────────────────────────────────────────

/// A completed `ESC [ ... <final>` sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Csi {
    /// Numeric parameters; an empty slot reads as 0 and the list is never
    /// empty.
    pub params: Vec<u32>,
    /// The terminating code point.
    pub final_char: char,
}

impl Csi {
    /// Whether this is Select Graphic Rendition (`m`).
    #[inline]
    #[must_use]
    pub fn is_sgr(&self) -> bool {
        self.final_char == 'm'
    }
}

/// Anything outside `0x20..0x40` ends a CSI sequence.
#[inline]
const fn is_csi_final(c: char) -> bool {
    !matches!(c, '\x20'..='\x3f')
}

/// Read a CSI sequence body after `ESC [`.
///
/// Returns `None` if input ends before the terminator.
///
/// # Errors
///
/// Propagates read errors from the underlying stream.
pub fn read_csi<R: BufRead>(chars: &mut Chars<R>) -> io::Result<Option<Csi>> {
    let mut params = Vec::with_capacity(4);
    let mut num: u32 = 0;
    while let Some(c) = chars.next_char()? {
        if is_csi_final(c) {
            params.push(num);
            return Ok(Some(Csi {
                params,
                final_char: c,
            }));
        }
        if c == ';' {
            params.push(num);
            num = 0;
        } else if let Some(d) = c.to_digit(10) {
            num = num.saturating_mul(10).saturating_add(d);
        }
        // Private markers, intermediates and ':' are skipped.
    }
    Ok(None)
}

// ─── OSC ─────────────────────────────────────────────────────────────────────

/// Which part of `mode ; params ; url` the scanner is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OscPhase {
    Mode,
    Params,
    Url,
}

/// A completed `ESC ] mode ; params ; url ST` sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Osc {
    /// Decimal value of the digits before the first `;`, if any.
    pub mode: Option<u32>,
    pub params: String,
    pub url: String,
}

impl Osc {
    /// OSC 8: hyperlink.
    #[inline]
    #[must_use]
    pub fn is_hyperlink(&self) -> bool {
        self.mode == Some(8)
    }

    /// The anchor this sequence opens.
    ///
    /// `None` for non-hyperlink modes and for the empty URL that closes a
    /// link. Parameters are `key=value` pairs joined by `:`; anything else
    /// is dropped.
    #[must_use]
    pub fn hyperlink(&self) -> Option<Anchor> {
        if !self.is_hyperlink() || self.url.is_empty() {
            return None;
        }
        let params: BTreeMap<String, String> = self
            .params
            .split(':')
            .filter_map(|piece| {
                let mut kv = piece.split('=');
                match (kv.next(), kv.next(), kv.next()) {
                    (Some(k), Some(v), None) => Some((k.to_owned(), v.to_owned())),
                    _ => None,
                }
            })
            .collect();
        Some(Anchor {
            url: self.url.clone(),
            params,
        })
    }
}

/// Read an OSC sequence body after `ESC ]`.
///
/// Only the first two `;` separate phases; later ones belong to the URL.
/// Terminated by BEL, `ESC \` or the 8-bit ST. Returns `None` if input ends
/// first.
///
/// # Errors
///
/// [`Error::UnexpectedEndOfSequence`] when `ESC` is followed by anything but
/// `\`; read errors from the underlying stream.
pub fn read_osc<R: BufRead>(chars: &mut Chars<R>) -> Result<Option<Osc>> {
    let mut osc = Osc::default();
    let mut phase = OscPhase::Mode;
    while let Some(c) = chars.next_char()? {
        match (c, phase) {
            (BEL | ST, _) => return Ok(Some(osc)),
            (ESC, _) => {
                return match chars.next_char()? {
                    Some('\\') => Ok(Some(osc)),
                    Some(_) => Err(Error::UnexpectedEndOfSequence),
                    None => Ok(None),
                };
            }
            (';', OscPhase::Mode) => phase = OscPhase::Params,
            (';', OscPhase::Params) => phase = OscPhase::Url,
            (_, OscPhase::Mode) => {
                if let Some(d) = c.to_digit(10) {
                    let mode = osc.mode.unwrap_or(0);
                    osc.mode = Some(mode.saturating_mul(10).saturating_add(d));
                }
            }
            (_, OscPhase::Params) => osc.params.push(c),
            (_, OscPhase::Url) => osc.url.push(c),
        }
    }
    Ok(None)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
