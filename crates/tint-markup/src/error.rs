// SPDX-License-Identifier: MIT
//
// Conversion errors.
//
// Malformed escape sequences never show up here: the scanner swallows them.
// What remains is the short list of conditions that abort a conversion and
// leave the caller with partial output.

use std::io;

use thiserror::Error;

/// Conversion error type.
#[derive(Error, Debug)]
pub enum Error {
    /// An indexed color points past the end of the palette.
    #[error("color index {0} is undefined")]
    ColorUndefined(usize),

    /// An OSC sequence saw `ESC` followed by something other than `\`.
    #[error("unexpected end of escape sequence")]
    UnexpectedEndOfSequence,

    /// Reserved for sequences the converter recognizes but cannot render.
    #[error("not supported")]
    NotSupported,

    /// The caller's [`CancelToken`](crate::CancelToken) was tripped.
    #[error("conversion cancelled")]
    Cancelled,

    /// Read or write failure on the underlying stream.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(Error::ColorUndefined(288).to_string(), "color index 288 is undefined");
        assert_eq!(Error::Cancelled.to_string(), "conversion cancelled");
    }

    #[test]
    fn io_errors_are_transparent() {
        let err = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(err.to_string(), "pipe closed");
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }
}
