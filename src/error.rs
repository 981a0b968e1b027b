use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Errors returned by the file loader.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A parse failure and the 1-based line it occurred on.
///
/// Line `0` means the underlying reader failed rather than any line's content.
#[derive(Debug)]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.line > 0 {
            write!(f, "error on line {}: {}", self.line, self.kind)
        } else {
            write!(f, "error reading: {}", self.kind)
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Why a single line was rejected.
///
/// Match on the variant; the messages are for humans.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("missing \"=\"")]
    MissingSeparator,
    #[error("empty key")]
    EmptyKey,
    #[error(
        "key must match [A-Za-z_][A-Za-z0-9_]* but found '{}' at position {position}",
        escaped(.byte)
    )]
    InvalidKey { byte: u8, position: usize },
    #[error("0x{0:02x} is an invalid value character")]
    InvalidValue(u8),
    #[error("unmatched \"")]
    UnmatchedDouble,
    #[error("unmatched '")]
    UnmatchedSingle,
    #[error("invalid escape sequence: \\{}", escaped(.0))]
    InvalidEscape(u8),
    #[error("incomplete escape sequence")]
    IncompleteEscape,
    #[error("incomplete \\u escape: expected 4 hex digits")]
    IncompleteHex,
    #[error("invalid hex digit '{}' in \\u escape", escaped(.0))]
    InvalidHex(u8),
    #[error("incomplete UTF-16 surrogate pair")]
    IncompleteSurrogate,
    #[error("multibyte characters disallowed in escape sequences")]
    MultibyteEscape,
    #[error("value is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Read(#[from] std::io::Error),
}

fn escaped(byte: &u8) -> std::ascii::EscapeDefault {
    byte.escape_ascii()
}
