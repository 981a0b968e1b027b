use crate::error::ParseErrorKind;
use crate::model::ParsedLine;

const EXPORT_PREFIX: &[u8] = b"export ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    DoubleQuote,
    SingleQuote,
    Escape,
}

/// Parse one line (without its terminator) into a key and an unescaped value.
///
/// Lines that are empty, whitespace-only, or start with `#` yield a blank
/// [`ParsedLine`]. The key borrows from `line`; the value is the only
/// allocation.
pub fn parse_line(line: &[u8]) -> Result<ParsedLine<'_>, ParseErrorKind> {
    let trimmed = trim(line);
    if trimmed.is_empty() || trimmed[0] == b'#' {
        return Ok(ParsedLine::default());
    }

    let Some(eq_idx) = trimmed.iter().position(|byte| *byte == b'=') else {
        return Err(ParseErrorKind::MissingSeparator);
    };

    let key = trim(&trimmed[..eq_idx]);
    let key = key.strip_prefix(EXPORT_PREFIX).unwrap_or(key);
    let key = validate_key(key)?;

    let value = unescape_value(trim(&trimmed[eq_idx + 1..]))?;
    Ok(ParsedLine { key, value })
}

fn trim(bytes: &[u8]) -> &[u8] {
    let is_space = |byte: &u8| *byte == b' ' || *byte == b'\t';
    let start = bytes
        .iter()
        .position(|byte| !is_space(byte))
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|byte| !is_space(byte))
        .map_or(start, |idx| idx + 1);
    &bytes[start..end]
}

fn validate_key(key: &[u8]) -> Result<&str, ParseErrorKind> {
    let Some((&first, rest)) = key.split_first() else {
        return Err(ParseErrorKind::EmptyKey);
    };
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return Err(ParseErrorKind::InvalidKey {
            byte: first,
            position: 0,
        });
    }
    if let Some(idx) = rest
        .iter()
        .position(|byte| !(byte.is_ascii_alphanumeric() || *byte == b'_'))
    {
        return Err(ParseErrorKind::InvalidKey {
            byte: rest[idx],
            position: idx + 1,
        });
    }

    // All bytes were checked to be ASCII above.
    Ok(std::str::from_utf8(key)?)
}

/// Scan a trimmed value, resolving quotes, escapes, and trailing comments.
///
/// Escapes only ever shrink their input, so `out` never grows past the
/// capacity reserved up front.
fn unescape_value(value: &[u8]) -> Result<String, ParseErrorKind> {
    let mut out = Vec::with_capacity(value.len());
    // Length of `out` up to and including the last byte that must survive
    // trailing-whitespace trimming.
    let mut last_significant = 0usize;
    let mut mode = Mode::Normal;
    let mut idx = 0usize;

    while idx < value.len() {
        let byte = value[idx];
        idx += 1;

        if byte < 0x20 {
            return Err(ParseErrorKind::InvalidValue(byte));
        }

        // Only ASCII has special meaning, multibyte sequences pass through.
        if byte >= 0x80 {
            if mode == Mode::Escape {
                return Err(ParseErrorKind::MultibyteEscape);
            }
            out.push(byte);
            last_significant = out.len();
            continue;
        }

        match mode {
            Mode::Normal => match byte {
                b'"' => mode = Mode::DoubleQuote,
                b'\'' => mode = Mode::SingleQuote,
                b'#' => break,
                // Tabs never get here: they are control bytes.
                b' ' => out.push(byte),
                _ => {
                    out.push(byte);
                    last_significant = out.len();
                }
            },
            Mode::DoubleQuote => match byte {
                b'"' => mode = Mode::Normal,
                b'\\' => mode = Mode::Escape,
                _ => {
                    out.push(byte);
                    last_significant = out.len();
                }
            },
            Mode::SingleQuote => {
                if byte == b'\'' {
                    mode = Mode::Normal;
                } else {
                    out.push(byte);
                    last_significant = out.len();
                }
            }
            Mode::Escape => {
                match byte {
                    b'"' => out.push(b'"'),
                    b'\\' => out.push(b'\\'),
                    b'n' => out.push(b'\n'),
                    b't' => out.push(b'\t'),
                    b'r' => out.push(b'\r'),
                    b'u' => idx = decode_unicode_escape(value, idx, &mut out)?,
                    other => return Err(ParseErrorKind::InvalidEscape(other)),
                }
                last_significant = out.len();
                mode = Mode::DoubleQuote;
            }
        }
    }

    match mode {
        Mode::Normal => {}
        Mode::DoubleQuote => return Err(ParseErrorKind::UnmatchedDouble),
        Mode::SingleQuote => return Err(ParseErrorKind::UnmatchedSingle),
        Mode::Escape => return Err(ParseErrorKind::IncompleteEscape),
    }

    out.truncate(last_significant);
    String::from_utf8(out).map_err(|err| ParseErrorKind::InvalidUtf8(err.utf8_error()))
}

/// Decode the `XXXX` of a `\uXXXX` escape starting at `start`, plus the
/// trailing low surrogate when the first unit is a high surrogate.
///
/// Returns the index just past the consumed input.
fn decode_unicode_escape(
    value: &[u8],
    start: usize,
    out: &mut Vec<u8>,
) -> Result<usize, ParseErrorKind> {
    let unit = read_code_unit(value, start)?;
    let mut end = start + 4;

    let scalar = match unit {
        0xD800..=0xDBFF => {
            let low = value
                .get(end..end + 2)
                .filter(|prefix| *prefix == b"\\u")
                .and_then(|_| read_code_unit(value, end + 2).ok())
                .filter(|low| (0xDC00..=0xDFFF).contains(low))
                .ok_or(ParseErrorKind::IncompleteSurrogate)?;
            end += 6;
            0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
        }
        0xDC00..=0xDFFF => return Err(ParseErrorKind::IncompleteSurrogate),
        _ => u32::from(unit),
    };

    let ch = char::from_u32(scalar).ok_or(ParseErrorKind::IncompleteSurrogate)?;
    let mut buf = [0u8; 4];
    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
    Ok(end)
}

fn read_code_unit(value: &[u8], start: usize) -> Result<u16, ParseErrorKind> {
    let Some(digits) = value.get(start..start + 4) else {
        return Err(ParseErrorKind::IncompleteHex);
    };

    let mut unit = 0u16;
    for &digit in digits {
        let nibble = match digit {
            b'0'..=b'9' => digit - b'0',
            b'a'..=b'f' => digit - b'a' + 10,
            b'A'..=b'F' => digit - b'A' + 10,
            0x00..=0x1f => return Err(ParseErrorKind::InvalidValue(digit)),
            0x80..=0xff => return Err(ParseErrorKind::MultibyteEscape),
            _ => return Err(ParseErrorKind::InvalidHex(digit)),
        };
        unit = (unit << 4) | u16::from(nibble);
    }
    Ok(unit)
}
