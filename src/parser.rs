use std::collections::HashMap;
use std::io::BufRead;

use tracing::{debug, trace};

use crate::error::{ParseError, ParseErrorKind};
use crate::line::parse_line;

/// Parse `KEY=VALUE` lines from a buffered reader into a map.
///
/// Stops at the first invalid line. Later assignments to the same key win.
pub fn parse_reader<R: BufRead>(mut reader: R) -> Result<HashMap<String, String>, ParseError> {
    let mut env = HashMap::new();
    let mut buf = Vec::new();
    let mut line_num = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|err| ParseError::new(0, ParseErrorKind::Read(err)))?;
        if read == 0 {
            break;
        }
        line_num += 1;

        let parsed =
            parse_line(strip_terminator(&buf)).map_err(|kind| ParseError::new(line_num, kind))?;
        if parsed.is_blank() {
            continue;
        }

        trace!(line = line_num, key = parsed.key, "parsed assignment");
        env.insert(parsed.key.to_owned(), parsed.value);
    }

    debug!(lines = line_num, entries = env.len(), "parsed env input");
    Ok(env)
}

/// Parse `KEY=VALUE` lines from UTF-8 text.
pub fn parse_str(input: &str) -> Result<HashMap<String, String>, ParseError> {
    parse_bytes(input.as_bytes())
}

/// Parse `KEY=VALUE` lines from raw bytes.
pub fn parse_bytes(input: &[u8]) -> Result<HashMap<String, String>, ParseError> {
    parse_reader(input)
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
