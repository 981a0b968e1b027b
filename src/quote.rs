/// Render `value` as a double-quoted segment that parses back to `value`.
///
/// Control characters are escaped; everything else, including non-ASCII, is
/// written as-is.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            ch if u32::from(ch) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", u32::from(ch)));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::parse_line;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn escapes_quotes_and_control_characters() {
        assert_eq!(quote(""), r#""""#);
        assert_eq!(quote("plain"), r#""plain""#);
        assert_eq!(quote("a \"b\" \\c"), r#""a \"b\" \\c""#);
        assert_eq!(quote("x\ny\tz\r"), r#""x\ny\tz\r""#);
        assert_eq!(quote("\u{1}\u{1f}"), r#""\u0001\u001f""#);
        assert_eq!(quote("# '☃'"), "\"# '☃'\"");
    }

    #[test]
    fn quoted_values_parse_back() {
        for value in ["", " padded ", "# not a comment", "\u{1F601}", "a'b\"c\\d"] {
            let line = format!("KEY={}", quote(value));
            let parsed = parse_line(line.as_bytes()).expect("quoted value should parse");
            assert_eq!(parsed.value, value);
        }
    }

    proptest! {
        #[test]
        fn round_trips_through_double_quotes(
            key in "[A-Za-z_][A-Za-z0-9_]{0,12}",
            value in any::<String>(),
        ) {
            let line = format!("{key}={}", quote(&value));
            let parsed = parse_line(line.as_bytes())
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            prop_assert_eq!(parsed.key, key.as_str());
            prop_assert_eq!(parsed.value, value);
        }

        #[test]
        fn reparsing_a_parsed_line_is_stable(
            value in r#"[ -~]{0,24}"#,
        ) {
            let line = format!("KEY={value}");
            if let Ok(first) = parse_line(line.as_bytes()) {
                let requoted = format!("KEY={}", quote(&first.value));
                let second = parse_line(requoted.as_bytes())
                    .map_err(|err| TestCaseError::fail(err.to_string()))?;
                prop_assert_eq!(second, first);
            }
        }
    }
}
