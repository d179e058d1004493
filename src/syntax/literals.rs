//! Escaping and unescaping of string and character literal bodies.
//!
//! `escape` turns arbitrary text into a body that can sit between quotes in
//! generated source; `unescape` decodes a body as written by the user. Non-ASCII
//! characters are escaped as `\uXXXX` (UTF-16 surrogate pairs above the BMP).

use thiserror::Error;

/// Malformed escape sequence in a literal body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
    #[error("illegal escape character '\\{0}'")]
    IllegalEscape(char),
    #[error("dangling backslash at end of literal")]
    DanglingBackslash,
    #[error("malformed unicode escape")]
    MalformedUnicode,
    #[error("unpaired surrogate \\u{0:04x}")]
    UnpairedSurrogate(u32),
}

/// Escape `text` so it can be written between double quotes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out
}

/// Decode the escape sequences of a literal body.
pub fn unescape(body: &str) -> Result<String, EscapeError> {
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(body.len());
    let mut idx = 0;
    while idx < chars.len() {
        let c = chars[idx];
        if c != '\\' {
            out.push(c);
            idx += 1;
            continue;
        }
        let Some(&next) = chars.get(idx + 1) else {
            return Err(EscapeError::DanglingBackslash);
        };
        idx += 2;
        match next {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'r' => out.push('\r'),
            'f' => out.push('\u{c}'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            '0'..='7' => {
                // up to three octal digits, value at most \377
                let max_len = if next <= '3' { 3 } else { 2 };
                let mut value = next.to_digit(8).unwrap_or(0);
                let mut len = 1;
                while len < max_len {
                    match chars.get(idx).and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            idx += 1;
                            len += 1;
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).ok_or(EscapeError::MalformedUnicode)?);
            }
            'u' => {
                let (unit, after) = read_unicode_unit(&chars, idx)?;
                idx = after;
                if (0xD800..0xDC00).contains(&unit) {
                    // high surrogate: a low surrogate escape must follow
                    if chars.get(idx) == Some(&'\\') && chars.get(idx + 1) == Some(&'u') {
                        let (low, after_low) = read_unicode_unit(&chars, idx + 2)?;
                        if !(0xDC00..0xE000).contains(&low) {
                            return Err(EscapeError::UnpairedSurrogate(unit));
                        }
                        let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                        out.push(char::from_u32(combined).ok_or(EscapeError::MalformedUnicode)?);
                        idx = after_low;
                    } else {
                        return Err(EscapeError::UnpairedSurrogate(unit));
                    }
                } else if (0xDC00..0xE000).contains(&unit) {
                    return Err(EscapeError::UnpairedSurrogate(unit));
                } else {
                    out.push(char::from_u32(unit).ok_or(EscapeError::MalformedUnicode)?);
                }
            }
            other => return Err(EscapeError::IllegalEscape(other)),
        }
    }
    Ok(out)
}

/// Read the four hex digits of a `\u` escape starting at `start` (any extra
/// `u` characters are skipped). Returns the code unit and the next index.
fn read_unicode_unit(chars: &[char], start: usize) -> Result<(u32, usize), EscapeError> {
    let mut idx = start;
    while chars.get(idx) == Some(&'u') {
        idx += 1;
    }
    let digits: String = chars
        .get(idx..idx + 4)
        .ok_or(EscapeError::MalformedUnicode)?
        .iter()
        .collect();
    let unit = u32::from_str_radix(&digits, 16).map_err(|_| EscapeError::MalformedUnicode)?;
    Ok((unit, idx + 4))
}

/// Strip the surrounding quotes of a literal token and decode its body.
pub fn literal_value(token: &str) -> Result<String, EscapeError> {
    let inner = token
        .strip_prefix(['"', '\''])
        .and_then(|s| s.strip_suffix(['"', '\'']))
        .unwrap_or(token);
    unescape(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_printable_ascii_round_trips() {
        let all: String = (0x20u8..=0x7e).map(char::from).collect();
        assert_eq!(unescape(&escape(&all)).unwrap(), all);
    }

    #[rstest]
    #[case("\n", "\\n")]
    #[case("\t", "\\t")]
    #[case("\u{8}", "\\b")]
    #[case("\r", "\\r")]
    #[case("\u{c}", "\\f")]
    fn test_control_escapes(#[case] raw: &str, #[case] escaped: &str) {
        assert_eq!(escape(raw), escaped);
        assert_eq!(unescape(escaped).unwrap(), raw);
    }

    #[rstest]
    #[case("é")]
    #[case("日本語")]
    #[case("😀 grin")]
    #[case("\u{0}\u{7f}")]
    fn test_non_ascii_round_trips(#[case] raw: &str) {
        let escaped = escape(raw);
        assert!(escaped.is_ascii());
        assert_eq!(unescape(&escaped).unwrap(), raw);
    }

    #[test]
    fn test_surrogate_pair_encoding() {
        assert_eq!(escape("😀"), "\\ud83d\\ude00");
    }

    #[test]
    fn test_octal_escapes() {
        assert_eq!(unescape("\\0").unwrap(), "\0");
        assert_eq!(unescape("\\101").unwrap(), "A");
        assert_eq!(unescape("\\477").unwrap(), "'7");
    }

    #[test]
    fn test_malformed_sequences() {
        assert_eq!(unescape("\\q"), Err(EscapeError::IllegalEscape('q')));
        assert_eq!(unescape("abc\\"), Err(EscapeError::DanglingBackslash));
        assert_eq!(unescape("\\u12"), Err(EscapeError::MalformedUnicode));
        assert_eq!(
            unescape("\\ud83d"),
            Err(EscapeError::UnpairedSurrogate(0xd83d))
        );
    }

    #[test]
    fn test_literal_value_strips_quotes() {
        assert_eq!(literal_value("\"a\\tb\"").unwrap(), "a\tb");
        assert_eq!(literal_value("'\\n'").unwrap(), "\n");
    }
}
