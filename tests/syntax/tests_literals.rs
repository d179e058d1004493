//! Literal escaping round trips.

#![allow(clippy::unwrap_used)]

use rstest::rstest;

use levels::syntax::literals::{EscapeError, escape, literal_value, unescape};

#[test]
fn test_every_printable_ascii_char_round_trips() {
    for c in ' '..='~' {
        let text = format!("a{}b", c);
        assert_eq!(unescape(&escape(&text)).unwrap(), text, "char {:?}", c);
    }
}

#[rstest]
#[case("line\nbreak")]
#[case("tab\there")]
#[case("\u{8}\r\u{c}")]
#[case("quote \" and 'single'")]
#[case("Grüße, 世界 🎉")]
fn test_round_trip(#[case] text: &str) {
    let escaped = escape(text);
    assert!(escaped.is_ascii());
    assert_eq!(unescape(&escaped).unwrap(), text);
}

#[test]
fn test_escaped_body_parses_as_string_literal() {
    let text = "say \"hi\"\n";
    let token = format!("\"{}\"", escape(text));
    assert_eq!(literal_value(&token).unwrap(), text);
}

#[test]
fn test_illegal_escape() {
    assert_eq!(unescape("a\\qb"), Err(EscapeError::IllegalEscape('q')));
}
