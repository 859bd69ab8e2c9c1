use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_while, take_while1};
use nom::character::complete::{anychar, char, multispace1, not_line_ending};
use nom::combinator::{recognize, value};
use nom::multi::many0;
use nom::sequence::{delimited, pair};
use nom::IResult;

fn is_identifier_start(chr: char) -> bool {
    chr.is_ascii_alphabetic() || chr == '_'
}

fn is_identifier_char(chr: char) -> bool {
    chr.is_ascii_alphanumeric() || chr == '_'
}

/// Whitespace and `//` comments.
pub fn space(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            multispace1,
            recognize(pair(tag("//"), not_line_ending)),
        ))),
    )(input)
}

pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(is_identifier_start),
        take_while(is_identifier_char),
    ))(input)
}

/// Body of a double-quoted literal, escapes left as written.
pub fn string_body(input: &str) -> IResult<&str, &str> {
    delimited(
        char('"'),
        recognize(many0(alt((
            is_not("\"\\\n"),
            recognize(pair(char('\\'), anychar)),
        )))),
        char('"'),
    )(input)
}

#[test]
fn test_valid_identifiers() {
    assert_eq!(identifier("hello"), Ok(("", "hello")));
    assert_eq!(identifier("hello_world"), Ok(("", "hello_world")));
    assert_eq!(identifier("_tmp1 := 2"), Ok((" := 2", "_tmp1")));
    assert!(identifier("1abc").is_err());
}

#[test]
fn test_space_skips_comments() {
    assert_eq!(space("  // note\n\tx"), Ok(("x", ())));
    assert_eq!(space("x"), Ok(("x", ())));
}

#[test]
fn test_string_body() {
    assert_eq!(string_body("\"hi\" rest"), Ok((" rest", "hi")));
    assert_eq!(string_body("\"\""), Ok(("", "")));
    assert_eq!(string_body("\"say \\\"hi\\\"\""), Ok(("", "say \\\"hi\\\"")));
    assert!(string_body("\"open").is_err());
}
