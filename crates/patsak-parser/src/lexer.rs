//! Lexical-level combinators: identifiers, numbers, string literals. Called
//! directly on the parser's remaining input slice; the surrounding grammar
//! (in `grammar.rs`) owns whitespace skipping and position tracking.

use nom::character::complete::{char, digit1, satisfy};
use nom::combinator::{opt, recognize};
use nom::sequence::pair;
use nom::IResult;

pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_ident_start), |i| {
        nom::bytes::complete::take_while(is_ident_continue)(i)
    }))(input)
}

pub fn uint(input: &str) -> IResult<&str, usize> {
    let (rest, digits) = digit1(input)?;
    let n: usize = digits
        .parse()
        .map_err(|_| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit)))?;
    Ok((rest, n))
}

pub fn number(input: &str) -> IResult<&str, f64> {
    let (rest, text) = recognize(pair(digit1, opt(pair(char('.'), digit1))))(input)?;
    let value: f64 = text
        .parse()
        .map_err(|_| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit)))?;
    Ok((rest, value))
}

/// A single- or double-quoted string literal with `\\`, `\n`, `\t` escapes;
/// the closing delimiter must match the opening one.
pub fn string_lit(input: &str) -> IResult<&str, String> {
    let quote = match input.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        _ => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Char,
            )))
        }
    };
    let (mut rest, _) = char(quote)(input)?;
    let mut out = String::new();
    loop {
        match rest.chars().next() {
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Eof,
                )))
            }
            Some(c) if c == quote => {
                rest = &rest[1..];
                break;
            }
            Some('\\') => {
                let escaped = rest[1..].chars().next().ok_or_else(|| {
                    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Eof))
                })?;
                let literal = match escaped {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                };
                out.push(literal);
                rest = &rest[1 + escaped.len_utf8()..];
            }
            Some(c) => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    Ok((rest, out))
}

pub fn skip_ws(input: &str) -> &str {
    input.trim_start()
}

pub const KEYWORDS: &[&str] = &[
    "for", "union", "where", "forall", "forsome", "in", "true", "false",
];

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_quoted_string_lit() {
        let (rest, s) = string_lit(r#""hello" tail"#).unwrap();
        assert_eq!(s, "hello");
        assert_eq!(rest, " tail");
    }

    #[test]
    fn single_quoted_string_lit() {
        let (rest, s) = string_lit("'hello' tail").unwrap();
        assert_eq!(s, "hello");
        assert_eq!(rest, " tail");
    }

    #[test]
    fn mismatched_quote_is_not_a_terminator() {
        // A single quote inside a double-quoted literal is just a character.
        let (rest, s) = string_lit(r#""it's" tail"#).unwrap();
        assert_eq!(s, "it's");
        assert_eq!(rest, " tail");
    }
}
