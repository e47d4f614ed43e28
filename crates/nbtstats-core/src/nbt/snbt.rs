//! Textual SNBT parser.
//!
//! ## Grammar
//!
//! ```text
//! <value>    := <compound> | <typed-array> | <list> | <string> | <bare>
//! <compound> := "{" [<entry> ("," <entry>)*] "}"
//! <entry>    := <key> ":" <value>
//! <array>    := "[" ("B" | "I" | "L") ";" [<int> ("," <int>)*] "]"
//! <list>     := "[" [<value> ("," <value>)*] "]"
//! <string>   := '"' ... '"' | "'" ... "'"   (\\ and \<quote> escapes)
//! <bare>     := numbers with optional b/s/l/f/d suffix, true/false,
//!               or an unquoted string
//! ```
//!
//! Trailing input after the root value is an error.

use thiserror::Error;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, opt, preceded, repeat};
use winnow::error::ErrMode;
use winnow::prelude::*;
use winnow::token::take_while;
use winnow::ModalResult;

use super::Tag;

/// Syntax error from textual tag parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("syntax error at byte {offset}")]
pub struct SnbtError {
    pub offset: usize,
}

/// Parse a complete textual tag document.
pub fn parse(text: &str) -> Result<Tag, SnbtError> {
    let trimmed = text.trim();
    parse_value.parse(trimmed).map_err(|err| SnbtError {
        offset: err.offset(),
    })
}

fn parse_value(input: &mut &str) -> ModalResult<Tag> {
    let _ = multispace0.parse_next(input)?;
    alt((
        parse_compound,
        parse_typed_array,
        parse_list,
        parse_quoted_string,
        parse_bare_value,
    ))
    .parse_next(input)
}

fn parse_compound(input: &mut &str) -> ModalResult<Tag> {
    let _ = ('{', multispace0).parse_next(input)?;
    let mut entries = Vec::new();
    let first: Option<(String, Tag)> = opt(parse_entry).parse_next(input)?;
    if let Some(entry) = first {
        entries.push(entry);
        let rest: Vec<(String, Tag)> = repeat(
            0..,
            preceded((multispace0, ',', multispace0), parse_entry),
        )
        .parse_next(input)?;
        entries.extend(rest);
    }
    let _ = (multispace0, '}').parse_next(input)?;
    Ok(Tag::Compound(entries))
}

fn parse_entry(input: &mut &str) -> ModalResult<(String, Tag)> {
    let _ = multispace0.parse_next(input)?;
    let key = parse_key(input)?;
    let _ = (multispace0, ':').parse_next(input)?;
    let value = parse_value(input)?;
    Ok((key, value))
}

fn parse_key(input: &mut &str) -> ModalResult<String> {
    alt((parse_double_quoted, parse_single_quoted, parse_bare_token)).parse_next(input)
}

/// Typed numeric arrays: `[B;...]`, `[I;...]`, `[L;...]`.
///
/// The prefix is only committed once the `;` is seen, so `[B, C]` still
/// backtracks into a plain list of strings.
fn parse_typed_array(input: &mut &str) -> ModalResult<Tag> {
    let kind: char = preceded(('[', multispace0), alt(('B', 'I', 'L'))).parse_next(input)?;
    let _ = (multispace0, ';').parse_next(input)?;
    let mut values = Vec::new();
    let first: Option<i64> = opt(preceded(multispace0, parse_array_int)).parse_next(input)?;
    if let Some(value) = first {
        values.push(value);
        let rest: Vec<i64> = repeat(
            0..,
            preceded((multispace0, ',', multispace0), parse_array_int),
        )
        .parse_next(input)?;
        values.extend(rest);
    }
    let _ = (multispace0, ']').parse_next(input)?;
    Ok(match kind {
        'B' => Tag::ByteArray(values.into_iter().map(|v| v as i8).collect()),
        'I' => Tag::IntArray(values.into_iter().map(|v| v as i32).collect()),
        _ => Tag::LongArray(values),
    })
}

/// Integer element inside a typed array, with an optional width suffix.
fn parse_array_int(input: &mut &str) -> ModalResult<i64> {
    let token: &str = take_while(1.., is_bare_char).parse_next(input)?;
    let body = token.trim_end_matches(['b', 'B', 's', 'S', 'l', 'L']);
    body.parse::<i64>().map_err(|_| ErrMode::from_input(input))
}

fn parse_list(input: &mut &str) -> ModalResult<Tag> {
    let _ = ('[', multispace0).parse_next(input)?;
    let mut items = Vec::new();
    let first: Option<Tag> = opt(parse_value).parse_next(input)?;
    if let Some(item) = first {
        items.push(item);
        let rest: Vec<Tag> = repeat(
            0..,
            preceded((multispace0, ',', multispace0), parse_value),
        )
        .parse_next(input)?;
        items.extend(rest);
    }
    let _ = (multispace0, ']').parse_next(input)?;
    Ok(Tag::List(items))
}

fn parse_quoted_string(input: &mut &str) -> ModalResult<Tag> {
    alt((parse_double_quoted, parse_single_quoted))
        .map(Tag::String)
        .parse_next(input)
}

fn parse_double_quoted(input: &mut &str) -> ModalResult<String> {
    parse_quoted(input, '"')
}

fn parse_single_quoted(input: &mut &str) -> ModalResult<String> {
    parse_quoted(input, '\'')
}

/// Quoted string with `\\` and `\<quote>` escapes.
fn parse_quoted(input: &mut &str, quote: char) -> ModalResult<String> {
    let start = *input;
    let Some(rest) = start.strip_prefix(quote) else {
        return Err(ErrMode::from_input(input));
    };
    let mut out = String::new();
    let mut chars = rest.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some((_, escaped)) if escaped == quote || escaped == '\\' => out.push(escaped),
                _ => return Err(ErrMode::from_input(input)),
            }
        } else if c == quote {
            *input = &rest[idx + c.len_utf8()..];
            return Ok(out);
        } else {
            out.push(c);
        }
    }
    Err(ErrMode::from_input(input))
}

fn parse_bare_value(input: &mut &str) -> ModalResult<Tag> {
    take_while(1.., is_bare_char)
        .map(classify_bare)
        .parse_next(input)
}

fn parse_bare_token(input: &mut &str) -> ModalResult<String> {
    take_while(1.., is_bare_char)
        .map(|token: &str| token.to_string())
        .parse_next(input)
}

fn is_bare_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '+' | '.')
}

/// Classify an unquoted token: booleans become bytes, numeric tokens take
/// their suffix-determined width, everything else is a string.
fn classify_bare(token: &str) -> Tag {
    match token {
        "true" => return Tag::Byte(1),
        "false" => return Tag::Byte(0),
        _ => {}
    }

    if let Some(last) = token.chars().last() {
        let body = &token[..token.len() - last.len_utf8()];
        if !body.is_empty() {
            let suffixed = match last.to_ascii_lowercase() {
                'b' => body.parse::<i8>().ok().map(Tag::Byte),
                's' => body.parse::<i16>().ok().map(Tag::Short),
                'l' => body.parse::<i64>().ok().map(Tag::Long),
                'f' => body.parse::<f32>().ok().map(Tag::Float),
                'd' => body.parse::<f64>().ok().map(Tag::Double),
                _ => None,
            };
            if let Some(tag) = suffixed {
                return tag;
            }
        }
    }

    if let Ok(value) = token.parse::<i32>() {
        return Tag::Int(value);
    }
    if let Ok(value) = token.parse::<i64>() {
        return Tag::Long(value);
    }
    if looks_like_float(token) {
        if let Ok(value) = token.parse::<f64>() {
            return Tag::Double(value);
        }
    }
    Tag::String(token.to_string())
}

fn looks_like_float(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+')
        && token.contains(['.', 'e', 'E'])
}
