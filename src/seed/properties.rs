//! Java `.properties` text format
//!
//! Follows `java.util.Properties#load`: natural lines are joined into
//! logical lines on an odd number of trailing backslashes, `#` and `!`
//! start comments, the key ends at the first unescaped `=`, `:` or
//! whitespace, and `\t \n \r \f \uXXXX` escapes are decoded. Input is
//! UTF-8 rather than ISO-8859-1. A `\uXXXX` pair forming a UTF-16
//! surrogate pair decodes to one character; a lone surrogate becomes
//! U+FFFD.

use std::collections::HashMap;
use std::str::Chars;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct PropertiesError {
    pub line: usize,
    pub message: String,
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{000C}')
}

/// Parse properties text into a map; a later duplicate key replaces an
/// earlier one.
pub fn parse(text: &str) -> Result<HashMap<String, String>, PropertiesError> {
    let mut props = HashMap::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, first)) = lines.next() {
        let start_line = index + 1;
        let first = first.trim_start_matches(is_blank);

        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        let mut logical = String::new();
        let mut current = first;
        loop {
            if ends_with_continuation(current) {
                logical.push_str(&current[..current.len() - 1]);
                match lines.next() {
                    Some((_, next)) => current = next.trim_start_matches(is_blank),
                    None => break,
                }
            } else {
                logical.push_str(current);
                break;
            }
        }

        let (key, value) = split_key_value(&logical);
        let key = unescape(key).map_err(|message| PropertiesError {
            line: start_line,
            message,
        })?;
        let value = unescape(value).map_err(|message| PropertiesError {
            line: start_line,
            message,
        })?;
        props.insert(key, value);
    }

    Ok(props)
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into its raw (still escaped) key and value.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let rest = line[key_end..].trim_start_matches(is_blank);
    let value = match rest.chars().next() {
        Some('=') | Some(':') => rest[1..].trim_start_matches(is_blank),
        _ => rest,
    };

    (key, value)
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let code = read_hex4(&mut chars)?;
                out.push(decode_utf16_escape(code, &mut chars));
            }
            Some(other) => out.push(other),
            // a lone trailing backslash is dropped, as Java does
            None => {}
        }
    }

    Ok(out)
}

fn read_hex4(chars: &mut Chars<'_>) -> Result<u32, String> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.chars().count() != 4 {
        return Err(format!("incomplete unicode escape '\\u{}'", hex));
    }
    u32::from_str_radix(&hex, 16).map_err(|_| format!("invalid unicode escape '\\u{}'", hex))
}

/// Decode one `\uXXXX` code unit, consuming a following low surrogate
/// escape from `chars` when `code` is a high surrogate.
fn decode_utf16_escape(code: u32, chars: &mut Chars<'_>) -> char {
    match code {
        0xD800..=0xDBFF => {
            let mut ahead = chars.clone();
            if ahead.next() == Some('\\') && ahead.next() == Some('u') {
                if let Ok(low @ 0xDC00..=0xDFFF) = read_hex4(&mut ahead) {
                    *chars = ahead;
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER);
                }
            }
            char::REPLACEMENT_CHARACTER
        }
        _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
    }
}
