//! Key/value pair extraction
//!
//! mdout lines carry any number of `KEY = VALUE` assignments. Keys may hold
//! spaces and parentheses (`EAMBER (non-restraint)`, `1-4 NB`) so neither
//! variant can simply split on whitespace:
//!
//! - control data lines are tokenized on whitespace/commas and keys are
//!   rebuilt from the tokens preceding each `=`;
//! - results lines are column aligned, so they are cut right after the digit
//!   that ends a value, skipping digits that belong to labels.

use crate::error::{MdoutError, Result};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

static SPACED_EQUALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*=\s*").expect("valid equals pattern"));

static FIELD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*|\s+").expect("valid field separator pattern"));

/// One `KEY = VALUE` assignment with the value still as raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValuePair {
    pub key: String,
    pub raw_value: String,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            raw_value: raw_value.into(),
        }
    }
}

/// Split a control data line into pairs.
///
/// A field starting with `(` ends the line (trailing annotations).
pub fn parse_assignment_line(line: &str, line_number: usize) -> Result<Vec<KeyValuePair>> {
    let mut pairs = Vec::new();
    if !line.contains('=') {
        return Ok(pairs);
    }

    let normalized = SPACED_EQUALS.replace_all(line, " = ");
    let mut fields: VecDeque<&str> = FIELD_SEPARATOR
        .split(&normalized)
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect();

    while let Some(first) = fields.pop_front() {
        if first.starts_with('(') {
            break;
        }

        let mut key_fields = Vec::new();
        let mut field = first;
        while field != "=" {
            key_fields.push(field);
            field = match fields.pop_front() {
                Some(next) => next,
                None => {
                    return Err(MdoutError::malformed_pair(
                        line_number,
                        line,
                        key_fields.join(" "),
                        "text without '=' separator",
                    ));
                }
            };
        }

        let key = key_fields.join(" ");
        if key.is_empty() {
            return Err(MdoutError::malformed_pair(
                line_number,
                line,
                key,
                "'=' without a preceding key",
            ));
        }

        match fields.pop_front() {
            Some(value) if value != "=" => pairs.push(KeyValuePair::new(key, value)),
            _ => {
                return Err(MdoutError::malformed_pair(
                    line_number,
                    line,
                    key,
                    "missing value",
                ));
            }
        }
    }

    Ok(pairs)
}

/// Split a results line into pairs.
///
/// The line is cut after every digit that is followed by whitespace (and at
/// most one comma), unless the digit directly follows a `-` or an ASCII
/// letter, so `1-4 NB` and `TEMP0` stay whole. Segments that still contain
/// several assignments (values packed against the next key) are split after
/// the numeric literal that follows each `=`.
pub fn split_time_series_line(line: &str, line_number: usize) -> Result<Vec<KeyValuePair>> {
    let mut pairs = Vec::new();
    for segment in value_segments(line.trim()) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        split_segment(segment, line, line_number, &mut pairs)?;
    }
    Ok(pairs)
}

/// Cut `text` at whitespace runs that follow a value-terminating digit
fn value_segments(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while index < bytes.len() {
        if !ends_value(bytes, index) {
            index += 1;
            continue;
        }

        let split_at = index + 1;
        let resume = skip_separator(bytes, split_at);
        if resume > split_at {
            segments.push(&text[start..split_at]);
            start = resume;
            index = resume;
        } else {
            index += 1;
        }
    }

    if start < text.len() {
        segments.push(&text[start..]);
    }
    segments
}

/// Digit at `index` that is not part of a label like `1-4` or `TEMP0`
fn ends_value(bytes: &[u8], index: usize) -> bool {
    if !bytes[index].is_ascii_digit() {
        return false;
    }
    match index.checked_sub(1).map(|previous| bytes[previous]) {
        Some(b'-') => false,
        Some(previous) => !previous.is_ascii_alphabetic(),
        None => true,
    }
}

/// Position after `\s*,?\s*` starting at `from`
fn skip_separator(bytes: &[u8], from: usize) -> usize {
    let mut position = skip_whitespace(bytes, from);
    if bytes.get(position) == Some(&b',') {
        position = skip_whitespace(bytes, position + 1);
    }
    position
}

fn skip_whitespace(bytes: &[u8], mut position: usize) -> usize {
    while bytes.get(position).is_some_and(u8::is_ascii_whitespace) {
        position += 1;
    }
    position
}

fn split_segment(
    segment: &str,
    line: &str,
    line_number: usize,
    pairs: &mut Vec<KeyValuePair>,
) -> Result<()> {
    let mut rest = segment;

    loop {
        let Some(equals) = rest.find('=') else {
            let leftover = rest.trim();
            if leftover.is_empty() {
                return Ok(());
            }
            return Err(MdoutError::malformed_pair(
                line_number,
                line,
                leftover,
                "text without '=' separator",
            ));
        };

        let key = rest[..equals].trim();
        if key.is_empty() {
            return Err(MdoutError::malformed_pair(
                line_number,
                line,
                key,
                "'=' without a preceding key",
            ));
        }

        let after = rest[equals + 1..].trim_start();
        if after.is_empty() || after.starts_with('=') {
            return Err(MdoutError::malformed_pair(
                line_number,
                line,
                key,
                "missing value",
            ));
        }

        if !after.contains('=') {
            pairs.push(KeyValuePair::new(key, after.trim_end()));
            return Ok(());
        }

        let value_len = match numeric_prefix_len(after) {
            0 => after.find(char::is_whitespace).unwrap_or(after.len()),
            len => len,
        };
        let (value, remaining) = after.split_at(value_len);

        if remaining.trim_start().starts_with('=') {
            // What looked like a value is really the next key
            return Err(MdoutError::malformed_pair(
                line_number,
                line,
                key,
                "missing value",
            ));
        }
        if value.contains('=') {
            // Non-numeric value packed against the next key; no safe cut point
            return Err(MdoutError::malformed_pair(
                line_number,
                line,
                key,
                "value runs into the next key",
            ));
        }

        pairs.push(KeyValuePair::new(key, value));
        rest = remaining;
    }
}

/// Length of the numeric literal (`-1.5`, `0.2240E-01`, `1.0D+03`) at the
/// start of `text`, or 0 when it does not start with one
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut position = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        position += 1;
    }

    let digits_start = position;
    position = skip_digits(bytes, position);
    let mut digit_count = position - digits_start;

    if bytes.get(position) == Some(&b'.') {
        let fraction_start = position + 1;
        let fraction_end = skip_digits(bytes, fraction_start);
        digit_count += fraction_end - fraction_start;
        position = fraction_end;
    }

    if digit_count == 0 {
        return 0;
    }

    if matches!(bytes.get(position), Some(b'e' | b'E' | b'd' | b'D')) {
        let mut exponent = position + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_end = skip_digits(bytes, exponent);
        if exponent_end > exponent {
            position = exponent_end;
        }
    }

    position
}

fn skip_digits(bytes: &[u8], mut position: usize) -> usize {
    while bytes.get(position).is_some_and(u8::is_ascii_digit) {
        position += 1;
    }
    position
}
