//! Line classification for the parameter text format.
//!
//! Every physical line of a parameter file is one of:
//! * blank (empty, whitespace only, or a comment),
//! * a table header `=name= label col1 col2 ...`,
//! * a scalar entry `key [number] [text]`.
//!
//! Anything after a `#` is a comment, together with the whitespace before it.

use std::io::BufRead;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::error::{ParamError, Result};

lazy_static! {
    static ref DECIMAL: Regex = Regex::new(r"^[+-]?[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?$").unwrap();
    static ref TABLE_NAME: Regex = Regex::new(r"^=(\w+)=").unwrap();
    static ref ENTRY: Regex = Regex::new(r"^(\w+)\s*(.*)$").unwrap();
}

/// Separator written between a number and its text, or in place of a missing number.
pub const TEXT_SEPARATOR: &str = ":";

#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    Blank,
    TableHeader { name: &'a str, columns: &'a str },
    Entry(Entry<'a>),
    /// No key could be extracted; the loader skips these.
    Malformed(&'a str),
}

/// A scalar entry split into its parts.
///
/// When the token after the key is not a number, `number` is `Some(0.0)` and
/// `text` holds the whole remainder. A remainder introduced by a lone `:`
/// carries no number at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<'a> {
    pub key: &'a str,
    pub number: Option<f64>,
    pub text: Option<&'a str>,
}

/// Removes a trailing comment and the whitespace in front of it, as well as
/// any trailing whitespace.
pub fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(at) => line[..at].trim_end(),
        None => line.trim_end(),
    }
}

/// Parses `token` when it fully matches the decimal grammar
/// (`[+-]digits[.digits][(e|E)[+-]digits]`).
pub fn parse_decimal(token: &str) -> Option<f64> {
    if DECIMAL.is_match(token) {
        token.parse::<f64>().ok()
    } else {
        None
    }
}

pub fn classify(raw: &str) -> Result<Line<'_>> {
    let line = strip_comment(raw.trim_start());
    if line.is_empty() {
        return Ok(Line::Blank);
    }

    if line.starts_with('=') {
        let header = TABLE_NAME
            .captures(line)
            .and_then(|c| Some((c.get(0)?, c.get(1)?)));
        return match header {
            Some((whole, name)) => Ok(Line::TableHeader {
                name: name.as_str(),
                columns: line[whole.end()..].trim(),
            }),
            None => Err(ParamError::format(
                format!("can not find table name in line: {line}"),
                None,
            )),
        };
    }

    let Some(captures) = ENTRY.captures(line) else {
        return Ok(Line::Malformed(line));
    };
    let key = captures.get(1).map_or("", |m| m.as_str());
    let rest = captures.get(2).map_or("", |m| m.as_str());
    Ok(Line::Entry(split_entry(key, rest)))
}

fn split_entry<'a>(key: &'a str, rest: &'a str) -> Entry<'a> {
    if rest.is_empty() {
        return Entry { key, number: None, text: None };
    }
    if let Some(text) = after_separator(rest) {
        return Entry { key, number: None, text };
    }

    let (token, tail) = match rest.find(char::is_whitespace) {
        Some(at) => (&rest[..at], rest[at..].trim_start()),
        None => (rest, ""),
    };
    match parse_decimal(token) {
        Some(number) => {
            let text = after_separator(tail).unwrap_or(Some(tail)).filter(|t| !t.is_empty());
            Entry { key, number: Some(number), text }
        }
        None => Entry { key, number: Some(0.0), text: Some(rest) },
    }
}

// `Some(text)` when `rest` starts with the separator token.
fn after_separator(rest: &str) -> Option<Option<&str>> {
    let tail = rest.strip_prefix(TEXT_SEPARATOR)?;
    if !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
        return None;
    }
    let tail = tail.trim_start();
    Some(if tail.is_empty() { None } else { Some(tail) })
}

/// Line iterator that counts lines and ends quietly on a read error.
///
/// Bytes that are not valid UTF-8 are replaced rather than ending the stream.
pub(crate) struct SourceLines<R> {
    reader: R,
    buffer: Vec<u8>,
    number: usize,
    done: bool,
}

impl<R: BufRead> SourceLines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self { reader, buffer: Vec::new(), number: 0, done: false }
    }

    /// Number of the line most recently returned, starting at 1.
    pub(crate) fn number(&self) -> usize {
        self.number
    }
}

impl<R: BufRead> Iterator for SourceLines<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                self.number += 1;
                let mut bytes = self.buffer.as_slice();
                if let Some(rest) = bytes.strip_suffix(b"\n") {
                    bytes = rest.strip_suffix(b"\r").unwrap_or(rest);
                }
                Some(String::from_utf8_lossy(bytes).into_owned())
            }
            Err(e) => {
                warn!(line = self.number + 1, error = %e, "read error, ignoring the rest of the stream");
                self.done = true;
                None
            }
        }
    }
}
