//! PKGBUILD field extraction.
//!
//! A PKGBUILD is a bash script, but the fields AUR helpers care about are plain
//! top-level assignments:
//!
//! ```text
//! pkgname=foo
//! pkgver=1.0
//! pkgdesc="A tool that does things"
//! depends=('bar' 'baz>=2')
//! ```
//!
//! [`extract_fields`] scans the text for `name=value` assignments and recognises
//! three value shapes: a bare word, a quoted string and a parenthesized array.
//! Quoted strings and arrays are balanced spans (parentheses nest, quotes do
//! not) and are run through [`unquote`]. When a key is assigned in several
//! shapes, precedence goes bare, then double-quoted, then single-quoted, then
//! array, wherever each assignment appears. Within one shape the later
//! assignment wins.
//!
//! Quoted text outside an assignment is skipped as a whole, so an assignment
//! inside a string (`echo "depends=(x)"`) is never picked up. A quote that
//! never closes is an ordinary character there. Comments starting at a word
//! boundary and here-document bodies (`<<EOF` ... `EOF`) are skipped as well.

use super::depends::{DependencySpec, parse_dependency};
use super::unquote::{FieldValue, closing_quote, skip_comment, unquote};
use crate::error::{AurError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Fields extracted from a PKGBUILD. Everything else is ignored.
pub const RECOGNIZED_FIELDS: &[&str] = &[
    "pkgname",
    "pkgver",
    "pkgrel",
    "pkgdesc",
    "url",
    "license",
    "install",
    "changelog",
    "source",
    "noextract",
    "md5sums",
    "sha1sums",
    "sha256sums",
    "sha384sums",
    "sha512sums",
    "groups",
    "arch",
    "backup",
    "depends",
    "makedepends",
    "optdepends",
    "conflicts",
    "provides",
    "replaces",
    "options",
];

/// Fields that are always present after extraction, empty if never assigned.
const DEFAULTED_FIELDS: &[&str] = &["depends", "conflicts"];

/// Parsed PKGBUILD metadata, keyed by recognized field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    fields: BTreeMap<&'static str, FieldValue>,
}

impl MetadataRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Scalar value of a field; `None` if absent or an array.
    pub fn scalar(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_scalar)
    }

    /// Field as a list; empty if absent.
    pub fn list(&self, field: &str) -> &[String] {
        self.get(field).map(FieldValue::as_slice).unwrap_or_default()
    }

    /// Package names. Split packages assign `pkgname` as an array.
    pub fn pkgnames(&self) -> &[String] {
        self.list("pkgname")
    }

    /// Full version as `pkgver-pkgrel`, or just `pkgver` without a release.
    pub fn version(&self) -> Option<String> {
        let pkgver = self.scalar("pkgver")?;
        Some(match self.scalar("pkgrel") {
            Some(pkgrel) => format!("{}-{}", pkgver, pkgrel),
            None => pkgver.to_string(),
        })
    }

    pub fn depends(&self) -> &[String] {
        self.list("depends")
    }

    pub fn conflicts(&self) -> &[String] {
        self.list("conflicts")
    }

    /// Parse every `depends` entry.
    ///
    /// Fails on the first malformed token.
    pub fn dependencies(&self) -> Result<Vec<DependencySpec>> {
        parse_all(self.depends())
    }

    pub fn make_dependencies(&self) -> Result<Vec<DependencySpec>> {
        parse_all(self.list("makedepends"))
    }

    pub fn conflict_specs(&self) -> Result<Vec<DependencySpec>> {
        parse_all(self.conflicts())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn parse_all(tokens: &[String]) -> Result<Vec<DependencySpec>> {
    tokens.iter().map(|token| parse_dependency(token)).collect()
}

/// Extract the recognized fields from PKGBUILD text.
///
/// # Errors
///
/// Returns [`AurError::UnbalancedDelimiter`] if a quoted or parenthesized value
/// never closes.
///
/// # Examples
///
/// ```
/// use auric::pkgbuild::extract_fields;
///
/// let record = extract_fields("pkgname=foo\npkgver=1.0\ndepends=('bar' 'baz>=2')").unwrap();
/// assert_eq!(record.scalar("pkgname"), Some("foo"));
/// assert_eq!(record.depends(), ["bar", "baz>=2"]);
/// ```
pub fn extract_fields(text: &str) -> Result<MetadataRecord> {
    let mut bare = BTreeMap::new();
    // Indexed by delimiter precedence
    let mut delimited: [BTreeMap<&'static str, FieldValue>; 3] = Default::default();

    for assignment in Assignments::new(text) {
        let assignment = assignment?;
        let Some(field) = recognized(assignment.name) else {
            continue;
        };
        match assignment.value {
            RawValue::Bare(word) => {
                bare.insert(field, FieldValue::Scalar(word.to_string()));
            }
            RawValue::Delimited(span) => {
                delimited[delimiter_rank(span)].insert(field, unquote(span));
            }
        }
    }

    let mut fields = bare;
    for pass in delimited {
        fields.extend(pass);
    }
    for field in DEFAULTED_FIELDS {
        fields
            .entry(*field)
            .or_insert_with(|| FieldValue::Sequence(Vec::new()));
    }

    Ok(MetadataRecord { fields })
}

/// `"` before `'` before `(`; a higher rank overrides a lower one.
fn delimiter_rank(span: &str) -> usize {
    match span.as_bytes().first() {
        Some(b'"') => 0,
        Some(b'\'') => 1,
        _ => 2,
    }
}

fn recognized(name: &str) -> Option<&'static str> {
    RECOGNIZED_FIELDS.iter().copied().find(|field| *field == name)
}

#[derive(Debug)]
enum RawValue<'a> {
    Bare(&'a str),
    Delimited(&'a str),
}

#[derive(Debug)]
struct Assignment<'a> {
    name: &'a str,
    value: RawValue<'a>,
}

/// Iterator over `name=value` assignments in the text.
///
/// Yields at most one error, after which it is exhausted.
struct Assignments<'a> {
    text: &'a str,
    pos: usize,
    at_boundary: bool,
}

impl<'a> Assignments<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            at_boundary: true,
        }
    }

    /// Read the value starting at `start`. `None` for value shapes that are
    /// not extracted, such as `$var` or an empty assignment.
    fn value(&mut self, name: &'a str, start: usize) -> Result<Option<Assignment<'a>>> {
        let text = self.text;
        let bytes = text.as_bytes();

        let value = match bytes.get(start) {
            Some(&quote @ (b'"' | b'\'')) => {
                let close = closing_quote(bytes, start + 1, quote)
                    .ok_or_else(|| unbalanced(name, quote))?;
                self.pos = close + 1;
                RawValue::Delimited(&text[start..=close])
            }
            Some(b'(') => {
                let close = closing_paren(bytes, start).ok_or_else(|| unbalanced(name, b')'))?;
                self.pos = close + 1;
                RawValue::Delimited(&text[start..=close])
            }
            Some(&b) if is_word_byte(b) => {
                let end = bytes[start..]
                    .iter()
                    .position(u8::is_ascii_whitespace)
                    .map_or(bytes.len(), |offset| start + offset);
                self.pos = end;
                RawValue::Bare(&text[start..end])
            }
            _ => return Ok(None),
        };

        Ok(Some(Assignment { name, value }))
    }
}

impl<'a> Iterator for Assignments<'a> {
    type Item = Result<Assignment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        let bytes = text.as_bytes();

        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            match b {
                _ if b.is_ascii_whitespace() || b == b';' => {
                    self.pos += 1;
                    self.at_boundary = true;
                }
                b'#' if self.at_boundary => {
                    self.pos = skip_comment(bytes, self.pos);
                }
                b'"' | b'\'' => {
                    self.pos = closing_quote(bytes, self.pos + 1, b)
                        .map_or(self.pos + 1, |close| close + 1);
                    self.at_boundary = false;
                }
                b'<' if bytes.get(self.pos + 1) == Some(&b'<') => {
                    match heredoc_end(text, self.pos) {
                        Some(end) => {
                            self.pos = end;
                            self.at_boundary = true;
                        }
                        None => {
                            self.pos += 2;
                            self.at_boundary = false;
                        }
                    }
                }
                _ if self.at_boundary && is_word_byte(b) => {
                    let start = self.pos;
                    let end = bytes[start..]
                        .iter()
                        .position(|&c| !is_word_byte(c))
                        .map_or(bytes.len(), |offset| start + offset);
                    self.pos = end;
                    self.at_boundary = false;

                    let name = &text[start..end];
                    if bytes.get(end) == Some(&b'=') && is_field_name(name) {
                        match self.value(name, end + 1) {
                            Ok(Some(assignment)) => return Some(Ok(assignment)),
                            Ok(None) => {}
                            Err(err) => {
                                self.pos = bytes.len();
                                return Some(Err(err));
                            }
                        }
                    }
                }
                _ => {
                    self.pos += 1;
                    self.at_boundary = false;
                }
            }
        }

        None
    }
}

/// Position of the `)` matching the `(` at `open`.
///
/// Nested parentheses are counted; quoted text and comments are skipped so a
/// `)` inside them does not close the array.
fn closing_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = open;
    let mut at_boundary = true;

    while pos < bytes.len() {
        match bytes[pos] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            quote @ (b'"' | b'\'') => pos = closing_quote(bytes, pos + 1, quote)?,
            b'#' if at_boundary => {
                pos = skip_comment(bytes, pos);
                continue;
            }
            _ => {}
        }
        at_boundary = matches!(bytes[pos], b'(' | b' ' | b'\t' | b'\n' | b'\r');
        pos += 1;
    }

    None
}

/// Position of the end of the terminator line of the here-document whose
/// `<<` operator starts at `pos`. `None` if there is no here-document there,
/// as for a here-string (`<<<`).
///
/// Handles `<<WORD`, `<<-WORD` (tab-indented terminator) and a quoted or
/// backslash-escaped `WORD`. An unterminated body runs to the end of the text.
fn heredoc_end(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut cursor = pos + 2;

    if bytes.get(cursor) == Some(&b'<') {
        return None;
    }
    let strip_tabs = bytes.get(cursor) == Some(&b'-');
    if strip_tabs {
        cursor += 1;
    }
    while matches!(bytes.get(cursor), Some(b' ' | b'\t')) {
        cursor += 1;
    }
    let quote = match bytes.get(cursor) {
        Some(&quote @ (b'"' | b'\'')) => Some(quote),
        _ => None,
    };
    if quote.is_some() || bytes.get(cursor) == Some(&b'\\') {
        cursor += 1;
    }

    let start = cursor;
    while cursor < bytes.len() && (is_word_byte(bytes[cursor]) || bytes[cursor] == b'-') {
        cursor += 1;
    }
    let delimiter = &text[start..cursor];
    // `$((x<<2))` is a shift, not a here-document
    if delimiter.is_empty() || delimiter.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if let Some(quote) = quote
        && bytes.get(cursor) != Some(&quote)
    {
        return None;
    }

    // The body starts on the line after the operator
    let Some(offset) = text[cursor..].find('\n') else {
        return Some(text.len());
    };
    let mut line_start = cursor + offset + 1;
    while line_start < text.len() {
        let line_end = text[line_start..]
            .find('\n')
            .map_or(text.len(), |offset| line_start + offset);
        let mut line = text[line_start..line_end].trim_end_matches('\r');
        if strip_tabs {
            line = line.trim_start_matches('\t');
        }
        if line == delimiter {
            return Some(line_end);
        }
        line_start = line_end + 1;
    }

    Some(text.len())
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Assignment names that can be fields: `[a-z0-9]+`.
fn is_field_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn unbalanced(field: &str, delimiter: u8) -> AurError {
    AurError::UnbalancedDelimiter {
        field: field.to_string(),
        delimiter: delimiter as char,
    }
}
