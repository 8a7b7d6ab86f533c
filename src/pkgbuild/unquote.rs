//! Shell quoting removal for PKGBUILD field values.
//!
//! This is intentionally not a shell: there is no escape handling, no variable
//! expansion and no word splitting beyond whitespace. A value is either a
//! parenthesized array, a single- or double-quoted string, or left as it is.

use serde::Serialize;

/// A PKGBUILD field value after quote removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    Sequence(Vec<String>),
}

impl FieldValue {
    /// The scalar text, or `None` for arrays.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            FieldValue::Sequence(_) => None,
        }
    }

    /// The value as a list. A scalar reads as a one-element list, which is how
    /// bash treats `depends=foo` when expanded as `"${depends[@]}"`.
    pub fn as_slice(&self) -> &[String] {
        match self {
            FieldValue::Scalar(s) => std::slice::from_ref(s),
            FieldValue::Sequence(items) => items,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, FieldValue::Sequence(_))
    }
}

/// Remove one layer of shell syntax from a raw value.
///
/// `(a 'b' "c")` becomes a sequence with each word unquoted, `"x"` and `'x'`
/// become `x`, anything else is returned unchanged.
pub fn unquote(raw: &str) -> FieldValue {
    match raw.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        Some(inner) => FieldValue::Sequence(
            split_words(inner)
                .into_iter()
                .map(|word| strip_quotes(word).to_string())
                .collect(),
        ),
        None => FieldValue::Scalar(strip_quotes(raw).to_string()),
    }
}

/// Strip exactly one layer of matching `"` or `'` quotes.
pub fn strip_quotes(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = raw.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)) {
            return inner;
        }
    }
    raw
}

/// Split the interior of an array on whitespace.
///
/// Quoted sections are kept whole so that `'foo: does things'` stays one
/// element, and a `#` at the start of a word comments out the rest of the line.
/// A backslash-newline between words is a line continuation, not a word.
fn split_words(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut words = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if b == b'#' {
            pos = skip_comment(bytes, pos);
            continue;
        }
        if let Some(next) = line_continuation(bytes, pos) {
            pos = next;
            continue;
        }

        let start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
            pos = match bytes[pos] {
                quote @ (b'"' | b'\'') => match closing_quote(bytes, pos + 1, quote) {
                    Some(close) => close + 1,
                    None => bytes.len(),
                },
                _ => pos + 1,
            };
        }
        words.push(&inner[start..pos]);
    }

    words
}

/// Position just past a `\` + newline (or `\` + CRLF) starting at `pos`.
fn line_continuation(bytes: &[u8], pos: usize) -> Option<usize> {
    match bytes.get(pos..)? {
        [b'\\', b'\n', ..] => Some(pos + 2),
        [b'\\', b'\r', b'\n', ..] => Some(pos + 3),
        _ => None,
    }
}

/// Position of the next `quote` byte at or after `from`. Quotes do not nest.
pub(super) fn closing_quote(bytes: &[u8], from: usize, quote: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == quote)
        .map(|offset| from + offset)
}

/// Position just past the newline ending the comment that starts at `pos`.
pub(super) fn skip_comment(bytes: &[u8], pos: usize) -> usize {
    match bytes[pos..].iter().position(|&b| b == b'\n') {
        Some(offset) => pos + offset + 1,
        None => bytes.len(),
    }
}
