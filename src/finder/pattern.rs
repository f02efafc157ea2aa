//! Pattern compilation.
//!
//! A raw pattern string is inspected once at configuration time and turned
//! into a tagged [`Matcher`]: a regex literal (delimited, `/.../` style), a
//! shell glob, or a plain string. Visited entries are only ever checked
//! against the compiled form.

use glob::Pattern;
use regex::Regex;

use crate::errors::{FindError, FindResult};

/// Delimiters recognized for regex literals.
const REGEX_DELIMITERS: &[char] = &['/', '#', '~', '!', '%'];

/// A compiled pattern, tagged by how it was written.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Plain string: exact match for names, substring for paths and content.
    Literal(String),
    /// Shell glob (`*`, `?`, character classes).
    Glob(Pattern),
    /// Delimited regular expression, e.g. `/\.php$/`.
    Regex(Regex),
}

impl Matcher {
    /// Compile a raw pattern string.
    ///
    /// A string of length >= 2 wrapped in a matching pair of recognized
    /// delimiters is treated as a regular expression; otherwise a string
    /// containing glob metacharacters becomes a glob; anything else is a
    /// literal.
    pub fn new(raw: &str) -> FindResult<Self> {
        if let Some(inner) = regex_body(raw) {
            let regex = Regex::new(inner).map_err(|e| FindError::InvalidPattern {
                pattern: raw.to_string(),
                message: e.to_string(),
            })?;
            return Ok(Matcher::Regex(regex));
        }

        if raw.contains(['*', '?', '[']) {
            let pattern = Pattern::new(raw).map_err(|e| FindError::InvalidPattern {
                pattern: raw.to_string(),
                message: e.to_string(),
            })?;
            return Ok(Matcher::Glob(pattern));
        }

        Ok(Matcher::Literal(raw.to_string()))
    }

    /// Match against a bare file name. Literals must match exactly.
    pub fn matches_name(&self, name: &str) -> bool {
        match self {
            Matcher::Literal(s) => s == name,
            Matcher::Glob(p) => p.matches(name),
            Matcher::Regex(r) => r.is_match(name),
        }
    }

    /// Match within a relative path or file content. Literals match as
    /// substrings.
    pub fn matches_within(&self, haystack: &str) -> bool {
        match self {
            Matcher::Literal(s) => haystack.contains(s.as_str()),
            Matcher::Glob(p) => p.matches(haystack),
            Matcher::Regex(r) => r.is_match(haystack),
        }
    }
}

/// Return the interior of a delimited regex literal, if `raw` is one.
fn regex_body(raw: &str) -> Option<&str> {
    let mut chars = raw.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if first == last && REGEX_DELIMITERS.contains(&first) {
        Some(&raw[first.len_utf8()..raw.len() - last.len_utf8()])
    } else {
        None
    }
}
