//! Entry records and line-level marker recognition.

use once_cell::sync::Lazy;
use regex::Regex;

/// Numeral item marker: `一、`, `12．`, `３，` and friends.
static NUMERAL_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[一二三四五六七八九十百零〇两]+|[0-9０-９]{1,3})[、，．.。]")
        .expect("numeral marker pattern is valid")
});

/// Bullet item marker: a bullet glyph followed by whitespace.
static BULLET_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[•·●\-\*]\s+").expect("bullet marker pattern is valid"));

/// Bracketed header line: `【京内正面】共 3 条`.
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*【([^】]+)】").expect("header pattern is valid"));

/// One logical news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Original text of the item, marker included, trailing whitespace trimmed per line.
    pub raw_text: String,
    /// `raw_text` without its leading marker.
    pub body_text: String,
    /// Taxonomy label, `None` until classified.
    pub category: Option<String>,
    /// Position in the sequence the entry was produced from.
    pub origin_index: usize,
}

impl Entry {
    pub fn new(raw_text: impl Into<String>, origin_index: usize) -> Self {
        let raw_text = raw_text.into();
        let body_text = match marker_len(&raw_text) {
            Some(len) => raw_text[len..].trim_start().to_string(),
            None => raw_text.trim_start().to_string(),
        };
        Self {
            raw_text,
            body_text,
            category: None,
            origin_index,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Leading marker as written (empty for unmarked entries).
    pub fn marker(&self) -> &str {
        match marker_len(&self.raw_text) {
            Some(len) => self.raw_text[..len].trim_start(),
            None => "",
        }
    }

    pub fn is_marked(&self) -> bool {
        marker_len(&self.raw_text).is_some()
    }

    /// Marked with a numeral rather than a bullet.
    pub fn is_numbered(&self) -> bool {
        numeral_marker_len(&self.raw_text).is_some()
    }

    /// Identity used for deduplication.
    pub fn dedup_key(&self) -> String {
        normalize_whitespace(&self.body_text)
    }

    /// Same entry with `marker` in place of its current one.
    pub fn with_marker(&self, marker: &str) -> Self {
        Self {
            raw_text: format!("{}{}", marker, self.body_text),
            body_text: self.body_text.clone(),
            category: self.category.clone(),
            origin_index: self.origin_index,
        }
    }
}

/// Byte length of a leading numeral marker (`一、`, `3．`) in `line`.
pub fn numeral_marker_len(line: &str) -> Option<usize> {
    let m = NUMERAL_MARKER_RE.find(line)?;
    // `2025.11.02` is a date, not item 2025.
    let punct_is_ascii_dot = m.as_str().ends_with('.');
    let followed_by_digit = line[m.end()..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit());
    if punct_is_ascii_dot && followed_by_digit {
        None
    } else {
        Some(m.end())
    }
}

/// Byte length of the leading item marker in `line`, if any.
pub fn marker_len(line: &str) -> Option<usize> {
    numeral_marker_len(line).or_else(|| BULLET_MARKER_RE.find(line).map(|m| m.end()))
}

pub fn is_marker_line(line: &str) -> bool {
    marker_len(line).is_some()
}

/// Parse a header line into its bracket label.
pub fn header_label(line: &str) -> Option<&str> {
    HEADER_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
