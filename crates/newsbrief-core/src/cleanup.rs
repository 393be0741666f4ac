//! Text cleanup applied to briefs before segmentation.
//!
//! Literal replacements run first, in list order, followed by bracket
//! normalization inside parentheses.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Builtin replacement list: source-name shortening and phrase fixes.
pub const DEFAULT_REPLACEMENTS: &[(&str, &str)] = &[
    ("来源：", ""),
    ("北京日报客户端", "北京日报"),
    ("央视新闻客户端", "央视新闻"),
    ("@央视新闻", "央视新闻"),
    ("《北京日报》官方账号", "北京日报"),
    ("《新京报》官方账号", "新京报"),
    ("新黄河客户端", "新黄河"),
    ("人民日报客户端", "人民日报"),
    ("北晚在线", "北京晚报"),
    ("中新网", "中国新闻网"),
    ("中新社", "中国新闻社"),
    ("已获", "获"),
    ("次评论", "条评论"),
];

static PARENS_CONTENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"（([^）]*)）").expect("parens pattern is valid"));

static SPACE_BEFORE_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+）").expect("closing paren pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cleaner {
    replacements: Vec<(String, String)>,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(
            DEFAULT_REPLACEMENTS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }
}

impl Cleaner {
    pub fn new(replacements: Vec<(String, String)>) -> Self {
        Self { replacements }
    }

    pub fn replacements(&self) -> &[(String, String)] {
        &self.replacements
    }

    /// Apply every rule; returns the new text and whether it changed.
    pub fn clean(&self, text: &str) -> (String, bool) {
        let mut out = text.to_string();
        for (from, to) in &self.replacements {
            if !from.is_empty() && out.contains(from.as_str()) {
                out = out.replace(from.as_str(), to);
            }
        }
        out = out.replace('(', "（").replace(')', "）");
        out = strip_title_marks_in_parens(&out);
        out = strip_space_before_close(&out);
        let changed = out != text;
        (out, changed)
    }
}

/// `（《新京报》）` becomes `（新京报）`.
fn strip_title_marks_in_parens(text: &str) -> String {
    PARENS_CONTENT_RE
        .replace_all(text, |caps: &Captures| {
            let inner = &caps[1];
            if inner.contains(['《', '》']) {
                format!("（{}）", inner.replace(['《', '》'], ""))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Drop whitespace in front of every `）` that follows other text.
/// Leading whitespace at the very start of the text is kept.
fn strip_space_before_close(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    // A whitespace run always starts right after a non-space character (or
    // at offset 0), so only the start of the text needs special casing.
    for m in SPACE_BEFORE_CLOSE_RE.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        out.push_str(if m.start() > 0 { "）" } else { m.as_str() });
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_replacements() {
        let cleaner = Cleaner::default();
        let (out, changed) = cleaner.clean("一、某消息（来源：北京日报客户端）");
        assert!(changed);
        assert_eq!(out, "一、某消息（北京日报）");
    }

    #[test]
    fn test_ascii_parens_and_title_marks() {
        let cleaner = Cleaner::default();
        let (out, _) = cleaner.clean("消息(《新京报》 )，见《人民日报》");
        assert_eq!(out, "消息（新京报），见《人民日报》");
    }

    #[test]
    fn test_phrase_fixes() {
        let cleaner = Cleaner::default();
        let (out, _) = cleaner.clean("已获 300 次评论，中新网报道");
        assert_eq!(out, "获 300 条评论，中国新闻网报道");
    }

    #[test]
    fn test_unchanged_text() {
        let cleaner = Cleaner::default();
        let (out, changed) = cleaner.clean("一、普通消息（新京报）\n");
        assert!(!changed);
        assert_eq!(out, "一、普通消息（新京报）\n");
    }

    #[test]
    fn test_custom_replacements_in_order() {
        let cleaner = Cleaner::new(vec![
            ("甲".to_string(), "乙".to_string()),
            ("乙".to_string(), "丙".to_string()),
            (String::new(), "x".to_string()),
        ]);
        let (out, _) = cleaner.clean("甲");
        assert_eq!(out, "丙");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let cleaner = Cleaner::default();
        let (once, _) = cleaner.clean("（来源：@央视新闻 ）(《北京日报》官方账号)");
        let (twice, changed) = cleaner.clean(&once);
        assert!(!changed);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_space_before_consecutive_closing_parens() {
        let cleaner = Cleaner::default();
        let (out, changed) = cleaner.clean("x ） ）");
        assert!(changed);
        assert_eq!(out, "x））");
        let (again, changed) = cleaner.clean(&out);
        assert!(!changed);
        assert_eq!(again, out);
        assert_eq!(cleaner.clean("消息（甲 （乙 ） ）").0, "消息（甲 （乙））");
    }
}
