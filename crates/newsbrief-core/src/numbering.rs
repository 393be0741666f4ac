//! Item numbering.
//!
//! Two flavours: renumbering entries that already carry numeral markers
//! (used after reorder and merge), and heuristic numbering of title lines
//! in a raw brief.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entry::{numeral_marker_len, Entry};

/// Lines that open with a date or time word are body text, not titles.
static DATE_LEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+月\d+日|近日|昨日|今日)").expect("date lead pattern is valid"));

/// Marker separator used when writing numbers.
pub const MARKER_SEPARATOR: char = '、';

const DIGITS: [&str; 10] = ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

/// Chinese numeral for `n` in 1..=99, plain digits otherwise.
pub fn chinese_numeral(n: usize) -> String {
    match n {
        1..=9 => DIGITS[n].to_string(),
        10 => "十".to_string(),
        11..=19 => format!("十{}", DIGITS[n % 10]),
        20..=99 => {
            let tens = DIGITS[n / 10];
            match n % 10 {
                0 => format!("{tens}十"),
                ones => format!("{tens}十{}", DIGITS[ones]),
            }
        }
        _ => n.to_string(),
    }
}

/// Marker text for item `n`, e.g. `三、`.
pub fn marker_for(n: usize) -> String {
    format!("{}{}", chinese_numeral(n), MARKER_SEPARATOR)
}

/// Renumber numeral-marked entries 1, 2, 3... in slice order. Bullets and
/// unmarked entries are left alone and do not advance the counter.
pub fn renumber_entries(entries: &mut [Entry]) {
    let mut counter = 0;
    for entry in entries.iter_mut() {
        if entry.is_numbered() {
            counter += 1;
            *entry = entry.with_marker(&marker_for(counter));
        }
    }
}

/// Heuristics for spotting title lines in a raw brief.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NumberingOptions {
    /// Leading lines (masthead, date) never numbered.
    #[serde(default = "default_skip_leading_lines")]
    pub skip_leading_lines: usize,
    /// A line counts as a title only when the next line is longer than this.
    #[serde(default = "default_min_body_chars")]
    pub min_body_chars: usize,
}

fn default_skip_leading_lines() -> usize {
    5
}

fn default_min_body_chars() -> usize {
    50
}

impl Default for NumberingOptions {
    fn default() -> Self {
        Self {
            skip_leading_lines: default_skip_leading_lines(),
            min_body_chars: default_min_body_chars(),
        }
    }
}

/// Result of numbering one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingResult {
    pub text: String,
    /// Titles that had no number before.
    pub added: usize,
    /// Titles whose existing number was rewritten.
    pub renumbered: usize,
    pub changed: bool,
}

/// Number the title lines of `text`. The counter restarts after each
/// `【...】` header. Line endings are preserved.
pub fn number_titles(text: &str, options: &NumberingOptions) -> NumberingResult {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut out = String::with_capacity(text.len() + lines.len() * 4);
    let mut counter = 0;
    let mut added = 0;
    let mut renumbered = 0;

    for (i, raw_line) in lines.iter().enumerate() {
        let stripped = raw_line.trim();

        if i < options.skip_leading_lines || stripped.is_empty() {
            out.push_str(raw_line);
            continue;
        }
        if stripped.starts_with('【') {
            counter = 0;
            out.push_str(raw_line);
            continue;
        }

        let next = lines.get(i + 1).map(|l| l.trim()).unwrap_or("");
        let is_title = !next.is_empty()
            && next.chars().count() > options.min_body_chars
            && !next.starts_with('【')
            && !DATE_LEAD_RE.is_match(stripped);

        if !is_title {
            out.push_str(raw_line);
            continue;
        }

        counter += 1;
        let content = match numeral_marker_len(stripped) {
            Some(len) => {
                renumbered += 1;
                stripped[len..].trim_start()
            }
            None => {
                added += 1;
                stripped
            }
        };
        out.push_str(&marker_for(counter));
        out.push_str(content);
        out.push_str(line_ending(raw_line));
    }

    let changed = out != text;
    NumberingResult {
        text: out,
        added,
        renumbered,
        changed,
    }
}

fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else if line.ends_with('\r') {
        "\r"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_body() -> String {
        "正文".repeat(30)
    }

    #[test]
    fn test_chinese_numeral() {
        assert_eq!(chinese_numeral(1), "一");
        assert_eq!(chinese_numeral(10), "十");
        assert_eq!(chinese_numeral(11), "十一");
        assert_eq!(chinese_numeral(20), "二十");
        assert_eq!(chinese_numeral(35), "三十五");
        assert_eq!(chinese_numeral(99), "九十九");
        assert_eq!(chinese_numeral(100), "100");
        assert_eq!(chinese_numeral(0), "0");
    }

    #[test]
    fn test_renumber_entries() {
        let mut entries = vec![
            Entry::new("三、丙", 0),
            Entry::new("• 要点", 1),
            Entry::new("一、甲", 2),
            Entry::new("无序号", 3),
        ];
        renumber_entries(&mut entries);
        let texts: Vec<&str> = entries.iter().map(|e| e.raw_text.as_str()).collect();
        assert_eq!(texts, vec!["一、丙", "• 要点", "二、甲", "无序号"]);
    }

    #[test]
    fn test_number_titles_adds_and_replaces() {
        let body = long_body();
        let text = format!(
            "刊头\n第1期\n编辑部\n2025年\n\n【舆情速览】\n第一条标题\n{body}\n\n五、第二条标题\n{body}\n【舆情参考】\n另一标题\n{body}\n"
        );
        let result = number_titles(&text, &NumberingOptions::default());
        assert!(result.changed);
        assert_eq!(result.added, 2);
        assert_eq!(result.renumbered, 1);
        assert!(result.text.contains("\n一、第一条标题\n"));
        assert!(result.text.contains("\n二、第二条标题\n"));
        // Counter restarts after a header.
        assert!(result.text.contains("\n一、另一标题\n"));
    }

    #[test]
    fn test_number_titles_skips_short_follow_and_dates() {
        let body = long_body();
        let text = format!("1\n2\n3\n4\n5\n短标题\n短正文\n10月1日消息\n{body}\n");
        let result = number_titles(&text, &NumberingOptions::default());
        assert!(!result.changed);
        assert_eq!(result.text, text);
    }

    #[test]
    fn test_number_titles_idempotent_and_crlf() {
        let body = long_body();
        let text = format!("a\r\nb\r\nc\r\nd\r\ne\r\n标题\r\n{body}\r\n");
        let first = number_titles(&text, &NumberingOptions::default());
        assert!(first.text.contains("一、标题\r\n"));
        let second = number_titles(&first.text, &NumberingOptions::default());
        assert!(!second.changed);
        assert_eq!(second.added, 0);
    }
}
