//! Importance sort.
//!
//! Summary entries carry scoring annotations such as
//! `external_importance=8` or `score=72`. Within each header section,
//! entries are sorted by that value, highest first; ties keep their order.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::segment::{segment, Block, Segment, SegmentOptions, SegmentedDocument};

static EXTERNAL_IMPORTANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"external_importance=(\d+)").expect("importance pattern is valid")
});
static SCORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"score=(\d+)").expect("score pattern is valid"));

/// Importance of an entry: `external_importance`, else `score`, else 0.
pub fn importance(text: &str) -> u64 {
    [&*EXTERNAL_IMPORTANCE_RE, &*SCORE_RE]
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    pub text: String,
    pub changed: bool,
    pub entries: usize,
    /// Highest and lowest importance seen, if any entry exists.
    pub range: Option<(u64, u64)>,
}

/// Sort the entries of every section of `text` by importance.
pub fn sort_by_importance(text: &str) -> SortOutcome {
    let doc = segment(text, SegmentOptions::paragraphs());
    let entries = doc.entry_count();
    let range = doc
        .entries()
        .map(|e| importance(&e.raw_text))
        .fold(None, |acc: Option<(u64, u64)>, v| match acc {
            None => Some((v, v)),
            Some((hi, lo)) => Some((hi.max(v), lo.min(v))),
        });

    let mut segments: Vec<Segment> = Vec::with_capacity(doc.segments.len());
    let mut run: Vec<Segment> = Vec::new();
    for seg in doc.segments {
        match seg.block {
            Block::Header(_) => {
                flush_sorted(&mut run, &mut segments);
                segments.push(seg);
            }
            Block::Entry(_) => run.push(seg),
        }
    }
    flush_sorted(&mut run, &mut segments);

    let sorted = SegmentedDocument {
        preamble: doc.preamble,
        segments,
    };
    let text_out = sorted.render();
    let changed = text_out != segment(text, SegmentOptions::paragraphs()).render();

    SortOutcome {
        text: text_out,
        changed,
        entries,
        range,
    }
}

/// Sort a run of entry segments, keeping each slot's separator.
fn flush_sorted(run: &mut Vec<Segment>, out: &mut Vec<Segment>) {
    let slots: Vec<bool> = run.iter().map(|s| s.blank_before).collect();
    let mut blocks: Vec<Block> = run.drain(..).map(|s| s.block).collect();
    blocks.sort_by_key(|b| match b {
        Block::Entry(e) => std::cmp::Reverse(importance(&e.raw_text)),
        Block::Header(_) => std::cmp::Reverse(0),
    });
    out.extend(
        blocks
            .into_iter()
            .zip(slots)
            .map(|(block, blank_before)| Segment {
                block,
                blank_before,
            }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_extraction() {
        assert_eq!(importance("标题\nexternal_importance=8, score=90"), 8);
        assert_eq!(importance("标题 score=72"), 72);
        assert_eq!(importance("标题"), 0);
    }

    #[test]
    fn test_sort_within_section() {
        let text = "【京内正面】共 3 条\n\n甲 score=3\n\n乙 score=9\n\n丙 score=5\n";
        let outcome = sort_by_importance(text);
        assert!(outcome.changed);
        assert_eq!(
            outcome.text,
            "【京内正面】共 3 条\n\n乙 score=9\n\n丙 score=5\n\n甲 score=3\n"
        );
        assert_eq!(outcome.range, Some((9, 3)));
        assert_eq!(outcome.entries, 3);
    }

    #[test]
    fn test_sort_keeps_sections_apart_and_is_stable() {
        let text = "【A】\n\n甲 score=1\n\n乙\n\n丙 score=1\n【B】\n\n丁 score=2\n";
        let outcome = sort_by_importance(text);
        assert_eq!(
            outcome.text,
            "【A】\n\n甲 score=1\n\n丙 score=1\n\n乙\n【B】\n\n丁 score=2\n"
        );
        let again = sort_by_importance(&outcome.text);
        assert!(!again.changed);
    }

    #[test]
    fn test_sort_without_entries() {
        let outcome = sort_by_importance("【A】\n");
        assert!(!outcome.changed);
        assert_eq!(outcome.range, None);
    }
}
