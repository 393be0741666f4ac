//! Priority Reorderer
//!
//! Stable sort of classified entries by `(category rank, origin index)`.
//! Documents are reordered section by section; a section starts at every
//! header that is not itself a taxonomy label.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::category::{CategoryClassifier, CategoryStore};
use crate::entry::Entry;
use crate::numbering::renumber_entries;
use crate::segment::{Block, Header, Segment, SegmentOptions, SegmentedDocument};

/// Reorder entries by category priority. Entries of equal category keep
/// their relative order. Returns the new order and whether it differs.
pub fn reorder(entries: Vec<Entry>, store: &CategoryStore) -> (Vec<Entry>, bool) {
    let mut sorted = entries;
    let before: Vec<usize> = sorted.iter().map(|e| e.origin_index).collect();
    sorted.sort_by_key(|e| (rank_of(e, store), e.origin_index));
    let changed = sorted
        .iter()
        .map(|e| e.origin_index)
        .ne(before.into_iter());
    (sorted, changed)
}

fn rank_of(entry: &Entry, store: &CategoryStore) -> usize {
    match entry.category.as_deref() {
        Some(label) => store.rank(label),
        None => store.rank(store.default_category()),
    }
}

/// Reorder switches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorderOptions {
    /// Sections whose heading contains any of these are never reordered.
    #[serde(default = "default_frozen_sections")]
    pub frozen_sections: Vec<String>,
    /// Rewrite numeral markers 1..n within each reordered section.
    #[serde(default)]
    pub renumber: bool,
}

fn default_frozen_sections() -> Vec<String> {
    vec!["舆情参考".to_string()]
}

impl Default for ReorderOptions {
    fn default() -> Self {
        Self {
            frozen_sections: default_frozen_sections(),
            renumber: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// The document holds no recognizable entries.
    NothingToReorder,
}

/// Per-section breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    /// Heading line, `None` for entries before the first heading.
    pub heading: Option<String>,
    pub frozen: bool,
    pub changed: bool,
    /// Entry count per category, taxonomy order.
    pub counts: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
pub struct ReorderOutcome {
    pub document: SegmentedDocument,
    pub changed: bool,
    pub sections: Vec<SectionReport>,
    pub advisory: Option<Advisory>,
}

impl ReorderOutcome {
    pub fn render(&self) -> String {
        self.document.render()
    }
}

struct Section {
    heading: Option<Segment>,
    body: Vec<Segment>,
}

fn split_sections(segments: Vec<Segment>, store: &CategoryStore) -> Vec<Section> {
    let mut sections = vec![Section {
        heading: None,
        body: Vec::new(),
    }];
    for segment in segments {
        let starts_section = matches!(&segment.block, Block::Header(h) if !store.contains(&h.label));
        if starts_section {
            sections.push(Section {
                heading: Some(segment),
                body: Vec::new(),
            });
        } else if let Some(current) = sections.last_mut() {
            current.body.push(segment);
        }
    }
    sections
}

fn group_header(label: &str) -> Header {
    Header {
        line: format!("【{label}】"),
        label: label.to_string(),
    }
}

/// Rebuild a section body in priority order. Separators are taken slot by
/// slot from the original body so a second pass changes nothing.
fn reorder_body(
    body: Vec<Segment>,
    store: &CategoryStore,
    options: &ReorderOptions,
) -> Vec<Segment> {
    let slots: Vec<bool> = body.iter().map(|s| s.blank_before).collect();
    let uses_group_headers = body
        .iter()
        .any(|s| matches!(&s.block, Block::Header(_)));
    let entries: Vec<Entry> = body
        .into_iter()
        .filter_map(|s| match s.block {
            Block::Entry(entry) => Some(entry),
            Block::Header(_) => None,
        })
        .collect();

    let (mut sorted, _) = reorder(entries, store);
    if options.renumber {
        renumber_entries(&mut sorted);
    }

    let mut blocks = Vec::with_capacity(sorted.len() + store.names().len());
    let mut current_group: Option<String> = None;
    for entry in sorted {
        if uses_group_headers {
            let label = entry
                .category
                .clone()
                .unwrap_or_else(|| store.default_category().to_string());
            if current_group.as_deref() != Some(label.as_str()) {
                blocks.push(Block::Header(group_header(&label)));
                current_group = Some(label);
            }
        }
        blocks.push(Block::Entry(entry));
    }

    let fallback = slots.last().copied().unwrap_or(false);
    blocks
        .into_iter()
        .enumerate()
        .map(|(i, block)| Segment {
            block,
            blank_before: slots.get(i).copied().unwrap_or(fallback),
        })
        .collect()
}

/// Reorder a classified document section by section.
pub fn reorder_document(
    doc: SegmentedDocument,
    classifier: &CategoryClassifier,
    options: &ReorderOptions,
) -> ReorderOutcome {
    if doc.entry_count() == 0 {
        info!("nothing to reorder");
        return ReorderOutcome {
            document: doc,
            changed: false,
            sections: Vec::new(),
            advisory: Some(Advisory::NothingToReorder),
        };
    }

    let store = classifier.store();
    let preamble = doc.preamble;
    let mut segments = Vec::new();
    let mut reports = Vec::new();
    let mut changed = false;

    for section in split_sections(doc.segments, store) {
        let heading_line = section.heading.as_ref().and_then(|s| match &s.block {
            Block::Header(h) => Some(h.line.clone()),
            Block::Entry(_) => None,
        });
        let frozen = heading_line
            .as_deref()
            .is_some_and(|line| options.frozen_sections.iter().any(|f| line.contains(f.as_str())));

        let counts = classifier.category_counts(section.body.iter().filter_map(|s| match &s.block {
            Block::Entry(entry) => Some(entry),
            Block::Header(_) => None,
        }));

        let has_entries = counts.iter().any(|(_, n)| *n > 0);
        let (body, section_changed) = if frozen || !has_entries {
            (section.body, false)
        } else {
            let original = section.body.clone();
            let body = reorder_body(section.body, store, options);
            let section_changed = body != original;
            if section_changed {
                debug!("reordered section {:?}", heading_line);
            }
            (body, section_changed)
        };
        changed |= section_changed;

        if heading_line.is_some() || has_entries {
            reports.push(SectionReport {
                heading: heading_line,
                frozen,
                changed: section_changed,
                counts,
            });
        }

        segments.extend(section.heading);
        segments.extend(body);
    }

    ReorderOutcome {
        document: SegmentedDocument { preamble, segments },
        changed,
        sections: reports,
        advisory: None,
    }
}

/// Segment, classify and reorder `text` in one go.
pub fn reorder_text(
    text: &str,
    classifier: &CategoryClassifier,
    options: &ReorderOptions,
) -> ReorderOutcome {
    let doc = crate::category::segment_and_classify(text, SegmentOptions::default(), classifier);
    reorder_document(doc, classifier, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryDef;

    fn texts(doc: &SegmentedDocument) -> Vec<&str> {
        doc.entries().map(|e| e.raw_text.as_str()).collect()
    }

    #[test]
    fn test_scenario_already_in_priority_order() {
        let store = CategoryStore::new(
            vec![CategoryDef {
                name: "京内正面".to_string(),
                keywords: vec!["甲".to_string()],
            }],
            "其他",
        )
        .unwrap();
        let classifier = CategoryClassifier::new(store);
        let outcome = reorder_text(
            "一、甲消息（来源：X）\n二、乙消息",
            &classifier,
            &ReorderOptions::default(),
        );
        assert!(!outcome.changed);
        assert_eq!(texts(&outcome.document), vec!["一、甲消息（来源：X）", "二、乙消息"]);
    }

    #[test]
    fn test_reorder_by_priority() {
        let classifier = CategoryClassifier::builtin();
        let text = "【舆情速览】\n\n一、天气晴\n\n二、某大学开学\n\n三、某小学活动\n\n四、市教委通知\n";
        let outcome = reorder_text(text, &classifier, &ReorderOptions::default());
        assert!(outcome.changed);
        assert_eq!(
            outcome.render(),
            "【舆情速览】\n\n四、市教委通知\n\n三、某小学活动\n\n二、某大学开学\n\n一、天气晴\n"
        );
    }

    #[test]
    fn test_reorder_is_stable() {
        let classifier = CategoryClassifier::builtin();
        let text = "一、甲大学\n二、天气\n三、乙大学\n四、丙小学\n五、丁大学\n";
        let outcome = reorder_text(text, &classifier, &ReorderOptions::default());
        assert_eq!(
            texts(&outcome.document),
            vec!["四、丙小学", "一、甲大学", "三、乙大学", "五、丁大学", "二、天气"]
        );
    }

    #[test]
    fn test_reorder_is_idempotent() {
        let classifier = CategoryClassifier::builtin();
        let text = "前言\n\n【速览】\n一、天气\n\n二、大学\n三、小学\n";
        let first = reorder_text(text, &classifier, &ReorderOptions::default());
        assert!(first.changed);
        let second = reorder_text(&first.render(), &classifier, &ReorderOptions::default());
        assert!(!second.changed);
        assert_eq!(second.render(), first.render());
    }

    #[test]
    fn test_frozen_section_untouched() {
        let classifier = CategoryClassifier::builtin();
        let text = "【舆情参考】\n一、天气\n二、大学\n【舆情速览】\n一、天气\n二、大学\n";
        let outcome = reorder_text(text, &classifier, &ReorderOptions::default());
        assert_eq!(
            outcome.render(),
            "【舆情参考】\n一、天气\n二、大学\n【舆情速览】\n二、大学\n一、天气\n"
        );
        assert!(outcome.sections[0].frozen);
        assert!(!outcome.sections[1].frozen);
    }

    #[test]
    fn test_group_headers_reemitted() {
        let classifier = CategoryClassifier::builtin();
        let text = "【其他】\n一、天气\n【中小学】\n【高校】\n二、某大学\n三、某小学\n";
        let outcome = reorder_text(text, &classifier, &ReorderOptions::default());
        // 三、某小学 sits under the 高校 header, so it stays a 高校 entry.
        assert_eq!(
            outcome.render(),
            "【高校】\n二、某大学\n三、某小学\n【其他】\n一、天气\n"
        );
        let again = reorder_text(&outcome.render(), &classifier, &ReorderOptions::default());
        assert!(!again.changed);
    }

    #[test]
    fn test_renumber_option() {
        let classifier = CategoryClassifier::builtin();
        let options = ReorderOptions {
            renumber: true,
            ..ReorderOptions::default()
        };
        let outcome = reorder_text("一、天气\n二、大学\n", &classifier, &options);
        assert_eq!(outcome.render(), "一、大学\n二、天气\n");
    }

    #[test]
    fn test_nothing_to_reorder() {
        let classifier = CategoryClassifier::builtin();
        let text = "只是一段说明文字\n";
        let outcome = reorder_text(text, &classifier, &ReorderOptions::default());
        assert!(!outcome.changed);
        assert_eq!(outcome.advisory, Some(Advisory::NothingToReorder));
        assert_eq!(outcome.render(), text);
    }

    #[test]
    fn test_reorder_entries_contract() {
        let store = CategoryStore::builtin();
        let entries = vec![
            Entry::new("一、a", 0).with_category("其他"),
            Entry::new("二、b", 1).with_category("高校"),
            Entry::new("三、c", 2),
        ];
        let (sorted, changed) = reorder(entries, &store);
        assert!(changed);
        let order: Vec<usize> = sorted.iter().map(|e| e.origin_index).collect();
        assert_eq!(order, vec![1, 0, 2]);

        let (again, changed) = reorder(sorted, &store);
        assert!(!changed);
        assert_eq!(again.len(), 3);
    }

    #[test]
    fn test_section_counts_reported() {
        let classifier = CategoryClassifier::builtin();
        let outcome = reorder_text(
            "【速览】\n一、大学\n二、小学\n三、大学\n",
            &classifier,
            &ReorderOptions::default(),
        );
        assert_eq!(outcome.sections.len(), 1);
        let report = &outcome.sections[0];
        assert_eq!(report.heading.as_deref(), Some("【速览】"));
        assert_eq!(report.counts[1], ("中小学".to_string(), 1));
        assert_eq!(report.counts[2], ("高校".to_string(), 2));
    }
}
