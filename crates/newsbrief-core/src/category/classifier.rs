//! Category Classifier
//!
//! Assigns each entry one taxonomy label. Keyword sets are tried in priority
//! order and the first category with any matching keyword wins.

use log::debug;

use crate::entry::Entry;
use crate::segment::{segment, Block, SegmentOptions, SegmentedDocument};

use super::builtin::CategoryDef;
use super::store::CategoryStore;

/// Keyword classifier over a [`CategoryStore`].
#[derive(Debug, Clone, Default)]
pub struct CategoryClassifier {
    store: CategoryStore,
}

impl CategoryClassifier {
    pub fn new(store: CategoryStore) -> Self {
        Self { store }
    }

    pub fn builtin() -> Self {
        Self::new(CategoryStore::builtin())
    }

    pub fn store(&self) -> &CategoryStore {
        &self.store
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.store.names()
    }

    pub fn get_category(&self, name: &str) -> Option<&CategoryDef> {
        self.store.get(name)
    }

    /// First-match classification of a piece of text. Matching is plain,
    /// case-sensitive substring containment.
    pub fn classify_text(&self, text: &str) -> &str {
        self.store
            .all()
            .iter()
            .find(|cat| cat.keywords.iter().any(|kw| !kw.is_empty() && text.contains(kw.as_str())))
            .map(|cat| cat.name.as_str())
            .unwrap_or_else(|| self.store.default_category())
    }

    /// Classify one entry by the keywords in its body.
    pub fn classify(&self, entry: Entry) -> Entry {
        let category = self.classify_text(&entry.body_text).to_string();
        entry.with_category(category)
    }

    /// Classify every entry of a segmented document.
    ///
    /// A header whose label is a taxonomy category switches explicit
    /// classification on: entries below it take that label until the next
    /// header. Entries below any other header are classified by keyword.
    pub fn classify_document(&self, doc: SegmentedDocument) -> SegmentedDocument {
        let mut explicit: Option<String> = None;
        let segments = doc
            .segments
            .into_iter()
            .map(|mut segment| {
                segment.block = match segment.block {
                    Block::Header(header) => {
                        explicit = self
                            .store
                            .contains(&header.label)
                            .then(|| header.label.clone());
                        Block::Header(header)
                    }
                    Block::Entry(entry) => match &explicit {
                        Some(label) => Block::Entry(entry.with_category(label.clone())),
                        None => Block::Entry(self.classify(entry)),
                    },
                };
                segment
            })
            .collect();

        SegmentedDocument {
            preamble: doc.preamble,
            segments,
        }
    }

    /// Per-category entry counts in taxonomy order, default bucket last.
    pub fn category_counts<'a>(&self, entries: impl IntoIterator<Item = &'a Entry>) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .store
            .names()
            .into_iter()
            .map(|name| (name.to_string(), 0))
            .collect();
        for entry in entries {
            let label = entry
                .category
                .as_deref()
                .unwrap_or_else(|| self.store.default_category());
            let rank = self.store.rank(label);
            counts[rank].1 += 1;
        }
        counts
    }
}

/// Segment `text` and classify every entry.
///
/// Never fails on malformed input; the worst case is zero entries.
pub fn segment_and_classify(
    text: &str,
    options: SegmentOptions,
    classifier: &CategoryClassifier,
) -> SegmentedDocument {
    let doc = classifier.classify_document(segment(text, options));
    debug!(
        "segmented {} entries under {} headers",
        doc.entry_count(),
        doc.headers().count()
    );
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(doc: &SegmentedDocument) -> Vec<String> {
        doc.entries()
            .map(|e| e.category.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_keyword_match() {
        let classifier = CategoryClassifier::builtin();
        assert_eq!(classifier.classify_text("市教委发布通知"), "市委教委");
        assert_eq!(classifier.classify_text("某小学开展活动"), "中小学");
        assert_eq!(classifier.classify_text("某大学新闻"), "高校");
        assert_eq!(classifier.classify_text("天气预报"), "其他");
    }

    #[test]
    fn test_first_match_wins() {
        // Mentions both a university and a primary school: the higher
        // priority category takes it.
        let classifier = CategoryClassifier::builtin();
        assert_eq!(classifier.classify_text("大学附属小学开学"), "中小学");
        assert_eq!(classifier.classify_text("市教委部署高校工作"), "市委教委");
    }

    #[test]
    fn test_case_sensitive() {
        let classifier = CategoryClassifier::builtin();
        assert_eq!(classifier.classify_text("K12 在线教育"), "中小学");
        assert_eq!(classifier.classify_text("k12 在线教育"), "其他");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = CategoryClassifier::builtin();
        let entry = Entry::new("一、某高校与中学合作", 0);
        let first = classifier.classify(entry.clone());
        let second = classifier.classify(entry);
        assert_eq!(first.category, second.category);
        assert_eq!(first.category.as_deref(), Some("高校"));
    }

    #[test]
    fn test_marker_not_used_for_matching() {
        let store = CategoryStore::new(
            vec![CategoryDef {
                name: "一类".to_string(),
                keywords: vec!["一、".to_string()],
            }],
            "其他",
        )
        .unwrap();
        let classifier = CategoryClassifier::new(store);
        let entry = classifier.classify(Entry::new("一、普通消息", 0));
        assert_eq!(entry.category.as_deref(), Some("其他"));
    }

    #[test]
    fn test_scenario_keyword_taxonomy() {
        let store = CategoryStore::new(
            vec![CategoryDef {
                name: "京内正面".to_string(),
                keywords: vec!["甲".to_string()],
            }],
            "其他",
        )
        .unwrap();
        let classifier = CategoryClassifier::new(store);
        let doc = segment_and_classify(
            "一、甲消息（来源：X）\n二、乙消息",
            SegmentOptions::default(),
            &classifier,
        );
        assert_eq!(categories(&doc), vec!["京内正面", "其他"]);
    }

    #[test]
    fn test_taxonomy_header_is_explicit_switch() {
        let classifier = CategoryClassifier::builtin();
        let text = "【高校】\n一、天气预报\n【舆情速览】\n一、某小学活动\n";
        let doc = segment_and_classify(text, SegmentOptions::default(), &classifier);
        assert_eq!(categories(&doc), vec!["高校", "中小学"]);
    }

    #[test]
    fn test_category_counts() {
        let classifier = CategoryClassifier::builtin();
        let doc = segment_and_classify(
            "一、某大学\n二、某小学\n三、另一所大学\n四、无关",
            SegmentOptions::default(),
            &classifier,
        );
        let counts = classifier.category_counts(doc.entries());
        assert_eq!(
            counts,
            vec![
                ("市委教委".to_string(), 0),
                ("中小学".to_string(), 1),
                ("高校".to_string(), 2),
                ("其他".to_string(), 1),
            ]
        );
    }
}
