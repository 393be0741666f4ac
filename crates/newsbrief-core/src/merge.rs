//! Dedup Merger
//!
//! Folds summary fragments of one date into a single document organised
//! under the four merge headers. Entries are identified by their
//! whitespace-normalized body text within a category, so a renumbered
//! marker does not make an entry new while a punctuation change does.
//!
//! [`merge`] is a pure function of the existing document and the
//! fragments, so merging the same fragments again is a no-op.

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use serde::Serialize;

use crate::category::MergeCategory;
use crate::entry::Entry;
use crate::numbering::renumber_entries;
use crate::segment::{segment, Block, SegmentOptions};

/// Entries of one fragment, tagged with the header they appeared under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Display name (usually the file name).
    pub name: String,
    pub entries: Vec<(MergeCategory, Entry)>,
    /// Entries dropped because their header is not a merge header, or
    /// because no header preceded them.
    pub skipped_unrecognized: usize,
}

impl Fragment {
    /// Parse fragment text. Entries are separated by blank lines or markers.
    pub fn parse(name: impl Into<String>, text: &str) -> Self {
        Self::parse_with(name, text, SegmentOptions::paragraphs())
    }

    pub fn parse_with(name: impl Into<String>, text: &str, options: SegmentOptions) -> Self {
        let name = name.into();
        let doc = segment(text, options);
        let mut current: Option<MergeCategory> = None;
        let mut entries = Vec::new();
        let mut skipped = 0;

        for seg in doc.segments {
            match seg.block {
                Block::Header(header) => {
                    current = MergeCategory::from_label(&header.label);
                    if current.is_none() {
                        debug!("{}: ignoring section 【{}】", name, header.label);
                    }
                }
                Block::Entry(entry) => match current {
                    Some(category) => {
                        entries.push((category, entry.with_category(category.label())));
                    }
                    None => skipped += 1,
                },
            }
        }

        if skipped > 0 {
            warn!("{}: skipped {} entries outside recognized categories", name, skipped);
        }

        Self {
            name,
            entries,
            skipped_unrecognized: skipped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deduplicated entries under the four merge headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    sections: BTreeMap<MergeCategory, Vec<Entry>>,
}

impl Default for MergedDocument {
    fn default() -> Self {
        Self {
            sections: MergeCategory::ALL
                .into_iter()
                .map(|c| (c, Vec::new()))
                .collect(),
        }
    }
}

/// A merged document read back from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub document: MergedDocument,
    /// Duplicate entries found inside the file itself.
    pub duplicates_collapsed: usize,
    pub skipped_unrecognized: usize,
}

impl MergedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a previously written merged file.
    pub fn parse(text: &str) -> ParsedDocument {
        Self::parse_with(text, SegmentOptions::paragraphs())
    }

    /// Parse a merged file with the segmentation its fragments were read with.
    pub fn parse_with(text: &str, options: SegmentOptions) -> ParsedDocument {
        let fragment = Fragment::parse_with("existing", text, options);
        let mut document = Self::new();
        let mut seen = SeenKeys::default();
        let mut duplicates = 0;
        for (category, entry) in fragment.entries {
            if seen.insert(category, &entry) {
                document.push(category, entry);
            } else {
                duplicates += 1;
            }
        }
        ParsedDocument {
            document,
            duplicates_collapsed: duplicates,
            skipped_unrecognized: fragment.skipped_unrecognized,
        }
    }

    pub fn entries(&self, category: MergeCategory) -> &[Entry] {
        self.sections
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total_entries(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_entries() == 0
    }

    fn push(&mut self, category: MergeCategory, mut entry: Entry) {
        let list = self.sections.entry(category).or_default();
        entry.origin_index = list.len();
        list.push(entry);
    }

    /// Render all four headers in display order, each followed by its
    /// entries separated by blank lines.
    pub fn render(&self, renumber: bool) -> String {
        let mut out = String::new();
        for (i, category) in MergeCategory::ALL.into_iter().enumerate() {
            let mut entries = self.entries(category).to_vec();
            if renumber {
                renumber_entries(&mut entries);
            }
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&category.header_line(entries.len()));
            out.push('\n');
            for entry in &entries {
                out.push('\n');
                out.push_str(&entry.raw_text);
                out.push('\n');
            }
        }
        out
    }
}

/// Counts for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    /// Entries carried over from the existing document.
    pub kept: usize,
    pub added: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub categories: BTreeMap<MergeCategory, CategoryStats>,
    pub fragments: usize,
    pub skipped_unrecognized: usize,
}

impl MergeStats {
    pub fn get(&self, category: MergeCategory) -> CategoryStats {
        self.categories.get(&category).copied().unwrap_or_default()
    }

    pub fn total_added(&self) -> usize {
        self.categories.values().map(|s| s.added).sum()
    }

    pub fn total_duplicates(&self) -> usize {
        self.categories.values().map(|s| s.duplicates).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub document: MergedDocument,
    pub stats: MergeStats,
    /// At least one entry was added to the existing document.
    pub changed: bool,
}

#[derive(Default)]
struct SeenKeys(BTreeMap<MergeCategory, HashSet<String>>);

impl SeenKeys {
    fn insert(&mut self, category: MergeCategory, entry: &Entry) -> bool {
        self.0.entry(category).or_default().insert(entry.dedup_key())
    }
}

/// Merge `fragments`, in the given order, onto `existing`.
///
/// Existing entries keep their positions. New unique entries are appended
/// to their category in fragment order.
pub fn merge(existing: Option<&MergedDocument>, fragments: &[Fragment]) -> MergeOutcome {
    let mut document = existing.cloned().unwrap_or_default();
    let mut stats = MergeStats {
        fragments: fragments.len(),
        ..MergeStats::default()
    };
    let mut seen = SeenKeys::default();

    for category in MergeCategory::ALL {
        let counts = stats.categories.entry(category).or_default();
        for entry in document.entries(category) {
            seen.insert(category, entry);
            counts.kept += 1;
        }
    }

    for fragment in fragments {
        stats.skipped_unrecognized += fragment.skipped_unrecognized;
        for (category, entry) in &fragment.entries {
            let counts = stats.categories.entry(*category).or_default();
            if seen.insert(*category, entry) {
                document.push(*category, entry.clone());
                counts.added += 1;
            } else {
                counts.duplicates += 1;
            }
        }
    }

    let changed = stats.total_added() > 0;
    debug!(
        "merged {} fragments: {} added, {} duplicates",
        stats.fragments,
        stats.total_added(),
        stats.total_duplicates()
    );

    MergeOutcome {
        document,
        stats,
        changed,
    }
}
