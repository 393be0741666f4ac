//! Entry Segmenter
//!
//! Splits a brief document into a preamble, header lines and entries.
//!
//! The segmenter is a small state machine driven one line at a time:
//!
//! - `Preamble`: nothing but free text seen so far. Unmarked lines belong to
//!   the preamble, a marker line opens the first entry.
//! - `InEntry`: lines accumulate into the open entry until the next marker,
//!   the next header or the end of input.
//! - `AtHeader`: a header was just consumed (or an entry was closed by a
//!   blank line in paragraph mode); the next non-blank line opens an entry
//!   whether it carries a marker or not.
//!
//! Blank lines never produce blocks. They are remembered as a single
//! separator in front of the next block.

use crate::entry::{header_label, is_marker_line, Entry};

/// Segmentation switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentOptions {
    /// Close the open entry at every blank line. Summary files separate
    /// unnumbered entries by blank lines only, so merging turns this on.
    pub split_on_blank_lines: bool,
}

impl SegmentOptions {
    pub fn paragraphs() -> Self {
        Self {
            split_on_blank_lines: true,
        }
    }
}

/// A bracketed header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// The full line as written (trailing whitespace trimmed).
    pub line: String,
    /// Text between `【` and `】`.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Header(Header),
    Entry(Entry),
}

/// A block together with the separator that preceded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub block: Block,
    /// At least one blank line separated this block from the previous one.
    pub blank_before: bool,
}

/// Output of one segmenter run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentedDocument {
    /// Text before the first header or entry, if any.
    pub preamble: Option<String>,
    pub segments: Vec<Segment>,
}

impl SegmentedDocument {
    /// Entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.segments.iter().filter_map(|s| match &s.block {
            Block::Entry(entry) => Some(entry),
            Block::Header(_) => None,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.entries().count()
    }

    pub fn headers(&self) -> impl Iterator<Item = &Header> {
        self.segments.iter().filter_map(|s| match &s.block {
            Block::Header(header) => Some(header),
            Block::Entry(_) => None,
        })
    }

    /// Reassemble the document. Any run of blank lines comes out as one.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(preamble) = &self.preamble {
            out.push_str(preamble);
            out.push('\n');
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if segment.blank_before && (i > 0 || self.preamble.is_some()) {
                out.push('\n');
            }
            match &segment.block {
                Block::Header(header) => out.push_str(&header.line),
                Block::Entry(entry) => out.push_str(&entry.raw_text),
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Preamble,
    InEntry,
    AtHeader,
}

struct Segmenter {
    options: SegmentOptions,
    state: State,
    preamble: Vec<String>,
    segments: Vec<Segment>,
    open: Vec<String>,
    open_blank_before: bool,
    pending_blank: bool,
    next_index: usize,
}

impl Segmenter {
    fn new(options: SegmentOptions) -> Self {
        Self {
            options,
            state: State::Preamble,
            preamble: Vec::new(),
            segments: Vec::new(),
            open: Vec::new(),
            open_blank_before: false,
            pending_blank: false,
            next_index: 0,
        }
    }

    fn feed(&mut self, line: &str) {
        let line = line.trim_end();

        if line.trim().is_empty() {
            self.on_blank();
            return;
        }

        if let Some(label) = header_label(line) {
            self.close_entry();
            let header = Header {
                line: line.to_string(),
                label: label.to_string(),
            };
            self.push(Block::Header(header));
            self.state = State::AtHeader;
            return;
        }

        if is_marker_line(line) {
            self.open_entry(line);
            return;
        }

        match self.state {
            State::Preamble => {
                if self.pending_blank && !self.preamble.is_empty() {
                    self.preamble.push(String::new());
                }
                self.pending_blank = false;
                self.preamble.push(line.to_string());
            }
            State::InEntry => {
                if self.pending_blank {
                    self.open.push(String::new());
                }
                self.pending_blank = false;
                self.open.push(line.to_string());
            }
            State::AtHeader => self.open_entry(line),
        }
    }

    fn on_blank(&mut self) {
        if self.state == State::InEntry && self.options.split_on_blank_lines {
            self.close_entry();
            self.state = State::AtHeader;
        }
        if self.state != State::Preamble || !self.preamble.is_empty() {
            self.pending_blank = true;
        }
    }

    fn open_entry(&mut self, line: &str) {
        self.close_entry();
        self.open.push(line.to_string());
        self.open_blank_before = self.pending_blank;
        self.pending_blank = false;
        self.state = State::InEntry;
    }

    fn close_entry(&mut self) {
        if self.open.is_empty() {
            return;
        }
        let raw_text = std::mem::take(&mut self.open).join("\n");
        let entry = Entry::new(raw_text, self.next_index);
        self.next_index += 1;
        let blank_before = self.open_blank_before;
        self.segments.push(Segment {
            block: Block::Entry(entry),
            blank_before,
        });
    }

    fn push(&mut self, block: Block) {
        self.segments.push(Segment {
            block,
            blank_before: self.pending_blank,
        });
        self.pending_blank = false;
    }

    fn finish(mut self) -> SegmentedDocument {
        self.close_entry();
        let preamble = if self.preamble.is_empty() {
            None
        } else {
            Some(self.preamble.join("\n"))
        };
        SegmentedDocument {
            preamble,
            segments: self.segments,
        }
    }
}

/// Segment `text` into a preamble, headers and entries.
///
/// Never fails: text without any marker or header comes back as a preamble
/// with zero entries.
pub fn segment(text: &str, options: SegmentOptions) -> SegmentedDocument {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut segmenter = Segmenter::new(options);
    for line in text.lines() {
        segmenter.feed(line);
    }
    segmenter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_texts(doc: &SegmentedDocument) -> Vec<&str> {
        doc.entries().map(|e| e.raw_text.as_str()).collect()
    }

    #[test]
    fn test_two_numbered_entries() {
        let doc = segment("一、甲消息（来源：X）\n二、乙消息", SegmentOptions::default());
        assert!(doc.preamble.is_none());
        assert_eq!(entry_texts(&doc), vec!["一、甲消息（来源：X）", "二、乙消息"]);
        let indexes: Vec<usize> = doc.entries().map(|e| e.origin_index).collect();
        assert_eq!(indexes, vec![0, 1]);
    }

    #[test]
    fn test_continuation_lines_join_entry() {
        let text = "一、标题\n正文第一行\n\n正文第二段\n二、下一条\n";
        let doc = segment(text, SegmentOptions::default());
        assert_eq!(
            entry_texts(&doc),
            vec!["一、标题\n正文第一行\n\n正文第二段", "二、下一条"]
        );
    }

    #[test]
    fn test_headers_are_not_entries() {
        let text = "【京内正面】\n一、同一条消息\n【京外负面】共 1 条\n\n一、另一条";
        let doc = segment(text, SegmentOptions::default());
        assert_eq!(doc.entry_count(), 2);
        let labels: Vec<&str> = doc.headers().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["京内正面", "京外负面"]);
        assert_eq!(doc.headers().nth(1).unwrap().line, "【京外负面】共 1 条");
    }

    #[test]
    fn test_unmarked_entry_after_header() {
        let doc = segment("【舆情速览】\n没有序号的消息\n续行", SegmentOptions::default());
        assert_eq!(entry_texts(&doc), vec!["没有序号的消息\n续行"]);
    }

    #[test]
    fn test_preamble_preserved() {
        let text = "舆情日报\n2025年11月2日\n\n一、甲\n二、乙\n";
        let doc = segment(text, SegmentOptions::default());
        assert_eq!(doc.preamble.as_deref(), Some("舆情日报\n2025年11月2日"));
        assert_eq!(doc.entry_count(), 2);
        assert_eq!(doc.render(), text);
    }

    #[test]
    fn test_no_markers_yields_no_entries() {
        let doc = segment("只是一段文字\n没有任何序号", SegmentOptions::default());
        assert_eq!(doc.entry_count(), 0);
        assert_eq!(doc.preamble.as_deref(), Some("只是一段文字\n没有任何序号"));
        assert_eq!(segment("", SegmentOptions::default()), SegmentedDocument::default());
    }

    #[test]
    fn test_blank_lines_neutral_by_default() {
        let doc = segment("【速览】\n第一段\n\n第二段", SegmentOptions::default());
        assert_eq!(entry_texts(&doc), vec!["第一段\n\n第二段"]);
    }

    #[test]
    fn test_paragraph_mode_splits_on_blank_lines() {
        let doc = segment("【京内正面】\n第一条\nscore=3\n\n第二条", SegmentOptions::paragraphs());
        assert_eq!(entry_texts(&doc), vec!["第一条\nscore=3", "第二条"]);
        // Paragraph mode never opens entries from preamble text.
        let doc = segment("前言\n\n正文", SegmentOptions::paragraphs());
        assert_eq!(doc.entry_count(), 0);
        assert_eq!(doc.preamble.as_deref(), Some("前言\n\n正文"));
    }

    #[test]
    fn test_round_trip_collapses_blank_runs() {
        let text = "前言\n\n\n【速览】\n\n\n一、甲  \n二、乙\n\n\n\n三、丙\n";
        let doc = segment(text, SegmentOptions::default());
        assert_eq!(doc.render(), "前言\n\n【速览】\n\n一、甲\n二、乙\n\n三、丙\n");
        let again = segment(&doc.render(), SegmentOptions::default());
        assert_eq!(again, doc);
    }

    #[test]
    fn test_every_content_line_accounted_once() {
        let text = "头部\n【A】\n一、a1\na2\n\nb0\n二、c1\n【B】\nd1\n";
        let doc = segment(text, SegmentOptions::default());
        let mut lines: Vec<String> = Vec::new();
        for entry in doc.entries() {
            lines.extend(entry.raw_text.lines().filter(|l| !l.is_empty()).map(String::from));
        }
        assert_eq!(lines, vec!["一、a1", "a2", "b0", "二、c1", "d1"]);
    }

    #[test]
    fn test_crlf_and_bom() {
        let doc = segment("\u{feff}一、甲\r\n二、乙\r\n", SegmentOptions::default());
        assert_eq!(entry_texts(&doc), vec!["一、甲", "二、乙"]);
    }
}
