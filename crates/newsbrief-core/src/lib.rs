pub mod category;
pub mod cleanup;
pub mod config;
pub mod entry;
pub mod error;
pub mod fragment;
pub mod importance;
pub mod merge;
pub mod numbering;
pub mod reorder;
pub mod segment;
pub mod workflow;

pub use cleanup::{Cleaner, DEFAULT_REPLACEMENTS};
pub use config::Config;
pub use entry::{normalize_whitespace, Entry};
pub use error::{NewsBriefError, Result};
pub use fragment::{FragmentGroup, FragmentName, FragmentNaming};
pub use importance::{importance, sort_by_importance, SortOutcome};
pub use merge::{
    merge, CategoryStats, Fragment, MergeOutcome, MergeStats, MergedDocument, ParsedDocument,
};
pub use numbering::{number_titles, NumberingOptions, NumberingResult};
pub use reorder::{
    reorder, reorder_document, reorder_text, Advisory, ReorderOptions, ReorderOutcome,
    SectionReport,
};
pub use segment::{segment, Block, Header, Segment, SegmentOptions, SegmentedDocument};
pub use workflow::{
    backup, backup_path, restore, run_clean, run_merge, run_number, run_reorder, run_sort,
    BatchReport, DateReport, FileCallback, FileOutcome, FileReport, MergeOptions, MergeReport,
    ReorderReport, SortReport,
};

// Category system
pub use category::{
    segment_and_classify, BuiltinCategory, CategoryClassifier, CategoryDef, CategoryStore,
    MergeCategory, BUILTIN_CATEGORIES, DEFAULT_CATEGORY,
};
