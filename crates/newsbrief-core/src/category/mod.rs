//! # Category Module
//!
//! Keyword taxonomy and classification of brief entries.
//!
//! ## Module layout
//!
//! - `builtin`: builtin taxonomy and the four merge headers
//! - `store`: ordered runtime taxonomy
//! - `classifier`: first-match keyword classifier
//!
//! ## Example
//!
//! ```rust
//! use newsbrief_core::category::{CategoryClassifier, CategoryStore};
//!
//! let classifier = CategoryClassifier::new(CategoryStore::builtin());
//! assert_eq!(classifier.classify_text("某大学举办论坛"), "高校");
//! assert_eq!(classifier.classify_text("天气晴"), "其他");
//! ```

mod builtin;
mod classifier;
mod store;

// Re-exports
pub use builtin::{BuiltinCategory, CategoryDef, MergeCategory, BUILTIN_CATEGORIES, DEFAULT_CATEGORY};
pub use classifier::{segment_and_classify, CategoryClassifier};
pub use store::CategoryStore;
