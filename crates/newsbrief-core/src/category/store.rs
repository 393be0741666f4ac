//! Category Store
//!
//! Ordered, read-only taxonomy. Position in the list is the priority rank;
//! the default bucket ranks after every named category.

use std::collections::HashSet;

use crate::error::{NewsBriefError, Result};

use super::builtin::{CategoryDef, BUILTIN_CATEGORIES, DEFAULT_CATEGORY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStore {
    categories: Vec<CategoryDef>,
    default_category: String,
}

impl CategoryStore {
    /// Builtin taxonomy with the builtin default bucket.
    pub fn builtin() -> Self {
        Self {
            categories: BUILTIN_CATEGORIES.iter().map(CategoryDef::from).collect(),
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    /// Build a taxonomy from an explicit list, highest priority first.
    ///
    /// Names must be unique and non-empty, and none may collide with the
    /// default bucket.
    pub fn new(categories: Vec<CategoryDef>, default_category: impl Into<String>) -> Result<Self> {
        let default_category = default_category.into();
        if default_category.trim().is_empty() {
            return Err(NewsBriefError::InvalidTaxonomy {
                message: "default category name is empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        seen.insert(default_category.clone());
        for cat in &categories {
            if cat.name.trim().is_empty() {
                return Err(NewsBriefError::InvalidTaxonomy {
                    message: "category name is empty".to_string(),
                });
            }
            if !seen.insert(cat.name.clone()) {
                return Err(NewsBriefError::DuplicateCategory {
                    name: cat.name.clone(),
                });
            }
        }

        Ok(Self {
            categories,
            default_category,
        })
    }

    pub fn get(&self, name: &str) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Named categories in priority order (default bucket excluded).
    pub fn all(&self) -> &[CategoryDef] {
        &self.categories
    }

    /// All labels in priority order, default bucket last.
    pub fn names(&self) -> Vec<&str> {
        self.categories
            .iter()
            .map(|c| c.name.as_str())
            .chain(std::iter::once(self.default_category.as_str()))
            .collect()
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    /// Whether `label` names a category of this taxonomy (default included).
    pub fn contains(&self, label: &str) -> bool {
        label == self.default_category || self.get(label).is_some()
    }

    /// Priority rank, 0 is highest. Unknown labels rank with the default bucket.
    pub fn rank(&self, name: &str) -> usize {
        self.categories
            .iter()
            .position(|c| c.name == name)
            .unwrap_or(self.categories.len())
    }
}

impl Default for CategoryStore {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, keywords: &[&str]) -> CategoryDef {
        CategoryDef {
            name: name.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_category_store_builtin() {
        let store = CategoryStore::builtin();
        assert!(store.get("市委教委").is_some());
        assert!(store.get("nonexistent").is_none());
        assert_eq!(store.names(), vec!["市委教委", "中小学", "高校", "其他"]);
    }

    #[test]
    fn test_rank_order() {
        let store = CategoryStore::builtin();
        assert_eq!(store.rank("市委教委"), 0);
        assert_eq!(store.rank("中小学"), 1);
        assert_eq!(store.rank("高校"), 2);
        assert_eq!(store.rank("其他"), 3);
        assert_eq!(store.rank("unknown"), 3);
    }

    #[test]
    fn test_custom_taxonomy() {
        let store = CategoryStore::new(
            vec![def("省", &["省"]), def("市", &["市"]), def("学校", &["学校"])],
            "其余",
        )
        .unwrap();
        assert_eq!(store.names(), vec!["省", "市", "学校", "其余"]);
        assert!(store.contains("其余"));
        assert!(store.contains("市"));
        assert!(!store.contains("其他"));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let err = CategoryStore::new(vec![def("高校", &[]), def("高校", &[])], "其他").unwrap_err();
        assert!(matches!(err, NewsBriefError::DuplicateCategory { name } if name == "高校"));

        let err = CategoryStore::new(vec![def("其他", &[])], "其他").unwrap_err();
        assert!(matches!(err, NewsBriefError::DuplicateCategory { .. }));
    }

    #[test]
    fn test_empty_names_rejected() {
        assert!(CategoryStore::new(vec![], " ").is_err());
        assert!(CategoryStore::new(vec![def("", &[])], "其他").is_err());
    }
}
