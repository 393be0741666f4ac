//! Builtin Category Definitions
//!
//! Keyword taxonomy used to reorder briefs, plus the closed set of four
//! headers that summary files are merged under.

use serde::{Deserialize, Serialize};

/// Bucket for entries no keyword matches. Always sorts last.
pub const DEFAULT_CATEGORY: &str = "其他";

/// Builtin taxonomy, highest priority first.
pub const BUILTIN_CATEGORIES: &[BuiltinCategory] = &[
    BuiltinCategory {
        name: "市委教委",
        keywords: &[
            "市委教委",
            "市委教育工委",
            "市教委",
            "教工委",
            "教育工委",
            "教育委员会",
            "首都教育两委",
            "教育两委",
        ],
    },
    BuiltinCategory {
        name: "中小学",
        keywords: &[
            "中小学",
            "小学",
            "初中",
            "高中",
            "义务教育",
            "基础教育",
            "幼儿园",
            "幼儿",
            "托育",
            "K12",
            "班主任",
            "青少年",
            "少儿",
            "少年",
        ],
    },
    BuiltinCategory {
        name: "高校",
        keywords: &["高校", "大学", "学院", "本科", "研究生", "硕士", "博士"],
    },
];

/// Static taxonomy entry.
#[derive(Debug, Clone)]
pub struct BuiltinCategory {
    /// Category label (unique).
    pub name: &'static str,
    /// Substrings that place an entry in this category.
    pub keywords: &'static [&'static str],
}

/// Runtime taxonomy entry, built from the builtins or from `newsbrief.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl From<&BuiltinCategory> for CategoryDef {
    fn from(builtin: &BuiltinCategory) -> Self {
        Self {
            name: builtin.name.to_string(),
            keywords: builtin.keywords.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The four headers a merged summary is organised under, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MergeCategory {
    #[serde(rename = "京内正面")]
    DomesticPositive,
    #[serde(rename = "京内负面")]
    DomesticNegative,
    #[serde(rename = "京外正面")]
    ExternalPositive,
    #[serde(rename = "京外负面")]
    ExternalNegative,
}

impl MergeCategory {
    pub const ALL: [MergeCategory; 4] = [
        MergeCategory::DomesticPositive,
        MergeCategory::DomesticNegative,
        MergeCategory::ExternalPositive,
        MergeCategory::ExternalNegative,
    ];

    /// Label as written between the header brackets.
    pub fn label(self) -> &'static str {
        match self {
            Self::DomesticPositive => "京内正面",
            Self::DomesticNegative => "京内负面",
            Self::ExternalPositive => "京外正面",
            Self::ExternalNegative => "京外负面",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Header line for a merged document holding `count` entries.
    pub fn header_line(self, count: usize) -> String {
        format!("【{}】共 {} 条", self.label(), count)
    }
}

impl std::fmt::Display for MergeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
