use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::category::{CategoryClassifier, CategoryDef, CategoryStore, BUILTIN_CATEGORIES, DEFAULT_CATEGORY};
use crate::cleanup::{Cleaner, DEFAULT_REPLACEMENTS};
use crate::error::{NewsBriefError, Result};
use crate::fragment::FragmentNaming;
use crate::numbering::NumberingOptions;
use crate::reorder::ReorderOptions;

const CONFIG_FILE: &str = "newsbrief.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# newsbrief configuration file
# Location: ~/.newsbrief/newsbrief.toml

[reorder]
# Bucket for entries that match no keyword (always sorted last)
default_category = "其他"

# Sections whose heading contains one of these are never reordered
frozen_sections = ["舆情参考"]

# Rewrite 一、二、三… markers after reordering
renumber = false

# Categories in priority order; the first category with a matching keyword wins.
# Omit to use the builtin taxonomy (市委教委 > 中小学 > 高校 > 其他).
# Edit this table here; `config set` does not accept it.
# [[reorder.categories]]
# name = "市委教委"
# keywords = ["市委教委", "市教委", "教工委"]

[merge]
# Fragment files look like <file_prefix>YYYY_MM_DD(n).txt
file_prefix = "high_score_summaries_"

# Merged output: <file_prefix>YYYY_MM_DD<suffix>.txt
suffix = "_merged"

# Delete consumed fragment files after a successful merge
delete_sources = true

# Blank lines separate entries in fragment files
split_on_blank_lines = true

# Rewrite 一、二、三… markers per category in the merged output
renumber = false

[numbering]
# Leading lines (masthead, date) that are never numbered
skip_leading_lines = 5

# A line is a title only if the following line is longer than this
min_body_chars = 50

# [cleanup]
# Literal replacements applied in order (omit to use the builtin list).
# Edit this table here; `config set` does not accept it.
# replacements = [["来源：", ""], ["北京日报客户端", "北京日报"]]
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub reorder: ReorderConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub numbering: NumberingOptions,

    #[serde(default)]
    pub cleanup: CleanupConfig,
}

/// Reorder-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorderConfig {
    #[serde(default = "default_category_name")]
    pub default_category: String,

    /// Sections whose heading contains one of these are never reordered
    #[serde(default = "default_frozen_sections")]
    pub frozen_sections: Vec<String>,

    #[serde(default)]
    pub renumber: bool,

    /// Taxonomy in priority order
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryDef>,
}

fn default_category_name() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_frozen_sections() -> Vec<String> {
    ReorderOptions::default().frozen_sections
}

fn default_categories() -> Vec<CategoryDef> {
    BUILTIN_CATEGORIES.iter().map(CategoryDef::from).collect()
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            default_category: default_category_name(),
            frozen_sections: default_frozen_sections(),
            renumber: false,
            categories: default_categories(),
        }
    }
}

/// Merge-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeConfig {
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    #[serde(default = "default_suffix")]
    pub suffix: String,

    #[serde(default = "default_true")]
    pub delete_sources: bool,

    #[serde(default = "default_true")]
    pub split_on_blank_lines: bool,

    #[serde(default)]
    pub renumber: bool,
}

fn default_file_prefix() -> String {
    "high_score_summaries_".to_string()
}

fn default_suffix() -> String {
    "_merged".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
            suffix: default_suffix(),
            delete_sources: true,
            split_on_blank_lines: true,
            renumber: false,
        }
    }
}

/// Cleanup-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupConfig {
    #[serde(default = "default_replacements")]
    pub replacements: Vec<(String, String)>,
}

fn default_replacements() -> Vec<(String, String)> {
    DEFAULT_REPLACEMENTS
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            replacements: default_replacements(),
        }
    }
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        Self::load_file(&Self::path(base_dir))
    }

    /// Load config from an explicit file; a missing file yields defaults
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| NewsBriefError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        self.save_file(&Self::path(base_dir))
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = Self::path(base_dir);
        Self::init_file(&path)?;
        Ok(path)
    }

    /// Write the template to `path` unless a file is already there.
    /// Returns whether the file was created.
    pub fn init_file(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(true)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        self.list()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "reorder.default_category" => self.reorder.default_category = value.trim().to_string(),
            "reorder.frozen_sections" => self.reorder.frozen_sections = parse_string_list(value)?,
            "reorder.renumber" => self.reorder.renumber = parse_bool(key, value)?,
            "merge.file_prefix" => self.merge.file_prefix = value.trim().to_string(),
            "merge.suffix" => self.merge.suffix = value.trim().to_string(),
            "merge.delete_sources" => self.merge.delete_sources = parse_bool(key, value)?,
            "merge.split_on_blank_lines" => self.merge.split_on_blank_lines = parse_bool(key, value)?,
            "merge.renumber" => self.merge.renumber = parse_bool(key, value)?,
            "numbering.skip_leading_lines" => {
                self.numbering.skip_leading_lines = parse_usize(key, value)?
            }
            "numbering.min_body_chars" => self.numbering.min_body_chars = parse_usize(key, value)?,
            _ => {
                return Err(NewsBriefError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List every settable key with its current value. Table-valued settings
    /// (`reorder.categories`, `cleanup.replacements`) live in the file only.
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            (
                "reorder.default_category".to_string(),
                self.reorder.default_category.clone(),
            ),
            (
                "reorder.frozen_sections".to_string(),
                format!("{:?}", self.reorder.frozen_sections),
            ),
            (
                "reorder.renumber".to_string(),
                self.reorder.renumber.to_string(),
            ),
            ("merge.file_prefix".to_string(), self.merge.file_prefix.clone()),
            ("merge.suffix".to_string(), self.merge.suffix.clone()),
            (
                "merge.delete_sources".to_string(),
                self.merge.delete_sources.to_string(),
            ),
            (
                "merge.split_on_blank_lines".to_string(),
                self.merge.split_on_blank_lines.to_string(),
            ),
            ("merge.renumber".to_string(), self.merge.renumber.to_string()),
            (
                "numbering.skip_leading_lines".to_string(),
                self.numbering.skip_leading_lines.to_string(),
            ),
            (
                "numbering.min_body_chars".to_string(),
                self.numbering.min_body_chars.to_string(),
            ),
        ]
    }

    /// Build the reorder taxonomy
    pub fn category_store(&self) -> Result<CategoryStore> {
        CategoryStore::new(
            self.reorder.categories.clone(),
            self.reorder.default_category.clone(),
        )
    }

    pub fn reorder_options(&self) -> ReorderOptions {
        ReorderOptions {
            frozen_sections: self.reorder.frozen_sections.clone(),
            renumber: self.reorder.renumber,
        }
    }

    pub fn classifier(&self) -> Result<CategoryClassifier> {
        Ok(CategoryClassifier::new(self.category_store()?))
    }

    pub fn fragment_naming(&self) -> Result<FragmentNaming> {
        FragmentNaming::new(self.merge.file_prefix.clone(), self.merge.suffix.clone())
    }

    pub fn cleaner(&self) -> Cleaner {
        Cleaner::new(self.cleanup.replacements.clone())
    }
}

/// Parse a comma-separated or JSON-like list string
fn parse_string_list(value: &str) -> Result<Vec<String>> {
    let trimmed = value.trim();
    let inner = if trimmed.starts_with('[') && trimmed.ends_with(']') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    Ok(inner
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(NewsBriefError::ConfigValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize> {
    value.trim().parse().map_err(|_| NewsBriefError::ConfigValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
