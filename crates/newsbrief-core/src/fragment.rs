//! Fragment file naming.
//!
//! Summary fragments are named `<prefix><YYYY_MM_DD>(<n>).txt`; the merged
//! output for a date is `<prefix><YYYY_MM_DD><suffix>.txt`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regex::Regex;

use crate::error::Result;

/// Parsed fragment file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentName {
    pub date: NaiveDate,
    /// Date as written in the file name (`2025_11_02`).
    pub date_key: String,
    /// Fragment index; `None` for a bare dated file, which sorts first.
    pub index: Option<u32>,
}

/// Fragment files of one date, in merge order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentGroup {
    pub date: NaiveDate,
    pub date_key: String,
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct FragmentNaming {
    prefix: String,
    suffix: String,
    pattern: Regex,
}

impl FragmentNaming {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let suffix = suffix.into();
        let pattern = Regex::new(&format!(
            r"^{}(\d{{4}}[_-]\d{{2}}[_-]\d{{2}})(?:\((\d+)\))?\.txt$",
            regex::escape(&prefix)
        ))?;
        Ok(Self {
            prefix,
            suffix,
            pattern,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Parse a file name. Merged outputs and invalid dates are not fragments.
    pub fn parse(&self, file_name: &str) -> Option<FragmentName> {
        if file_name == self.output_name_for(file_name)? {
            return None;
        }
        let caps = self.pattern.captures(file_name)?;
        let date_key = caps.get(1)?.as_str().to_string();
        let date = NaiveDate::parse_from_str(&date_key.replace('-', "_"), "%Y_%m_%d").ok()?;
        let index = match caps.get(2) {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        Some(FragmentName {
            date,
            date_key,
            index,
        })
    }

    /// The merged output name for a date key.
    pub fn output_name(&self, date_key: &str) -> String {
        format!("{}{}{}.txt", self.prefix, date_key, self.suffix)
    }

    /// Output name that a file with this name would merge into, if it
    /// carries a date at all.
    fn output_name_for(&self, file_name: &str) -> Option<String> {
        let caps = self.pattern.captures(file_name)?;
        Some(self.output_name(caps.get(1)?.as_str()))
    }

    /// Group fragment paths by date, each group sorted by fragment index.
    pub fn group<I, P>(&self, paths: I) -> Vec<FragmentGroup>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut grouped: BTreeMap<NaiveDate, (String, Vec<(Option<u32>, PathBuf)>)> =
            BTreeMap::new();

        for path in paths {
            let path = path.as_ref();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(parsed) = self.parse(name) else {
                continue;
            };
            let slot = grouped
                .entry(parsed.date)
                .or_insert_with(|| (parsed.date_key.clone(), Vec::new()));
            slot.1.push((parsed.index, path.to_path_buf()));
        }

        grouped
            .into_iter()
            .map(|(date, (date_key, mut items))| {
                items.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
                FragmentGroup {
                    date,
                    date_key,
                    paths: items.into_iter().map(|(_, p)| p).collect(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> FragmentNaming {
        FragmentNaming::new("high_score_summaries_", "_merged").unwrap()
    }

    #[test]
    fn test_parse_fragment_name() {
        let parsed = naming()
            .parse("high_score_summaries_2025_11_02(3).txt")
            .unwrap();
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2025, 11, 2).unwrap());
        assert_eq!(parsed.date_key, "2025_11_02");
        assert_eq!(parsed.index, Some(3));
    }

    #[test]
    fn test_parse_without_index() {
        let parsed = naming().parse("high_score_summaries_2025-11-02.txt").unwrap();
        assert_eq!(parsed.index, None);
        assert_eq!(parsed.date_key, "2025-11-02");
    }

    #[test]
    fn test_rejects_non_fragments() {
        let naming = naming();
        assert!(naming.parse("high_score_summaries_2025_11_02_merged.txt").is_none());
        assert!(naming.parse("high_score_summaries_2025_13_40(1).txt").is_none());
        assert!(naming.parse("other_2025_11_02(1).txt").is_none());
        assert!(naming.parse("high_score_summaries_2025_11_02(1).md").is_none());
    }

    #[test]
    fn test_empty_suffix_output_is_not_a_fragment() {
        let naming = FragmentNaming::new("high_score_summaries_", "").unwrap();
        assert!(naming.parse("high_score_summaries_2025_11_02.txt").is_none());
        assert!(naming.parse("high_score_summaries_2025_11_02(1).txt").is_some());
    }

    #[test]
    fn test_prefix_is_literal() {
        let naming = FragmentNaming::new("a.b_", "_merged").unwrap();
        assert!(naming.parse("a.b_2025_01_01(1).txt").is_some());
        assert!(naming.parse("axb_2025_01_01(1).txt").is_none());
    }

    #[test]
    fn test_output_name() {
        assert_eq!(
            naming().output_name("2025_11_02"),
            "high_score_summaries_2025_11_02_merged.txt"
        );
    }

    #[test]
    fn test_group_sorts_numerically() {
        let groups = naming().group([
            "dir/high_score_summaries_2025_11_02(10).txt",
            "dir/high_score_summaries_2025_11_02(2).txt",
            "dir/high_score_summaries_2025_11_01(1).txt",
            "dir/high_score_summaries_2025_11_02(1).txt",
            "dir/notes.txt",
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date_key, "2025_11_01");
        let names: Vec<String> = groups[1]
            .paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "high_score_summaries_2025_11_02(1).txt",
                "high_score_summaries_2025_11_02(2).txt",
                "high_score_summaries_2025_11_02(10).txt",
            ]
        );
    }
}
