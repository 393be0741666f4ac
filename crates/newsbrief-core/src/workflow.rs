//! File I/O around the text operations.
//!
//! Every command reads UTF-8 text, runs a pure transformation and writes the
//! result back only when it differs. A file that cannot be read is reported
//! as skipped and the batch carries on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::category::CategoryClassifier;
use crate::cleanup::Cleaner;
use crate::error::{NewsBriefError, Result};
use crate::fragment::FragmentNaming;
use crate::importance::{sort_by_importance, SortOutcome};
use crate::merge::{merge, Fragment, MergeStats, MergedDocument};
use crate::numbering::{number_titles, NumberingOptions};
use crate::reorder::{reorder_text, ReorderOptions, ReorderOutcome};
use crate::segment::SegmentOptions;

/// Callback type for file operation progress reporting
pub type FileCallback<'a> = Option<&'a dyn Fn(&str, &str)>;

const BACKUP_EXTENSION: &str = "bak";

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    Written,
    /// Would have been written without `--dry-run`.
    DryRun,
    Skipped(String),
}

impl FileOutcome {
    /// Status tag handed to the progress callback.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Unchanged => "OK",
            Self::Written => "EDIT",
            Self::DryRun => "DRY",
            Self::Skipped(_) => "SKIP",
        }
    }

    pub fn is_modified(&self) -> bool {
        matches!(self, Self::Written | Self::DryRun)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Per-file results of a batch command.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn modified(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_modified()).count()
    }

    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Skipped(_)))
            .count()
    }

    fn record(&mut self, path: &Path, outcome: FileOutcome, on_file: FileCallback<'_>) {
        if let Some(f) = on_file {
            let detail = match &outcome {
                FileOutcome::Skipped(reason) => format!("{} ({})", path.display(), reason),
                _ => path.display().to_string(),
            };
            f(outcome.tag(), &detail);
        }
        self.files.push(FileReport {
            path: path.to_path_buf(),
            outcome,
        });
    }
}

/// Read a file as UTF-8, mapping decode failures to [`NewsBriefError::Encoding`].
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData => NewsBriefError::Encoding {
            path: path.to_path_buf(),
        },
        io::ErrorKind::NotFound => NewsBriefError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => NewsBriefError::Io(e),
    })
}

/// Write `text` to `path` unless `dry_run`; returns the matching outcome.
fn write_text(path: &Path, text: &str, dry_run: bool) -> Result<FileOutcome> {
    if dry_run {
        return Ok(FileOutcome::DryRun);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)?;
    Ok(FileOutcome::Written)
}

/// [`write_text`] for batch passes: a failed write skips the file.
fn try_write(path: &Path, text: &str, dry_run: bool) -> FileOutcome {
    write_text(path, text, dry_run).unwrap_or_else(|e| {
        warn!("failed to write {}: {}", path.display(), e);
        FileOutcome::Skipped(e.to_string())
    })
}

fn is_txt(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

/// Collect `.txt` files under `root`, sorted. `root` may itself be a file.
pub fn collect_txt_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(NewsBriefError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if root.is_file() {
        return Ok(if is_txt(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_txt(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    Ok(files)
}

/// Files in `root` whose name starts with `prefix` and ends in `.txt`.
pub fn glob_prefixed(root: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(NewsBriefError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    let pattern = format!(
        "{}/{}*.txt",
        Pattern::escape(&root.to_string_lossy()),
        Pattern::escape(prefix)
    );
    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|p| p.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

// ============================================================================
// Reorder
// ============================================================================

#[derive(Debug)]
pub struct ReorderReport {
    pub output: PathBuf,
    pub outcome: ReorderOutcome,
    pub file: FileOutcome,
}

/// Reorder one brief. Writes in place unless `output` is given.
pub fn run_reorder(
    input: &Path,
    output: Option<&Path>,
    classifier: &CategoryClassifier,
    options: &ReorderOptions,
    dry_run: bool,
) -> Result<ReorderReport> {
    if !input.is_file() {
        return Err(NewsBriefError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    let text = read_text(input)?;
    let outcome = reorder_text(&text, classifier, options);
    let output = output.unwrap_or(input).to_path_buf();

    let file = if outcome.changed || output != input {
        write_text(&output, &outcome.render(), dry_run)?
    } else {
        FileOutcome::Unchanged
    };
    info!("reorder {}: {:?}", input.display(), file);

    Ok(ReorderReport {
        output,
        outcome,
        file,
    })
}

// ============================================================================
// Merge
// ============================================================================

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Directory for merged files; defaults to the scanned root.
    pub output_dir: Option<PathBuf>,
    pub delete_sources: bool,
    pub dry_run: bool,
    pub renumber: bool,
    pub segment: SegmentOptions,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            delete_sources: true,
            dry_run: false,
            renumber: false,
            segment: SegmentOptions::paragraphs(),
        }
    }
}

/// Result of merging the fragments of one date.
#[derive(Debug)]
pub struct DateReport {
    pub date_key: String,
    pub output: PathBuf,
    pub stats: MergeStats,
    /// Duplicates collapsed inside the pre-existing merged file.
    pub collapsed: usize,
    pub file: FileOutcome,
    pub removed: Vec<PathBuf>,
    /// Fragments that could not be read.
    pub unreadable: Vec<FileReport>,
}

#[derive(Debug, Default)]
pub struct MergeReport {
    pub dates: Vec<DateReport>,
}

impl MergeReport {
    pub fn written(&self) -> usize {
        self.dates.iter().filter(|d| d.file.is_modified()).count()
    }
}

/// Merge every dated fragment group found in `root`.
pub fn run_merge(
    root: &Path,
    naming: &FragmentNaming,
    options: &MergeOptions,
    on_file: FileCallback<'_>,
) -> Result<MergeReport> {
    let candidates = glob_prefixed(root, naming.prefix())?;
    let output_dir = options.output_dir.clone().unwrap_or_else(|| root.to_path_buf());
    let mut report = MergeReport::default();

    let groups = naming.group(&candidates);
    if groups.is_empty() {
        info!("no fragments found in {}", root.display());
    }

    for group in groups {
        let output = output_dir.join(naming.output_name(&group.date_key));
        let mut unreadable = Vec::new();
        let mut fragments = Vec::new();
        let mut consumed = Vec::new();

        for path in &group.paths {
            match read_text(path) {
                Ok(text) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    fragments.push(Fragment::parse_with(name, &text, options.segment));
                    consumed.push(path.clone());
                }
                Err(e) => {
                    let outcome = FileOutcome::Skipped(e.to_string());
                    if let Some(f) = on_file {
                        f(outcome.tag(), &format!("{} ({})", path.display(), e));
                    }
                    unreadable.push(FileReport {
                        path: path.clone(),
                        outcome,
                    });
                }
            }
        }

        if fragments.iter().all(Fragment::is_empty) {
            warn!("[{}] fragments contain no entries, skipping", group.date_key);
            if let Some(f) = on_file {
                f("SKIP", &format!("{} (no entries)", group.date_key));
            }
            report.dates.push(DateReport {
                date_key: group.date_key,
                output,
                stats: MergeStats::default(),
                collapsed: 0,
                file: FileOutcome::Skipped("no entries".to_string()),
                removed: Vec::new(),
                unreadable,
            });
            continue;
        }

        let existing_text = if output.exists() {
            match read_text(&output) {
                Ok(text) => Some(text),
                Err(e) => {
                    // Never overwrite a merged file we cannot parse.
                    let reason = e.to_string();
                    if let Some(f) = on_file {
                        f("SKIP", &format!("{} ({})", output.display(), reason));
                    }
                    report.dates.push(DateReport {
                        date_key: group.date_key,
                        output,
                        stats: MergeStats::default(),
                        collapsed: 0,
                        file: FileOutcome::Skipped(reason),
                        removed: Vec::new(),
                        unreadable,
                    });
                    continue;
                }
            }
        } else {
            None
        };
        let existing = existing_text
            .as_deref()
            .map(|text| MergedDocument::parse_with(text, options.segment));
        let collapsed = existing.as_ref().map_or(0, |p| p.duplicates_collapsed);

        let outcome = merge(existing.as_ref().map(|p| &p.document), &fragments);
        let rendered = outcome.document.render(options.renumber);
        let file = if outcome.changed || existing_text.as_deref() != Some(rendered.as_str()) {
            try_write(&output, &rendered, options.dry_run)
        } else {
            FileOutcome::Unchanged
        };
        if let Some(f) = on_file {
            match &file {
                FileOutcome::Skipped(reason) => {
                    f(file.tag(), &format!("{} ({})", output.display(), reason))
                }
                _ => f("MERGE", &format!("{} <- {} fragment(s)", output.display(), consumed.len())),
            }
        }
        debug!("[{}] {:?}", group.date_key, outcome.stats);

        // Fragments are only removed once their merged file is safely on disk.
        let mut removed = Vec::new();
        let persisted = !matches!(file, FileOutcome::Skipped(_));
        if options.delete_sources && !options.dry_run && persisted {
            for path in consumed {
                match fs::remove_file(&path) {
                    Ok(()) => removed.push(path),
                    Err(e) => warn!("failed to remove {}: {}", path.display(), e),
                }
            }
        }

        report.dates.push(DateReport {
            date_key: group.date_key,
            output,
            stats: outcome.stats,
            collapsed,
            file,
            removed,
            unreadable,
        });
    }

    Ok(report)
}

// ============================================================================
// Batch text passes
// ============================================================================

/// Apply `transform` to each file, writing back the ones it changes.
fn rewrite_each<F>(
    files: &[PathBuf],
    dry_run: bool,
    on_file: FileCallback<'_>,
    mut transform: F,
) -> Result<BatchReport>
where
    F: FnMut(&Path, &str) -> Result<Option<String>>,
{
    let mut report = BatchReport::default();
    for path in files {
        let text = match read_text(path) {
            Ok(text) => text,
            Err(e) => {
                report.record(path, FileOutcome::Skipped(e.to_string()), on_file);
                continue;
            }
        };
        let outcome = match transform(path, &text)? {
            Some(new_text) => try_write(path, &new_text, dry_run),
            None => FileOutcome::Unchanged,
        };
        report.record(path, outcome, on_file);
    }
    Ok(report)
}

/// Run the cleanup replacements over every `.txt` file under `root`.
pub fn run_clean(
    root: &Path,
    cleaner: &Cleaner,
    dry_run: bool,
    on_file: FileCallback<'_>,
) -> Result<BatchReport> {
    let files = collect_txt_files(root, true)?;
    rewrite_each(&files, dry_run, on_file, |_, text| {
        let (cleaned, changed) = cleaner.clean(text);
        Ok(changed.then_some(cleaned))
    })
}

/// Number title lines in the given files and directories (`*.txt`, not
/// recursive). Missing or non-text targets are reported and skipped.
pub fn run_number(
    targets: &[PathBuf],
    options: &NumberingOptions,
    dry_run: bool,
    on_file: FileCallback<'_>,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    let mut files: Vec<PathBuf> = Vec::new();

    for target in targets {
        if target.is_file() && !is_txt(target) {
            report.record(target, FileOutcome::Skipped("not a .txt file".to_string()), on_file);
            continue;
        }
        if !target.exists() {
            report.record(
                target,
                FileOutcome::Skipped("path does not exist".to_string()),
                on_file,
            );
            continue;
        }
        for file in collect_txt_files(target, false)? {
            if !files.contains(&file) {
                files.push(file);
            }
        }
    }

    let numbered = rewrite_each(&files, dry_run, on_file, |_, text| {
        let result = number_titles(text, options);
        Ok(result.changed.then_some(result.text))
    })?;
    report.files.extend(numbered.files);
    Ok(report)
}

// ============================================================================
// Importance sort
// ============================================================================

/// Backup path for `path`: `name.txt` becomes `name.txt.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(BACKUP_EXTENSION);
    PathBuf::from(name)
}

/// Copy `path` to its backup; returns the backup path.
pub fn backup(path: &Path) -> Result<PathBuf> {
    let target = backup_path(path);
    fs::copy(path, &target)?;
    Ok(target)
}

/// Copy the backup of `path` back over it.
pub fn restore(path: &Path) -> Result<PathBuf> {
    let source = backup_path(path);
    if !source.is_file() {
        return Err(NewsBriefError::BackupNotFound {
            path: path.to_path_buf(),
        });
    }
    fs::copy(&source, path)?;
    Ok(source)
}

#[derive(Debug)]
pub struct SortReport {
    pub path: PathBuf,
    pub sort: Option<SortOutcome>,
    pub backup: Option<PathBuf>,
    pub file: FileOutcome,
}

/// Sort entries by importance in each file, optionally backing it up first.
pub fn run_sort(
    files: &[PathBuf],
    make_backup: bool,
    dry_run: bool,
    on_file: FileCallback<'_>,
) -> Result<Vec<SortReport>> {
    let mut reports = Vec::new();
    for path in files {
        let text = match read_text(path) {
            Ok(text) => text,
            Err(e) => {
                let file = FileOutcome::Skipped(e.to_string());
                if let Some(f) = on_file {
                    f(file.tag(), &format!("{} ({})", path.display(), e));
                }
                reports.push(SortReport {
                    path: path.clone(),
                    sort: None,
                    backup: None,
                    file,
                });
                continue;
            }
        };

        let outcome = sort_by_importance(&text);
        let mut backup_file = None;
        let file = if !outcome.changed {
            FileOutcome::Unchanged
        } else if make_backup && !dry_run {
            match backup(path) {
                Ok(target) => {
                    backup_file = Some(target);
                    try_write(path, &outcome.text, dry_run)
                }
                Err(e) => {
                    warn!("failed to back up {}: {}", path.display(), e);
                    FileOutcome::Skipped(format!("backup failed: {}", e))
                }
            }
        } else {
            try_write(path, &outcome.text, dry_run)
        };
        if let Some(f) = on_file {
            match &file {
                FileOutcome::Skipped(reason) => {
                    f(file.tag(), &format!("{} ({})", path.display(), reason))
                }
                _ => f(file.tag(), &path.display().to_string()),
            }
        }
        reports.push(SortReport {
            path: path.clone(),
            sort: Some(outcome),
            backup: backup_file,
            file,
        });
    }
    Ok(reports)
}
