use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::{ColoredString, Colorize};
use log::LevelFilter;

use newsbrief_core::config::Config;
use newsbrief_core::workflow::{self, FileOutcome, MergeOptions};
use newsbrief_core::{Advisory, MergeCategory, NewsBriefError, Result, SegmentOptions};

mod args;
use args::{Cli, Commands, ConfigAction, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    let config_path = resolve_config_path(cli.config);
    let quiet = cli.quiet;

    let result = match cli.command {
        Some(Commands::Reorder {
            input,
            output,
            dry_run,
            renumber,
        }) => handle_reorder(&config_path, &input, output.as_deref(), dry_run, renumber, quiet),
        Some(Commands::Merge {
            root,
            output_dir,
            suffix,
            keep_sources,
            dry_run,
            renumber,
            json,
        }) => handle_merge(
            &config_path,
            &root,
            output_dir,
            suffix,
            keep_sources,
            dry_run,
            renumber,
            json,
            quiet,
        ),
        Some(Commands::Sort {
            file,
            backup,
            restore,
            root,
            dry_run,
        }) => handle_sort(&config_path, file, backup, restore, &root, dry_run, quiet),
        Some(Commands::Clean { root, dry_run }) => handle_clean(&config_path, &root, dry_run, quiet),
        Some(Commands::Number { targets, dry_run }) => {
            handle_number(&config_path, &targets, dry_run, quiet)
        }
        Some(Commands::Config { action }) => handle_config(action, &config_path),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_logger(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.to_string().to_lowercase()),
    )
    .format_timestamp(None)
    .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "newsbrief", &mut io::stdout());
}

fn resolve_base_dir() -> PathBuf {
    if let Ok(base) = std::env::var("NEWSBRIEF_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".newsbrief"))
        .unwrap_or_else(|| PathBuf::from(".newsbrief"))
}

fn resolve_config_path(cli_config: Option<PathBuf>) -> PathBuf {
    cli_config.unwrap_or_else(|| Config::path(&resolve_base_dir()))
}

fn status_tag(status: &str) -> ColoredString {
    let tag = format!("[{}]", status.to_lowercase());
    match status {
        "OK" => tag.green(),
        "EDIT" | "MERGE" => tag.cyan(),
        "DRY" => tag.yellow(),
        "SKIP" => tag.yellow().bold(),
        _ => tag.normal(),
    }
}

fn print_status(status: &str, path: &str) {
    println!("  {} {}", status_tag(status), path);
}

fn print_header(title: &str, dry_run: bool) {
    println!();
    println!("{}", title);
    if dry_run {
        println!("{}", "(dry run)".yellow());
    }
    println!();
}

fn handle_reorder(
    config_path: &Path,
    input: &Path,
    output: Option<&Path>,
    dry_run: bool,
    renumber: bool,
    quiet: bool,
) -> Result<()> {
    let config = Config::load_file(config_path)?;
    let classifier = config.classifier()?;
    let mut options = config.reorder_options();
    options.renumber |= renumber;

    let report = workflow::run_reorder(input, output, &classifier, &options, dry_run)?;
    if quiet {
        return Ok(());
    }

    print_header(&format!("Reorder: {}", input.display().to_string().cyan()), dry_run);
    if report.outcome.advisory == Some(Advisory::NothingToReorder) {
        println!("  {} no entries found, nothing to reorder", status_tag("SKIP"));
        println!();
        return Ok(());
    }

    for section in &report.outcome.sections {
        let heading = section.heading.as_deref().unwrap_or("(top)");
        let counts: Vec<String> = section
            .counts
            .iter()
            .map(|(name, n)| format!("{} {}", name, n))
            .collect();
        let note = if section.frozen {
            " (kept)".dimmed().to_string()
        } else if section.changed {
            " (reordered)".green().to_string()
        } else {
            String::new()
        };
        println!("  {} {}{}", heading, counts.join(", "), note);
    }

    println!();
    print_status(report.file.tag(), &report.output.display().to_string());
    println!();
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_merge(
    config_path: &Path,
    root: &Path,
    output_dir: Option<PathBuf>,
    suffix: Option<String>,
    keep_sources: bool,
    dry_run: bool,
    renumber: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut config = Config::load_file(config_path)?;
    if let Some(suffix) = suffix {
        config.merge.suffix = suffix;
    }
    let naming = config.fragment_naming()?;
    let options = MergeOptions {
        output_dir,
        delete_sources: config.merge.delete_sources && !keep_sources,
        dry_run,
        renumber: config.merge.renumber || renumber,
        segment: SegmentOptions {
            split_on_blank_lines: config.merge.split_on_blank_lines,
        },
    };

    let show_progress = !quiet && !json;
    if show_progress {
        print_header(&format!("Merge: {}", root.display().to_string().cyan()), dry_run);
    }
    let on_file = |status: &str, path: &str| print_status(status, path);
    let report = workflow::run_merge(
        root,
        &naming,
        &options,
        show_progress.then_some(&on_file as &dyn Fn(&str, &str)),
    )?;

    if json {
        let stats: Vec<serde_json::Value> = report
            .dates
            .iter()
            .map(|d| {
                serde_json::json!({
                    "date": d.date_key,
                    "output": d.output.display().to_string(),
                    "status": d.file.tag(),
                    "stats": d.stats,
                    "collapsed": d.collapsed,
                    "removed": d.removed.len(),
                })
            })
            .collect();
        let text = serde_json::to_string_pretty(&stats)
            .map_err(|e| NewsBriefError::Io(e.into()))?;
        println!("{}", text);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    if report.dates.is_empty() {
        println!("  No fragment files found.");
    }
    for date in &report.dates {
        if matches!(date.file, FileOutcome::Skipped(_)) {
            continue;
        }
        let counts: Vec<String> = MergeCategory::ALL
            .iter()
            .map(|c| {
                let s = date.stats.get(*c);
                format!("{} +{} ={}", c, s.added, s.kept + s.added)
            })
            .collect();
        println!(
            "  [{}] {} ({})",
            date.date_key,
            date.file.tag().to_lowercase(),
            counts.join(", ")
        );
        if date.stats.total_duplicates() + date.collapsed > 0 {
            println!(
                "    {} duplicate(s) skipped",
                date.stats.total_duplicates() + date.collapsed
            );
        }
        if !date.removed.is_empty() {
            println!("    removed {} fragment file(s)", date.removed.len());
        }
    }

    println!();
    println!(
        "{} {} of {} date(s) written",
        "Merge complete:".green(),
        report.written(),
        report.dates.len()
    );
    Ok(())
}

fn handle_sort(
    config_path: &Path,
    file: Option<PathBuf>,
    backup: bool,
    restore: bool,
    root: &Path,
    dry_run: bool,
    quiet: bool,
) -> Result<()> {
    if restore {
        let path = file.ok_or_else(|| NewsBriefError::InputNotFound {
            path: PathBuf::from("--file"),
        })?;
        let source = workflow::restore(&path)?;
        if !quiet {
            println!(
                "{} {} from {}",
                "Restored:".green(),
                path.display(),
                source.display()
            );
        }
        return Ok(());
    }

    let (files, make_backup) = match file {
        Some(path) => {
            if !path.is_file() {
                return Err(NewsBriefError::InputNotFound { path });
            }
            (vec![path], backup)
        }
        None => {
            let config = Config::load_file(config_path)?;
            (workflow::glob_prefixed(root, &config.merge.file_prefix)?, true)
        }
    };

    if !quiet {
        print_header(&format!("Sort: {} file(s)", files.len()), dry_run);
    }
    let on_file = |status: &str, path: &str| print_status(status, path);
    let reports = workflow::run_sort(
        &files,
        make_backup,
        dry_run,
        (!quiet).then_some(&on_file as &dyn Fn(&str, &str)),
    )?;

    if quiet {
        return Ok(());
    }
    for report in &reports {
        if let Some(sort) = &report.sort {
            if let Some((hi, lo)) = sort.range {
                println!(
                    "    {}: {} entries, importance {} → {}",
                    report.path.display(),
                    sort.entries,
                    hi,
                    lo
                );
            }
        }
        if let Some(backup) = &report.backup {
            println!("    backup: {}", backup.display());
        }
    }
    println!();
    Ok(())
}

fn handle_clean(config_path: &Path, root: &Path, dry_run: bool, quiet: bool) -> Result<()> {
    let config = Config::load_file(config_path)?;
    let cleaner = config.cleaner();

    if !quiet {
        print_header(&format!("Clean: {}", root.display().to_string().cyan()), dry_run);
    }
    let on_file = |status: &str, path: &str| {
        if status != "OK" {
            print_status(status, path);
        }
    };
    let report = workflow::run_clean(
        root,
        &cleaner,
        dry_run,
        (!quiet).then_some(&on_file as &dyn Fn(&str, &str)),
    )?;

    if !quiet {
        println!();
        println!(
            "{} {} modified, {} skipped, {} scanned",
            "Done:".green(),
            report.modified(),
            report.skipped(),
            report.files.len()
        );
    }
    Ok(())
}

fn handle_number(config_path: &Path, targets: &[PathBuf], dry_run: bool, quiet: bool) -> Result<()> {
    let config = Config::load_file(config_path)?;

    if !quiet {
        print_header("Number titles", dry_run);
    }
    let on_file = |status: &str, path: &str| print_status(status, path);
    let report = workflow::run_number(
        targets,
        &config.numbering,
        dry_run,
        (!quiet).then_some(&on_file as &dyn Fn(&str, &str)),
    )?;

    if !quiet {
        println!();
        println!(
            "{} {} modified, {} skipped",
            "Done:".green(),
            report.modified(),
            report.skipped()
        );
    }
    Ok(())
}

fn handle_config(action: ConfigAction, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_file(config_path)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(NewsBriefError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_file(config_path)?;
            config.set(&key, &value)?;
            config.save_file(config_path)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load_file(config_path)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
        ConfigAction::Init => {
            if Config::init_file(config_path)? {
                println!("{} {}", "Initialized:".green(), config_path.display());
            } else {
                println!("{} {}", "Exists:".yellow(), config_path.display());
            }
        }
    }

    Ok(())
}
