use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "newsbrief")]
#[command(about = "Reorder, merge and tidy Chinese news brief files")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $NEWSBRIEF_BASE/newsbrief.toml or ~/.newsbrief/newsbrief.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reorder the entries of a brief by category priority
    Reorder {
        /// Source text file
        input: PathBuf,

        /// Output path (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Dry run (don't write anything)
        #[arg(short, long)]
        dry_run: bool,

        /// Rewrite 一、二、三… markers after reordering
        #[arg(long)]
        renumber: bool,
    },

    /// Merge dated summary fragments into one file per date
    Merge {
        /// Directory to scan for fragments
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Directory for merged files (default: --root)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Suffix before .txt for merged files (default from config: _merged)
        #[arg(long)]
        suffix: Option<String>,

        /// Keep fragment files after merging
        #[arg(long)]
        keep_sources: bool,

        /// Dry run (don't write or delete anything)
        #[arg(short, long)]
        dry_run: bool,

        /// Renumber entries within each category
        #[arg(long)]
        renumber: bool,

        /// Print merge statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sort summary entries by importance score
    Sort {
        /// File to sort (default: every <prefix>*.txt in --root)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Back up the file to <file>.bak before writing
        #[arg(long)]
        backup: bool,

        /// Restore --file from its backup
        #[arg(long, requires = "file")]
        restore: bool,

        /// Directory to scan when --file is not given
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Dry run (don't write anything)
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Apply source-name and bracket cleanup to every .txt under a directory
    Clean {
        /// Directory (searched recursively) or single file
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Dry run (report files that would change)
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Number title lines with Chinese numerals
    Number {
        /// Files or directories (*.txt, not recursive)
        #[arg(required = true)]
        targets: Vec<PathBuf>,

        /// Dry run (report files that would change)
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., merge.suffix)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., reorder.frozen_sections)
        key: String,

        /// Value to set (e.g., "舆情参考,附录" or "[舆情参考, 附录]")
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_merge_flags() {
        let cli = Cli::parse_from([
            "newsbrief",
            "merge",
            "--root",
            "data",
            "--keep-sources",
            "--json",
        ]);
        match cli.command {
            Some(Commands::Merge {
                root,
                keep_sources,
                json,
                dry_run,
                ..
            }) => {
                assert_eq!(root, PathBuf::from("data"));
                assert!(keep_sources);
                assert!(json);
                assert!(!dry_run);
            }
            _ => panic!("expected merge command"),
        }
    }

    #[test]
    fn test_restore_requires_file() {
        assert!(Cli::try_parse_from(["newsbrief", "sort", "--restore"]).is_err());
        assert!(Cli::try_parse_from(["newsbrief", "sort", "--restore", "--file", "a.txt"]).is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["newsbrief", "clean", "-v", "--config", "x.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
