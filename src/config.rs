//! Configuration types for hlink
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - Tree root validation

use crate::error::ConfigError;
use crate::walker::ExclusionFilter;
use clap::{Parser, ValueEnum};
use std::ffi::OsStr;
use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Hard link identical files between two mirrored directory trees
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hlink",
    version,
    about = "Compares files in from_dir with files in to_dir",
    long_about = "Compares files in FROM_DIR with files at the same relative path in TO_DIR.\n\n\
                  Takes no action if both names already refer to the same inode, \
                  but if they differ it unlinks the TO_DIR copy and hard links it to \
                  the FROM_DIR copy.\n\n\
                  The trees are expected to have been mirrored beforehand (e.g. with rsync).",
    after_help = "EXAMPLES:\n    \
        hlink /backup/monday /backup/tuesday\n    \
        hlink -n /srv/mirror/a /srv/mirror/b            # report only\n    \
        hlink --exclude .cache --sync global old/ new/\n    \
        hlink --lockstep old new                         # positional pairing"
)]
pub struct CliArgs {
    /// Source tree (files here are kept and linked to)
    #[arg(value_name = "FROM_DIR")]
    pub from_dir: PathBuf,

    /// Destination tree (duplicate files here are replaced by hard links)
    #[arg(value_name = "TO_DIR")]
    pub to_dir: PathBuf,

    /// Report what would be linked without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Pair files by position in the sorted lists instead of by relative path
    #[arg(long)]
    pub lockstep: bool,

    /// Durability flush performed between unlink and link
    #[arg(long, value_enum, default_value_t = SyncPolicy::Filesystem, value_name = "POLICY")]
    pub sync: SyncPolicy,

    /// Log and skip subdirectories that cannot be opened instead of aborting
    #[arg(long)]
    pub skip_unreadable_dirs: bool,

    /// Exclude paths containing this substring (can be repeated)
    #[arg(long = "exclude", value_name = "SUBSTRING", action = clap::ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Exclude paths matching this regular expression (can be repeated)
    #[arg(long = "exclude-regex", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_regex: Vec<String>,

    /// Quiet mode - no spinner and no summary
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// How to make an unlink durable before the replacement link is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SyncPolicy {
    /// No flush; rely on the filesystem's own ordering
    None,
    /// Flush only the filesystem holding the destination (syncfs)
    Filesystem,
    /// Flush every mounted filesystem (sync)
    Global,
}

impl fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPolicy::None => "none",
            SyncPolicy::Filesystem => "filesystem",
            SyncPolicy::Global => "global",
        };
        f.write_str(name)
    }
}

/// What the collector does when a subdirectory cannot be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirErrorPolicy {
    /// Fail the whole walk
    #[default]
    Abort,
    /// Log a warning and continue with the next entry
    Skip,
}

/// How source and destination entries are paired up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingMode {
    /// Match entries by their path relative to the tree root
    #[default]
    Keyed,
    /// Match entries by index in the two sorted lists
    Lockstep,
}

/// A validated directory to walk
///
/// Trailing separators are stripped so that `root + "/" + name` never
/// produces a double slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRoot {
    path: PathBuf,
}

impl TreeRoot {
    /// Check that `path` exists and is a directory
    pub fn validate(path: &Path) -> Result<Self, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|source| ConfigError::RootUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        if !metadata.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: strip_trailing_separator(path),
        })
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for TreeRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

fn strip_trailing_separator(path: &Path) -> PathBuf {
    let bytes = path.as_os_str().as_bytes();
    let mut end = bytes.len();
    while end > 1 && bytes[end - 1] == b'/' {
        end -= 1;
    }
    PathBuf::from(OsStr::from_bytes(&bytes[..end]))
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct HlinkConfig {
    /// Tree whose files are kept
    pub source: TreeRoot,

    /// Tree whose duplicates are replaced by links
    pub destination: TreeRoot,

    /// Report only, touch nothing
    pub dry_run: bool,

    /// Pairing strategy
    pub pairing: PairingMode,

    /// Flush between unlink and link
    pub sync_policy: SyncPolicy,

    /// Subdirectory open failures
    pub dir_error_policy: DirErrorPolicy,

    /// Paths dropped during collection
    pub exclude: ExclusionFilter,

    /// Show spinner and summary
    pub show_progress: bool,
}

impl HlinkConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let source = TreeRoot::validate(&args.from_dir)?;
        let destination = TreeRoot::validate(&args.to_dir)?;

        let exclude = ExclusionFilter::new(args.exclude, &args.exclude_regex)?;

        Ok(Self {
            source,
            destination,
            dry_run: args.dry_run,
            pairing: if args.lockstep {
                PairingMode::Lockstep
            } else {
                PairingMode::Keyed
            },
            sync_policy: args.sync,
            dir_error_policy: if args.skip_unreadable_dirs {
                DirErrorPolicy::Skip
            } else {
                DirErrorPolicy::Abort
            },
            exclude,
            show_progress: !args.quiet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_strip_trailing_separator() {
        assert_eq!(strip_trailing_separator(Path::new("/data/")), PathBuf::from("/data"));
        assert_eq!(strip_trailing_separator(Path::new("/data//")), PathBuf::from("/data"));
        assert_eq!(strip_trailing_separator(Path::new("data")), PathBuf::from("data"));
        assert_eq!(strip_trailing_separator(Path::new("/")), PathBuf::from("/"));
    }

    #[test]
    fn test_validate_root() {
        let dir = tempdir().unwrap();
        let with_slash = format!("{}/", dir.path().display());

        let root = TreeRoot::validate(Path::new(&with_slash)).unwrap();
        assert_eq!(root.as_path(), dir.path());
    }

    #[test]
    fn test_validate_missing_root() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = TreeRoot::validate(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::RootUnreadable { .. }));
    }

    #[test]
    fn test_validate_file_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();

        let err = TreeRoot::validate(&file).unwrap_err();
        assert!(matches!(err, ConfigError::NotADirectory { .. }));
    }

    #[test]
    fn test_from_args_defaults() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        let args = CliArgs::parse_from([
            "hlink",
            a.path().to_str().unwrap(),
            b.path().to_str().unwrap(),
        ]);

        let config = HlinkConfig::from_args(args).unwrap();
        assert_eq!(config.pairing, PairingMode::Keyed);
        assert_eq!(config.sync_policy, SyncPolicy::Filesystem);
        assert_eq!(config.dir_error_policy, DirErrorPolicy::Abort);
        assert!(config.exclude.is_empty());
        assert!(!config.dry_run);
        assert!(config.show_progress);
    }

    #[test]
    fn test_from_args_options() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        let args = CliArgs::parse_from([
            "hlink",
            "-n",
            "-q",
            "--lockstep",
            "--sync",
            "global",
            "--skip-unreadable-dirs",
            "--exclude",
            ".git",
            "--exclude-regex",
            r"\.tmp$",
            a.path().to_str().unwrap(),
            b.path().to_str().unwrap(),
        ]);

        let config = HlinkConfig::from_args(args).unwrap();
        assert!(config.dry_run);
        assert!(!config.show_progress);
        assert_eq!(config.pairing, PairingMode::Lockstep);
        assert_eq!(config.sync_policy, SyncPolicy::Global);
        assert_eq!(config.dir_error_policy, DirErrorPolicy::Skip);
        assert!(config.exclude.is_excluded("/a/.git/HEAD"));
        assert!(config.exclude.is_excluded("/a/b.tmp"));
        assert!(!config.exclude.is_excluded("/a/b.txt"));
    }

    #[test]
    fn test_missing_positional_is_usage_error() {
        assert!(CliArgs::try_parse_from(["hlink", "/tmp"]).is_err());
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let a = tempdir().unwrap();
        let args = CliArgs::parse_from([
            "hlink",
            "--exclude-regex",
            "(",
            a.path().to_str().unwrap(),
            a.path().to_str().unwrap(),
        ]);

        let err = HlinkConfig::from_args(args).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidExcludePattern { .. }));
    }
}
