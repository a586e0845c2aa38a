//! Recursive path collector
//!
//! Walks a directory tree depth-first and writes the path of every regular
//! file and symlink to a sink, one path per line. Directories are recursed
//! into; device nodes, pipes and sockets are skipped.
//!
//! Output order is whatever `readdir` returns and is NOT sorted. Callers
//! that need a stable order sort the materialized list afterwards.
//!
//! ```text
//! root/
//! ├── a.txt          -> "root/a.txt"
//! ├── fifo           (skipped)
//! └── sub/
//!     └── b.txt      -> "root/sub/b.txt"
//! ```

use super::entry::EntryType;
use super::filter::ExclusionFilter;
use crate::config::DirErrorPolicy;
use crate::error::{WalkError, WalkResult};
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Counters for a single walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub dirs: u64,
    pub emitted: u64,
    pub excluded: u64,
    pub special: u64,
    pub unknown: u64,
    pub errors: u64,
}

/// Depth-first collector of regular files and symlinks
pub struct PathCollector<'a> {
    filter: &'a ExclusionFilter,
    dir_error_policy: DirErrorPolicy,
    shutdown: Option<Arc<AtomicBool>>,
    on_dir: Option<Box<dyn FnMut(&CollectStats) + 'a>>,
    stats: CollectStats,
}

impl<'a> PathCollector<'a> {
    pub fn new(filter: &'a ExclusionFilter, dir_error_policy: DirErrorPolicy) -> Self {
        Self {
            filter,
            dir_error_policy,
            shutdown: None,
            on_dir: None,
            stats: CollectStats::default(),
        }
    }

    /// Stop the walk with [`WalkError::Interrupted`] once this flag is set
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Called after each directory is read
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&CollectStats) + 'a,
    {
        self.on_dir = Some(Box::new(callback));
        self
    }

    /// Walk `root` and write every collected path to `sink`
    ///
    /// Failing to open `root` itself is always an error. Failures on
    /// subdirectories follow the configured [`DirErrorPolicy`].
    pub fn collect<W: Write>(mut self, root: &Path, sink: &mut W) -> WalkResult<CollectStats> {
        self.walk_dir(root, true, sink)?;
        sink.flush().map_err(WalkError::SinkFailed)?;

        debug!(
            root = %root.display(),
            dirs = self.stats.dirs,
            emitted = self.stats.emitted,
            excluded = self.stats.excluded,
            "Walk finished"
        );

        Ok(self.stats)
    }

    fn walk_dir<W: Write>(&mut self, dir: &Path, is_root: bool, sink: &mut W) -> WalkResult<()> {
        if let Some(ref flag) = self.shutdown {
            if flag.load(Ordering::Relaxed) {
                return Err(WalkError::Interrupted);
            }
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                return self.dir_failed(dir, is_root, source);
            }
        };

        self.stats.dirs += 1;
        let mut subdirs: Vec<PathBuf> = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    // readdir itself failed part way through this directory
                    self.dir_failed(dir, is_root, source)?;
                    break;
                }
            };

            let path = entry.path();

            let file_type = match entry.file_type() {
                Ok(ft) => EntryType::from_file_type(ft),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot determine entry type, skipping");
                    self.stats.errors += 1;
                    continue;
                }
            };

            if file_type == EntryType::Directory {
                subdirs.push(path);
            } else if file_type.is_listed() {
                self.emit(&path, sink)?;
            } else if file_type.is_special() {
                self.stats.special += 1;
            } else {
                warn!(path = %path.display(), "Unknown entry type, skipping");
                self.stats.unknown += 1;
            }
        }

        // The ReadDir handle is dropped before descending so open
        // descriptors stay bounded by one per level.
        if let Some(ref mut callback) = self.on_dir {
            callback(&self.stats);
        }

        for subdir in subdirs {
            self.walk_dir(&subdir, false, sink)?;
        }

        Ok(())
    }

    fn emit<W: Write>(&mut self, path: &Path, sink: &mut W) -> WalkResult<()> {
        // Dangling symlinks and entries that vanished since readdir
        if let Err(e) = std::fs::metadata(path) {
            warn!(path = %path.display(), error = %e, "Cannot stat entry, skipping");
            self.stats.errors += 1;
            return Ok(());
        }

        let bytes = path.as_os_str().as_bytes();
        if bytes.contains(&b'\n') {
            warn!(path = %path.display(), "Path contains a newline and cannot be listed, skipping");
            self.stats.errors += 1;
            return Ok(());
        }

        if self.filter.is_excluded(path) {
            self.stats.excluded += 1;
            return Ok(());
        }

        sink.write_all(bytes)
            .and_then(|()| sink.write_all(b"\n"))
            .map_err(WalkError::SinkFailed)?;
        self.stats.emitted += 1;

        Ok(())
    }

    fn dir_failed(&mut self, dir: &Path, is_root: bool, source: std::io::Error) -> WalkResult<()> {
        if is_root || self.dir_error_policy == DirErrorPolicy::Abort {
            return Err(WalkError::ReadDirFailed {
                path: dir.to_path_buf(),
                source,
            });
        }

        warn!(path = %dir.display(), error = %source, "Cannot read directory, skipping");
        self.stats.errors += 1;
        Ok(())
    }
}

/// Collect every listed path under `root` into memory
pub fn collect_paths(
    root: &Path,
    filter: &ExclusionFilter,
    dir_error_policy: DirErrorPolicy,
) -> WalkResult<Vec<PathBuf>> {
    let mut buf: Vec<u8> = Vec::new();
    PathCollector::new(filter, dir_error_policy).collect(root, &mut buf)?;
    Ok(crate::pathlist::materialize(&buf))
}
