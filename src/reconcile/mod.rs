//! Pairing and linking
//!
//! Source and destination entries are paired up, either by relative path
//! ([`Reconciler::reconcile_keyed`]) or by position in the two sorted lists
//! ([`Reconciler::reconcile_lockstep`]). Every pair then goes through the
//! same action:
//!
//! ```text
//!   lstat source, lstat destination
//!   print "<name> <src_ino> <dst_ino>"
//!   ├── either lookup failed   → skip
//!   ├── same inode             → already linked
//!   ├── different filesystems  → skip
//!   └── different inode        → unlink dst, flush, link src → dst
//! ```
//!
//! A failed link after a successful unlink leaves the destination missing
//! that file. It is logged and counted, and the run carries on.

mod keyed;
pub mod link;
mod lockstep;

use crate::config::SyncPolicy;
use crate::error::ReconcileResult;
use crate::pathlist::file_name_of;
use std::io::Write;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// What happened to one source/destination pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairAction {
    /// Both names already refer to the same inode
    AlreadyLinked,
    /// Destination was replaced by a hard link to the source
    Linked {
        /// Bytes freed by dropping the destination's last link
        reclaimed: u64,
    },
    /// Dry run: destination would have been replaced
    WouldLink,
    /// One of the inodes could not be read
    InodeUnknown,
    /// Source and destination live on different filesystems
    CrossDevice,
    /// Destination could not be unlinked; left as it was
    UnlinkFailed,
    /// Destination was unlinked but the link failed; destination is missing
    LinkFailed,
}

impl PairAction {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            PairAction::InodeUnknown
                | PairAction::CrossDevice
                | PairAction::UnlinkFailed
                | PairAction::LinkFailed
        )
    }
}

/// Record of one reconciled pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub source_inode: Option<u64>,
    pub destination_inode: Option<u64>,
    pub action: PairAction,
}

/// Result of a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileStats {
    pub pairs: u64,
    pub linked: u64,
    pub would_link: u64,
    pub already_linked: u64,
    pub mismatches: u64,
    pub missing_in_destination: u64,
    pub missing_in_source: u64,
    pub errors: u64,
    pub reclaimed_bytes: u64,
    pub duration: Duration,
    pub completed: bool,
}

impl ReconcileStats {
    fn record(&mut self, action: PairAction) {
        self.pairs += 1;
        match action {
            PairAction::AlreadyLinked => self.already_linked += 1,
            PairAction::Linked { reclaimed } => {
                self.linked += 1;
                self.reclaimed_bytes += reclaimed;
            }
            PairAction::WouldLink => self.would_link += 1,
            _ => {}
        }
        if action.is_error() {
            self.errors += 1;
        }
    }
}

/// Options that shape every pair action
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub dry_run: bool,
    pub sync_policy: SyncPolicy,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            sync_policy: SyncPolicy::Filesystem,
        }
    }
}

/// Replaces duplicate destination files with hard links to their source
pub struct Reconciler {
    options: ReconcileOptions,
    shutdown: Arc<AtomicBool>,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self {
            options,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop between pairs once this flag is set
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    fn interrupted(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Compare one pair and link it if needed, writing the report line
    pub fn reconcile_pair<W: Write>(
        &self,
        source: &Path,
        destination: &Path,
        report: &mut W,
    ) -> ReconcileResult<PairOutcome> {
        let source_meta = link::lookup(source);
        let destination_meta = link::lookup(destination);

        let source_inode = source_meta.as_ref().map(MetadataExt::ino);
        let destination_inode = destination_meta.as_ref().map(MetadataExt::ino);

        writeln!(
            report,
            "{} {} {}",
            file_name_of(source).to_string_lossy(),
            source_inode.unwrap_or(0),
            destination_inode.unwrap_or(0)
        )?;

        let action = match (&source_meta, &destination_meta) {
            (Some(src), Some(dst)) if src.dev() != dst.dev() => {
                error!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "Source and destination are on different filesystems, skipping"
                );
                PairAction::CrossDevice
            }
            (Some(src), Some(dst)) if src.ino() == dst.ino() => PairAction::AlreadyLinked,
            (Some(_), Some(dst)) => self.replace(source, destination, dst),
            _ => PairAction::InodeUnknown,
        };

        Ok(PairOutcome {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            source_inode,
            destination_inode,
            action,
        })
    }

    fn replace(&self, source: &Path, destination: &Path, dst: &std::fs::Metadata) -> PairAction {
        if self.options.dry_run {
            info!(
                source = %source.display(),
                destination = %destination.display(),
                "Would link"
            );
            return PairAction::WouldLink;
        }

        let reclaimed = if dst.nlink() == 1 { dst.len() } else { 0 };

        if let Err(e) = std::fs::remove_file(destination) {
            error!(path = %destination.display(), error = %e, "Cannot unlink, leaving as is");
            return PairAction::UnlinkFailed;
        }

        if let Err(e) = link::flush(self.options.sync_policy, destination) {
            error!(
                policy = %self.options.sync_policy,
                error = %e,
                "Flush before link failed, linking anyway"
            );
        }

        if let Err(e) = std::fs::hard_link(source, destination) {
            error!(
                source = %source.display(),
                destination = %destination.display(),
                error = %e,
                "Link failed after unlink; destination is now missing"
            );
            return PairAction::LinkFailed;
        }

        debug!(
            source = %source.display(),
            destination = %destination.display(),
            reclaimed,
            "Linked"
        );
        PairAction::Linked { reclaimed }
    }
}
