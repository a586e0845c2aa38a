//! Run orchestration
//!
//! ```text
//!   from_dir ──► PathCollector ──► <workdir>/from.list ──► PathList (sorted) ─┐
//!                                                                          ├──► Reconciler
//!   to_dir   ──► PathCollector ──► <workdir>/to.list   ──► PathList (sorted) ─┘
//! ```
//!
//! The work directory is created under the system temp directory with a
//! random name and is removed when the run ends, on success or error.

use crate::config::{HlinkConfig, PairingMode, TreeRoot};
use crate::error::Result;
use crate::pathlist::PathList;
use crate::progress::ProgressReporter;
use crate::reconcile::{ReconcileOptions, ReconcileStats, Reconciler};
use crate::walker::PathCollector;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Runs one collect-and-link pass over two trees
pub struct Driver {
    config: HlinkConfig,
    shutdown: Arc<AtomicBool>,
}

impl Driver {
    pub fn new(config: HlinkConfig) -> Self {
        Self {
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Collect both trees and reconcile them, writing pair lines to `report`
    pub fn run<W: Write>(&self, report: &mut W) -> Result<ReconcileStats> {
        let start = Instant::now();

        let workdir = tempfile::Builder::new().prefix("hlink-").tempdir()?;
        debug!(workdir = %workdir.path().display(), "Created work directory");

        let progress = self.config.show_progress.then(ProgressReporter::new);

        let source = self.collect_tree("from", &self.config.source, &workdir, progress.as_ref())?;
        let destination =
            self.collect_tree("to", &self.config.destination, &workdir, progress.as_ref())?;

        if let Some(ref p) = progress {
            p.finish_and_clear();
        }

        info!(
            source = source.len(),
            destination = destination.len(),
            "Path lists ready"
        );
        if source.is_empty() {
            warn!(root = %self.config.source, "Source tree has no files to link");
        }

        let reconciler = Reconciler::new(ReconcileOptions {
            dry_run: self.config.dry_run,
            sync_policy: self.config.sync_policy,
        })
        .with_shutdown(Arc::clone(&self.shutdown));

        let mut stats = match self.config.pairing {
            PairingMode::Keyed => reconciler.reconcile_keyed(
                self.config.source.as_path(),
                &source,
                self.config.destination.as_path(),
                &destination,
                report,
            )?,
            PairingMode::Lockstep => reconciler.reconcile_lockstep(&source, &destination, report)?,
        };
        report.flush()?;

        stats.duration = start.elapsed();
        Ok(stats)
    }

    /// Walk one tree into a spool file, then read it back sorted
    fn collect_tree(
        &self,
        label: &str,
        root: &TreeRoot,
        workdir: &TempDir,
        progress: Option<&ProgressReporter>,
    ) -> Result<PathList> {
        let spool = workdir.path().join(format!("{label}.list"));

        if let Some(p) = progress {
            p.set_status(&format!("Collecting {}...", root));
        }

        let collector = PathCollector::new(&self.config.exclude, self.config.dir_error_policy)
            .with_shutdown(Arc::clone(&self.shutdown))
            .with_progress(|stats| {
                if let Some(p) = progress {
                    p.update(label, stats);
                }
            });

        let mut writer = BufWriter::new(File::create(&spool)?);
        let stats = collector.collect(root.as_path(), &mut writer)?;
        drop(writer);

        info!(
            tree = label,
            root = %root,
            dirs = stats.dirs,
            files = stats.emitted,
            excluded = stats.excluded,
            skipped_special = stats.special,
            errors = stats.errors,
            "Collected paths"
        );

        read_spool(&spool)
    }
}

fn read_spool(path: &Path) -> Result<PathList> {
    let list = PathList::read_from(BufReader::new(File::open(path)?))?;
    Ok(list)
}
