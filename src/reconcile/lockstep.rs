//! Positional pairing
//!
//! Pairs `source[i]` with `destination[i]`. This only works when both trees
//! hold exactly the same relative paths; any extra or missing file shifts
//! every later pair. Basename mismatches are reported but the pair is still
//! acted on.

use super::{ReconcileStats, Reconciler};
use crate::error::{ReconcileError, ReconcileResult};
use crate::pathlist::{file_name_of, PathList};
use std::io::Write;
use tracing::{debug, warn};

impl Reconciler {
    /// Walk both sorted lists by index
    ///
    /// Fails with [`ReconcileError::DestinationShorter`] as soon as a source
    /// entry has no destination counterpart. Extra destination entries are
    /// ignored.
    pub fn reconcile_lockstep<W: Write>(
        &self,
        source: &PathList,
        destination: &PathList,
        report: &mut W,
    ) -> ReconcileResult<ReconcileStats> {
        let mut stats = ReconcileStats::default();

        for (index, source_path) in source.iter().enumerate() {
            if self.interrupted() {
                return Ok(stats);
            }

            let Some(destination_path) = destination.get(index) else {
                return Err(ReconcileError::DestinationShorter {
                    source_path: source_path.display().to_string(),
                });
            };

            let source_name = file_name_of(source_path);
            let destination_name = file_name_of(destination_path);
            if source_name != destination_name {
                warn!(
                    source = %source_name.to_string_lossy(),
                    destination = %destination_name.to_string_lossy(),
                    "Filename mismatch; the trees need to be synchronised again"
                );
                stats.mismatches += 1;
            }

            let outcome = self.reconcile_pair(source_path, destination_path, report)?;
            stats.record(outcome.action);
        }

        if destination.len() > source.len() {
            debug!(
                extra = destination.len() - source.len(),
                "Destination list is longer than source list; trailing entries ignored"
            );
        }

        stats.completed = true;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::super::ReconcileOptions;
    use super::*;
    use crate::config::SyncPolicy;
    use std::fs;
    use std::os::unix::fs::MetadataExt;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn reconciler() -> Reconciler {
        Reconciler::new(ReconcileOptions {
            dry_run: false,
            sync_policy: SyncPolicy::None,
        })
    }

    #[test]
    fn test_destination_shorter_aborts() {
        let dir = tempdir().unwrap();
        let x = dir.path().join("x");
        let y = dir.path().join("y");
        fs::create_dir_all(&x).unwrap();
        fs::create_dir_all(&y).unwrap();
        fs::write(x.join("1.txt"), b"1").unwrap();
        fs::write(x.join("2.txt"), b"2").unwrap();
        fs::write(y.join("1.txt"), b"1").unwrap();

        let source = PathList::new(vec![x.join("1.txt"), x.join("2.txt")]);
        let destination = PathList::new(vec![y.join("1.txt")]);

        let mut report = Vec::new();
        let err = reconciler()
            .reconcile_lockstep(&source, &destination, &mut report)
            .unwrap_err();

        match err {
            ReconcileError::DestinationShorter { source_path } => {
                assert!(source_path.ends_with("2.txt"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let report = String::from_utf8(report).unwrap();
        assert_eq!(report.lines().count(), 1);
        assert!(report.starts_with("1.txt "));
        assert!(!report.contains("2.txt"));
    }

    #[test]
    fn test_basename_mismatch_still_acts() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("1.txt");
        let dst = dir.path().join("2.txt");
        fs::write(&src, b"a").unwrap();
        fs::write(&dst, b"a").unwrap();

        let source = PathList::new(vec![src.clone()]);
        let destination = PathList::new(vec![dst.clone()]);

        let mut report = Vec::new();
        let stats = reconciler()
            .reconcile_lockstep(&source, &destination, &mut report)
            .unwrap();

        assert_eq!(stats.mismatches, 1);
        assert_eq!(stats.linked, 1);
        assert_eq!(
            fs::metadata(&src).unwrap().ino(),
            fs::metadata(&dst).unwrap().ino()
        );
    }

    #[test]
    fn test_longer_destination_is_ignored() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("s");
        let dst = dir.path().join("d");
        fs::write(&src, b"a").unwrap();
        fs::hard_link(&src, &dst).unwrap();

        let source = PathList::new(vec![src]);
        let destination = PathList::new(vec![dst, PathBuf::from("/nonexistent/extra")]);

        let mut report = Vec::new();
        let stats = reconciler()
            .reconcile_lockstep(&source, &destination, &mut report)
            .unwrap();

        assert!(stats.completed);
        assert_eq!(stats.pairs, 1);
        assert_eq!(stats.already_linked, 1);
    }

    #[test]
    fn test_interrupted_before_first_pair() {
        let source = PathList::new(vec![PathBuf::from("/a")]);
        let destination = PathList::new(vec![PathBuf::from("/b")]);

        let r = reconciler();
        r.shutdown_flag().store(true, std::sync::atomic::Ordering::SeqCst);

        let mut report = Vec::new();
        let stats = r.reconcile_lockstep(&source, &destination, &mut report).unwrap();

        assert!(!stats.completed);
        assert_eq!(stats.pairs, 0);
        assert!(report.is_empty());
    }

    #[test]
    fn test_unknown_pair_counted_as_error() {
        let source = PathList::new(vec![PathBuf::from("/nonexistent/a")]);
        let destination = PathList::new(vec![PathBuf::from("/nonexistent/a2")]);

        let mut report = Vec::new();
        let stats = reconciler()
            .reconcile_lockstep(&source, &destination, &mut report)
            .unwrap();

        assert_eq!(stats.errors, 1);
        assert_eq!(stats.linked, 0);
    }
}
