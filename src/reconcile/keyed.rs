//! Pairing by relative path
//!
//! Each list is keyed by its path relative to the tree root. The union of
//! keys is visited in byte order, so a file present on only one side is
//! reported on its own and does not shift any other pair.

use super::{ReconcileStats, Reconciler};
use crate::error::ReconcileResult;
use crate::pathlist::PathList;
use std::collections::BTreeMap;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tracing::warn;

#[derive(Default)]
struct Slot<'a> {
    source: Option<&'a Path>,
    destination: Option<&'a Path>,
}

fn relative_key<'a>(root: &Path, path: &'a Path) -> &'a [u8] {
    match path.strip_prefix(root) {
        Ok(rel) => rel.as_os_str().as_bytes(),
        Err(_) => path.as_os_str().as_bytes(),
    }
}

impl Reconciler {
    /// Pair entries that share a relative path under their roots
    ///
    /// Entries missing on either side are logged and counted; they never
    /// stop the run.
    pub fn reconcile_keyed<W: Write>(
        &self,
        source_root: &Path,
        source: &PathList,
        destination_root: &Path,
        destination: &PathList,
        report: &mut W,
    ) -> ReconcileResult<ReconcileStats> {
        let mut slots: BTreeMap<&[u8], Slot<'_>> = BTreeMap::new();

        for path in source.iter() {
            slots.entry(relative_key(source_root, path)).or_default().source = Some(path);
        }
        for path in destination.iter() {
            slots.entry(relative_key(destination_root, path)).or_default().destination = Some(path);
        }

        let mut stats = ReconcileStats::default();

        for slot in slots.values() {
            if self.interrupted() {
                return Ok(stats);
            }

            match (slot.source, slot.destination) {
                (Some(src), Some(dst)) => {
                    let outcome = self.reconcile_pair(src, dst, report)?;
                    stats.record(outcome.action);
                }
                (Some(src), None) => {
                    warn!(path = %src.display(), "Missing in destination tree");
                    stats.missing_in_destination += 1;
                }
                (None, Some(dst)) => {
                    warn!(path = %dst.display(), "Missing in source tree");
                    stats.missing_in_source += 1;
                }
                (None, None) => {}
            }
        }

        stats.completed = true;
        Ok(stats)
    }
}
