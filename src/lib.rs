//! hlink - Hard Link Mirrored Directory Trees
//!
//! Reclaims space between two directory trees that hold the same files,
//! typically a backup and its predecessor produced by rsync. For every file
//! present at the same relative path in both trees, the inode numbers are
//! compared; when they differ the destination copy is unlinked and replaced
//! by a hard link to the source copy.
//!
//! Only inode identity is checked. Contents are never compared, so the trees
//! must already be mirrors of each other.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐     ┌────────────┐
//! │  FROM_DIR  │     │   TO_DIR   │
//! └─────┬──────┘     └─────┬──────┘
//!       │ walk             │ walk
//!       ▼                  ▼
//! ┌────────────┐     ┌────────────┐
//! │ from.list  │     │  to.list   │   scoped work directory
//! └─────┬──────┘     └─────┬──────┘
//!       │ sort             │ sort
//!       └────────┬─────────┘
//!                ▼
//!       ┌──────────────────┐
//!       │    Reconciler    │  keyed (relative path) or lockstep
//!       │ lstat → unlink → │
//!       │  flush → link    │
//!       └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Link yesterday's and today's snapshots together
//! hlink /backup/2024-05-01 /backup/2024-05-02
//!
//! # See what would change
//! hlink --dry-run /backup/a /backup/b
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod pathlist;
pub mod progress;
pub mod reconcile;
pub mod walker;

pub use config::{CliArgs, DirErrorPolicy, HlinkConfig, PairingMode, SyncPolicy, TreeRoot};
pub use driver::Driver;
pub use error::{HlinkError, Result};
pub use pathlist::{materialize, PathList};
pub use reconcile::{PairAction, PairOutcome, ReconcileOptions, ReconcileStats, Reconciler};
pub use walker::{collect_paths, ExclusionFilter, PathCollector};
