//! Local directory walker
//!
//! Enumerates the regular files and symlinks of a tree so the two trees can
//! be paired up for linking.
//!
//! # Architecture
//!
//! ```text
//!   TreeRoot ──► PathCollector ──► sink (one path per line)
//!                   │    ▲
//!                   │    └── ExclusionFilter (substring / regex)
//!                   ▼
//!               EntryType (dir → recurse, file/symlink → emit,
//!                          device/fifo/socket → skip, unknown → warn)
//! ```

pub mod collector;
pub mod entry;
pub mod filter;

pub use collector::{collect_paths, CollectStats, PathCollector};
pub use entry::EntryType;
pub use filter::ExclusionFilter;
