//! Error types for hlink
//!
//! This module defines the error hierarchy that covers:
//! - Configuration and root validation errors
//! - Directory walk errors
//! - Reconciliation errors that stop the run
//!
//! Recoverable per-file failures (stat, unlink, link) are not errors here.
//! They are logged where they happen and recorded in the reconcile outcome.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the hlink application
#[derive(Error, Debug)]
pub enum HlinkError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Directory walk errors
    #[error("Walk error: {0}")]
    Walk(#[from] WalkError),

    /// Reconciliation errors
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// I/O errors (spool files, work directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Root directory could not be stat'ed
    #[error("{path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Root exists but is not a directory
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },
}

/// Directory walk errors
#[derive(Error, Debug)]
pub enum WalkError {
    /// Failed to open or read a directory
    #[error("Failed to read directory '{path}': {source}")]
    ReadDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a collected path to the output sink
    #[error("Failed to write path list: {0}")]
    SinkFailed(#[source] std::io::Error),

    /// Interrupted by signal
    #[error("Walk interrupted by signal")]
    Interrupted,
}

/// Errors that stop a reconciliation run
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Positional pairing ran out of destination entries
    #[error(
        "Destination list is shorter than source list at '{source_path}'; \
         the trees are out of sync and need to be synchronised again"
    )]
    DestinationShorter { source_path: String },

    /// Failed to write the per-pair report line
    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

/// Result type alias for HlinkError
pub type Result<T> = std::result::Result<T, HlinkError>;

/// Result type alias for WalkError
pub type WalkResult<T> = std::result::Result<T, WalkError>;

/// Result type alias for ReconcileError
pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;
