//! Filesystem primitives used when replacing a destination file

use crate::config::SyncPolicy;
use std::fs::{File, Metadata};
use std::io;
use std::path::Path;
use tracing::error;

/// `lstat` a listed path, logging on failure
///
/// Symlinks are not followed: `link(2)` operates on the symlink itself, so
/// its own inode is the one that has to match.
pub fn lookup(path: &Path) -> Option<Metadata> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) => Some(meta),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Cannot stat");
            None
        }
    }
}

/// Make the unlink of `destination` durable before it is re-linked
pub fn flush(policy: SyncPolicy, destination: &Path) -> io::Result<()> {
    match policy {
        SyncPolicy::None => Ok(()),
        SyncPolicy::Global => {
            // sync(2) cannot fail
            unsafe { libc::sync() };
            Ok(())
        }
        SyncPolicy::Filesystem => {
            let dir = destination.parent().unwrap_or(Path::new("."));
            let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
            sync_filesystem(&File::open(dir)?)
        }
    }
}

#[cfg(target_os = "linux")]
fn sync_filesystem(handle: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let ret = unsafe { libc::syncfs(handle.as_raw_fd()) };
    if ret == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn sync_filesystem(_handle: &File) -> io::Result<()> {
    // No per-filesystem flush outside Linux
    unsafe { libc::sync() };
    Ok(())
}
