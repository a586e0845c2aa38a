//! Path lists
//!
//! A walk writes paths one per line. This module turns such a block back
//! into a list of paths and orders it lexically (byte-wise, like `sort` in
//! the C locale), which is the order both pairing modes rely on.

use std::ffi::OsStr;
use std::io::Read;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Split a newline-delimited block into paths
///
/// Empty lines are dropped and the input order is kept as is.
pub fn materialize(block: &[u8]) -> Vec<PathBuf> {
    block
        .split(|&b| b == b'\n')
        .filter(|line| !line.is_empty())
        .map(|line| PathBuf::from(OsStr::from_bytes(line)))
        .collect()
}

/// Lexically sorted list of paths from one tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathList {
    paths: Vec<PathBuf>,
}

impl PathList {
    /// Sort `paths` into a list
    pub fn new(mut paths: Vec<PathBuf>) -> Self {
        // Byte order, not Path's component order: "a.b" sorts before "a/b".
        paths.sort_unstable_by(|a, b| a.as_os_str().as_bytes().cmp(b.as_os_str().as_bytes()));
        Self { paths }
    }

    /// Materialize and sort a newline-delimited block
    pub fn from_block(block: &[u8]) -> Self {
        Self::new(materialize(block))
    }

    /// Read a whole spool file and build a sorted list from it
    pub fn read_from<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut block = Vec::new();
        reader.read_to_end(&mut block)?;
        Ok(Self::from_block(&block))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

impl From<Vec<PathBuf>> for PathList {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self::new(paths)
    }
}

/// Final path component, or the whole path if it has none
pub fn file_name_of(path: &Path) -> &OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Vec<String> {
        paths.into_iter().map(|p| p.display().to_string()).collect()
    }

    #[test]
    fn test_materialize_drops_empty_lines() {
        let paths = materialize(b"a\nb\n\nc\n");
        assert_eq!(strings(paths.iter().map(PathBuf::as_path)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_materialize_keeps_order() {
        let paths = materialize(b"/z\n/a\n/m");
        assert_eq!(strings(paths.iter().map(PathBuf::as_path)), vec!["/z", "/a", "/m"]);
    }

    #[test]
    fn test_materialize_empty() {
        assert!(materialize(b"").is_empty());
        assert!(materialize(b"\n\n\n").is_empty());
    }

    #[test]
    fn test_sort_is_bytewise() {
        let list = PathList::new(vec![
            PathBuf::from("/r/a/b"),
            PathBuf::from("/r/a.b"),
            PathBuf::from("/r/B"),
        ]);
        assert_eq!(strings(list.iter()), vec!["/r/B", "/r/a.b", "/r/a/b"]);
    }

    #[test]
    fn test_read_from_spool() {
        let list = PathList::read_from(&b"/t/2\n/t/1\n\n"[..]).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0), Some(Path::new("/t/1")));
        assert_eq!(list.get(1), Some(Path::new("/t/2")));
        assert_eq!(list.get(2), None);
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of(Path::new("/a/b/c.txt")), "c.txt");
        assert_eq!(file_name_of(Path::new("c.txt")), "c.txt");
        assert_eq!(file_name_of(Path::new("/")), "/");
    }
}
