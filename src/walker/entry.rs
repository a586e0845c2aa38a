//! Directory entry classification

use std::fs::FileType;
use std::os::unix::fs::FileTypeExt;

/// Type of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
    /// Block device
    BlockDevice,
    /// Character device
    CharDevice,
    /// Named pipe (FIFO)
    Fifo,
    /// Unix socket
    Socket,
    /// Unknown type
    Unknown,
}

impl EntryType {
    /// Classify a directory entry's file type (symlinks are not followed)
    pub fn from_file_type(ft: FileType) -> Self {
        if ft.is_symlink() {
            EntryType::Symlink
        } else if ft.is_dir() {
            EntryType::Directory
        } else if ft.is_file() {
            EntryType::File
        } else if ft.is_block_device() {
            EntryType::BlockDevice
        } else if ft.is_char_device() {
            EntryType::CharDevice
        } else if ft.is_fifo() {
            EntryType::Fifo
        } else if ft.is_socket() {
            EntryType::Socket
        } else {
            EntryType::Unknown
        }
    }

    /// Entries that end up in a path list
    pub fn is_listed(&self) -> bool {
        matches!(self, EntryType::File | EntryType::Symlink)
    }

    /// Device nodes, pipes and sockets
    pub fn is_special(&self) -> bool {
        matches!(
            self,
            EntryType::BlockDevice | EntryType::CharDevice | EntryType::Fifo | EntryType::Socket
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_local_types() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        let link = dir.path().join("l");
        std::fs::write(&file, b"data").unwrap();
        std::os::unix::fs::symlink(&file, &link).unwrap();

        let ft = std::fs::symlink_metadata(&file).unwrap().file_type();
        assert_eq!(EntryType::from_file_type(ft), EntryType::File);

        let ft = std::fs::symlink_metadata(&link).unwrap().file_type();
        assert_eq!(EntryType::from_file_type(ft), EntryType::Symlink);

        let ft = std::fs::symlink_metadata(dir.path()).unwrap().file_type();
        assert_eq!(EntryType::from_file_type(ft), EntryType::Directory);
    }

    #[test]
    fn test_listed_and_special() {
        assert!(EntryType::File.is_listed());
        assert!(EntryType::Symlink.is_listed());
        assert!(!EntryType::Directory.is_listed());
        assert!(!EntryType::Fifo.is_listed());

        assert!(EntryType::Socket.is_special());
        assert!(EntryType::BlockDevice.is_special());
        assert!(!EntryType::Unknown.is_special());
        assert!(!EntryType::File.is_special());
    }
}
