//! File entry representation

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::classify::{self, IconTag};

/// Kind of a listed entry
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum EntryKind {
    Directory,
    File,
}

/// Represents a single file or directory entry
#[derive(Clone, Debug)]
pub struct Entry {
    /// File/directory name (not full path)
    pub name: String,
    /// Full path to the entry
    pub path: PathBuf,
    pub kind: EntryKind,
    /// File size in bytes (0 for directories)
    pub size: u64,
    /// Last modification time
    pub modified: Option<SystemTime>,
    /// Creation time, where the platform records one
    pub created: Option<SystemTime>,
    /// Last access time
    pub accessed: Option<SystemTime>,
    /// Derived type label, e.g. "TXT文件"
    pub type_label: String,
    pub icon: IconTag,
}

impl Entry {
    /// Create an Entry from a path.
    ///
    /// Symlinks are followed: a link to a directory lists as a directory,
    /// and a dangling link fails to stat.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        let is_dir = metadata.is_dir();
        let kind = if is_dir { EntryKind::Directory } else { EntryKind::File };
        let size = if is_dir { 0 } else { metadata.len() };
        let (icon, type_label) = classify::classify(path, is_dir);

        Ok(Self {
            name,
            path: path.to_path_buf(),
            kind,
            size,
            modified: metadata.modified().ok(),
            created: metadata.created().ok(),
            accessed: metadata.accessed().ok(),
            type_label,
            icon,
        })
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Get the file extension, if any
    pub fn extension(&self) -> Option<String> {
        if self.is_dir() {
            return None;
        }
        classify::extension_of(&self.path)
    }

    /// Size column text (blank for directories)
    pub fn display_size(&self) -> String {
        if self.is_dir() {
            String::new()
        } else {
            crate::utils::format_size(self.size)
        }
    }
}
