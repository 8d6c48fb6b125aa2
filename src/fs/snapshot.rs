//! Immutable directory snapshots

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime};

use super::entry::Entry;

/// One capture of a directory's entries.
///
/// Never mutated after construction; a refresh builds a new snapshot.
#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    path: PathBuf,
    captured_at: SystemTime,
    scan_time: Duration,
    entries: Vec<Entry>,
}

impl DirectorySnapshot {
    pub(crate) fn new(
        path: PathBuf,
        captured_at: SystemTime,
        scan_time: Duration,
        entries: Vec<Entry>,
    ) -> Self {
        Self {
            path,
            captured_at,
            scan_time,
            entries,
        }
    }

    /// Snapshot with no entries, used before the first listing succeeds
    pub fn empty(path: PathBuf) -> Self {
        Self::new(path, SystemTime::now(), Duration::ZERO, Vec::new())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn captured_at(&self) -> SystemTime {
        self.captured_at
    }

    /// Time spent enumerating and stating the directory
    pub fn scan_time(&self) -> Duration {
        self.scan_time
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by exact name
    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn dir_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_dir()).count()
    }

    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_dir()).count()
    }

    /// Total size of all files
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

/// Shared slot holding the current snapshot of a view.
///
/// Readers clone the inner `Arc` and keep using it while a refresh publishes
/// a replacement.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<Arc<DirectorySnapshot>>>,
}

impl SnapshotHandle {
    pub fn new(snapshot: DirectorySnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// The snapshot currently published
    pub fn current(&self) -> Arc<DirectorySnapshot> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the published snapshot
    pub fn publish(&self, snapshot: Arc<DirectorySnapshot>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}
