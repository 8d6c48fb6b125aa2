//! Panel data structures and sorting

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::AppResult;
use crate::fs::{DirectorySnapshot, Entry, SnapshotHandle, read_directory};

/// Column the content table is sorted by
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SortColumn {
    #[default]
    Name,
    Type,
    Size,
    Modified,
}

impl std::str::FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "type" => Ok(Self::Type),
            "size" => Ok(Self::Size),
            "modified" | "time" | "mtime" => Ok(Self::Modified),
            _ => Err(format!("unknown sort column: {s}")),
        }
    }
}

/// Sort direction
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Sort configuration of a view
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn is_descending(&self) -> bool {
        self.direction == SortDirection::Descending
    }

    /// Same column flips the direction; a new column starts ascending
    pub fn toggled(self, column: SortColumn) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                column,
                direction: SortDirection::Ascending,
            }
        }
    }
}

fn compare(a: &Entry, b: &Entry, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortColumn::Type => a.type_label.to_lowercase().cmp(&b.type_label.to_lowercase()),
        SortColumn::Size => a.size.cmp(&b.size),
        SortColumn::Modified => a.modified.cmp(&b.modified),
    }
}

/// Display order of a snapshot as indices into its entries.
///
/// Stable in both directions: ties keep snapshot order, which puts
/// directories before files.
pub fn sort_order(snapshot: &DirectorySnapshot, spec: SortSpec) -> Vec<usize> {
    let entries = snapshot.entries();
    let mut indices: Vec<usize> = (0..entries.len()).collect();
    indices.sort_by(|&a, &b| {
        let cmp = compare(&entries[a], &entries[b], spec.column);
        match spec.direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        }
    });
    indices
}

/// The content view of one directory
#[derive(Debug)]
pub struct Panel {
    /// Current snapshot, shared with whoever renders it
    snapshot: SnapshotHandle,
    /// Indices into the snapshot, in sorted display order
    sorted_indices: Vec<usize>,
    /// Cursor position (index into sorted_indices)
    pub cursor: usize,
    sort: SortSpec,
    /// Error message if the last listing failed
    pub error: Option<String>,
}

impl Panel {
    /// Create a panel showing `path`.
    ///
    /// A failed first listing leaves the panel empty with `error` set.
    pub fn new(path: PathBuf, sort: SortSpec) -> Self {
        let path = std::path::absolute(&path).unwrap_or(path);
        let mut panel = Self {
            snapshot: SnapshotHandle::new(DirectorySnapshot::empty(path.clone())),
            sorted_indices: Vec::new(),
            cursor: 0,
            sort,
            error: None,
        };
        // Failure is recorded in `error`
        let _ = panel.change_directory(path);
        panel
    }

    /// Handle for readers on other threads
    pub fn snapshot_handle(&self) -> SnapshotHandle {
        self.snapshot.clone()
    }

    pub fn snapshot(&self) -> Arc<DirectorySnapshot> {
        self.snapshot.current()
    }

    pub fn path(&self) -> PathBuf {
        self.snapshot.current().path().to_path_buf()
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    /// Re-derive display order from the current snapshot
    fn resort(&mut self) {
        self.sorted_indices = sort_order(&self.snapshot.current(), self.sort);
        if self.cursor >= self.sorted_indices.len() {
            self.cursor = self.sorted_indices.len().saturating_sub(1);
        }
    }

    /// Install a snapshot built elsewhere (e.g. by a background listing)
    pub fn apply_snapshot(&mut self, snapshot: DirectorySnapshot) {
        let same_dir = snapshot.path() == self.snapshot.current().path();
        let selected_name = if same_dir {
            self.selected().map(|e| e.name.clone())
        } else {
            None
        };

        self.snapshot.publish(Arc::new(snapshot));
        self.error = None;
        if !same_dir {
            self.cursor = 0;
        }
        self.resort();
        if let Some(name) = selected_name {
            self.select_name(&name);
        }
    }

    /// Re-list the current directory, keeping the cursor on the same name
    pub fn refresh(&mut self) -> AppResult<()> {
        let path = self.path();
        match read_directory(&path) {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Change to a new directory. On failure the panel keeps showing the old one.
    pub fn change_directory(&mut self, new_path: PathBuf) -> AppResult<()> {
        // Relative paths like "." have no usable parent
        let new_path = std::path::absolute(&new_path).unwrap_or(new_path);
        match read_directory(&new_path) {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                self.cursor = 0;
                Ok(())
            }
            Err(e) => {
                self.error = Some(format!("Cannot enter '{}': {}", new_path.display(), e));
                Err(e)
            }
        }
    }

    /// Go to the parent directory, with the cursor on the directory we left.
    /// Returns false at the root.
    pub fn go_parent(&mut self) -> AppResult<bool> {
        let current = self.path();
        let Some(parent) = current.parent() else {
            return Ok(false);
        };
        let left = current.file_name().map(|s| s.to_string_lossy().into_owned());

        self.change_directory(parent.to_path_buf())?;
        if let Some(name) = left {
            self.select_name(&name);
        }
        Ok(true)
    }

    /// Sort by a column, toggling direction if it is already the sort column
    pub fn set_sort(&mut self, column: SortColumn) {
        self.apply_sort(self.sort.toggled(column));
    }

    /// Sort with an explicit spec, keeping the cursor on the same entry
    pub fn apply_sort(&mut self, spec: SortSpec) {
        let selected_name = self.selected().map(|e| e.name.clone());
        self.sort = spec;
        self.resort();
        if let Some(name) = selected_name {
            self.select_name(&name);
        }
    }

    /// Display order as indices into the snapshot
    pub fn sorted_indices(&self) -> &[usize] {
        &self.sorted_indices
    }

    /// Entries in display order
    pub fn sorted_entries(&self) -> Vec<Entry> {
        let snapshot = self.snapshot.current();
        self.sorted_indices
            .iter()
            .filter_map(|&idx| snapshot.get(idx).cloned())
            .collect()
    }

    /// Get the entry under the cursor
    pub fn selected(&self) -> Option<Entry> {
        self.entry_at(self.cursor)
    }

    /// Get entry at a given display index
    pub fn entry_at(&self, display_index: usize) -> Option<Entry> {
        let idx = *self.sorted_indices.get(display_index)?;
        self.snapshot.current().get(idx).cloned()
    }

    pub fn entry_count(&self) -> usize {
        self.sorted_indices.len()
    }

    /// Put the cursor on the entry with this name. Returns true if found.
    pub fn select_name(&mut self, name: &str) -> bool {
        let snapshot = self.snapshot.current();
        let found = self
            .sorted_indices
            .iter()
            .position(|&idx| snapshot.get(idx).is_some_and(|e| e.name == name));
        if let Some(pos) = found {
            self.cursor = pos;
            true
        } else {
            false
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.entry_count() {
            self.cursor += 1;
        }
    }

    /// Enter the selected directory. Returns false if the selection is not one.
    pub fn enter_selected(&mut self) -> AppResult<bool> {
        let Some(entry) = self.selected() else {
            return Ok(false);
        };
        if !entry.is_dir() {
            return Ok(false);
        }
        self.change_directory(entry.path)?;
        Ok(true)
    }

    /// Path of the selected entry
    pub fn selected_path(&self) -> Option<PathBuf> {
        self.selected().map(|e| e.path)
    }

    /// True if `path` is the directory on display
    pub fn is_showing(&self, path: &Path) -> bool {
        self.snapshot.current().path() == path
    }
}
