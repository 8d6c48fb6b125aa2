//! Filesystem module

pub mod classify;
pub mod entry;
pub mod ops;
pub mod snapshot;
pub mod utils;

pub use classify::IconTag;
pub use entry::{Entry, EntryKind};
pub use ops::read_directory;
pub use snapshot::{DirectorySnapshot, SnapshotHandle};
pub use utils::{CopyOptions, copy_to, delete_path, move_to, unique_destination};
