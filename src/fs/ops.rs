//! Directory listing

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Instant, SystemTime};

use super::entry::Entry;
use super::snapshot::DirectorySnapshot;
use crate::errors::{AppError, AppResult};

/// Read directory contents into a snapshot.
///
/// Children that cannot be stated are left out. Failing to open the
/// directory itself is an error. Directories come before files; within each
/// group the enumeration order is kept.
pub fn read_directory(path: &Path) -> AppResult<DirectorySnapshot> {
    let started = Instant::now();
    let captured_at = SystemTime::now();

    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(AppError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err(AppError::PermissionDenied(path.to_path_buf()));
        }
        Err(_) => return Err(AppError::NotADirectory(path.to_path_buf())),
    }

    let reader = fs::read_dir(path).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => AppError::PermissionDenied(path.to_path_buf()),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
            AppError::NotADirectory(path.to_path_buf())
        }
        _ => AppError::ListFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for item in reader {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                log::debug!("skipping unreadable entry in {}: {}", path.display(), e);
                continue;
            }
        };
        let child = item.path();
        match Entry::from_path(&child) {
            Ok(entry) if entry.is_dir() => dirs.push(entry),
            Ok(entry) => files.push(entry),
            Err(e) => {
                log::debug!("skipping {}: {}", child.display(), e);
            }
        }
    }

    dirs.append(&mut files);
    let scan_time = started.elapsed();
    log::debug!(
        "listed {} entries in {} ({:?})",
        dirs.len(),
        path.display(),
        scan_time
    );

    Ok(DirectorySnapshot::new(
        path.to_path_buf(),
        captured_at,
        scan_time,
        dirs,
    ))
}

/// Readable subdirectories of a path, sorted by name (case-insensitive).
///
/// Used for navigation trees, which only show folders the user can enter.
pub fn child_directories(path: &Path) -> AppResult<Vec<Entry>> {
    let snapshot = read_directory(path)?;
    let mut dirs: Vec<Entry> = snapshot
        .entries()
        .iter()
        .filter(|e| e.is_dir() && fs::read_dir(&e.path).is_ok())
        .cloned()
        .collect();
    dirs.sort_by_key(|e| e.name.to_lowercase());
    Ok(dirs)
}
