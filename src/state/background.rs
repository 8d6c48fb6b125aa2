//! Background task handling for file operations

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread::{self, JoinHandle};

use super::clipboard::{ClipboardMode, ClipboardSlot, run_paste};
use crate::errors::AppResult;
use crate::fs::{CopyOptions, delete_path};

/// A file operation to run off the interaction thread
#[derive(Clone, Debug)]
pub enum FileOperation {
    /// Paste a staged clipboard entry into a directory
    Paste { slot: ClipboardSlot, dest_dir: PathBuf },
    /// Delete a path (already confirmed by the user)
    Delete { path: PathBuf },
}

impl FileOperation {
    pub fn name(&self) -> &'static str {
        match self {
            FileOperation::Paste { slot, .. } => match slot.mode {
                ClipboardMode::Copy => "Copy",
                ClipboardMode::Cut => "Move",
            },
            FileOperation::Delete { .. } => "Delete",
        }
    }

    /// Run to completion on the current thread.
    /// Returns the created path for pastes, None for deletes.
    pub fn run(&self, opts: &CopyOptions) -> AppResult<Option<PathBuf>> {
        match self {
            FileOperation::Paste { slot, dest_dir } => run_paste(slot, dest_dir, opts).map(Some),
            FileOperation::Delete { path } => delete_path(path).map(|()| None),
        }
    }
}

/// Result of a completed file operation
#[derive(Debug)]
pub struct FileOpResult {
    pub operation: FileOperation,
    pub outcome: AppResult<Option<PathBuf>>,
}

/// A background file operation with its completion channel.
///
/// Runs until it finishes or fails; there is no cancellation.
pub struct BackgroundTask {
    receiver: Receiver<FileOpResult>,
    handle: JoinHandle<()>,
    finished: bool,
}

impl std::fmt::Debug for BackgroundTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundTask")
            .field("finished", &self.finished)
            .finish()
    }
}

impl BackgroundTask {
    /// Spawn a background file operation
    pub fn file_operation(operation: FileOperation, opts: CopyOptions) -> Self {
        let (tx, rx) = channel::<FileOpResult>();

        let handle = thread::spawn(move || {
            log::debug!("{} started in background", operation.name());
            let outcome = operation.run(&opts);
            if let Err(e) = &outcome {
                log::debug!("{} failed: {}", operation.name(), e);
            }
            // The receiver may be gone if the session shut down
            let _ = tx.send(FileOpResult { operation, outcome });
        });

        BackgroundTask {
            receiver: rx,
            handle,
            finished: false,
        }
    }

    /// Check if the task has completed (non-blocking)
    pub fn try_recv(&mut self) -> Option<FileOpResult> {
        if self.finished {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                self.finished = true;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                None
            }
        }
    }

    /// True once a result was taken or the worker went away
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Block until the task completes.
    /// Returns None if the worker died without reporting.
    pub fn wait(self) -> Option<FileOpResult> {
        let result = self.receiver.recv().ok();
        if self.handle.join().is_err() {
            log::warn!("file operation worker panicked");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_background_copy_reports_destination() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.txt");
        fs::write(&src, b"abc").unwrap();
        let dest_dir = tmp.path().join("out");
        fs::create_dir(&dest_dir).unwrap();

        let op = FileOperation::Paste {
            slot: ClipboardSlot {
                source: src.clone(),
                mode: ClipboardMode::Copy,
            },
            dest_dir: dest_dir.clone(),
        };
        let task = BackgroundTask::file_operation(op, CopyOptions::default());
        let result = task.wait().unwrap();

        assert_eq!(result.operation.name(), "Copy");
        let out = result.outcome.unwrap().unwrap();
        assert_eq!(out, dest_dir.join("a.txt"));
        assert_eq!(fs::read(out).unwrap(), b"abc");
    }

    #[test]
    fn test_background_delete_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let op = FileOperation::Delete {
            path: tmp.path().join("ghost"),
        };
        let task = BackgroundTask::file_operation(op, CopyOptions::default());
        let result = task.wait().unwrap();
        assert!(result.outcome.is_err());
    }

    #[test]
    fn test_try_recv_eventually_completes_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gone.txt");
        fs::write(&path, b"x").unwrap();

        let mut task = BackgroundTask::file_operation(
            FileOperation::Delete { path: path.clone() },
            CopyOptions::default(),
        );
        let result = loop {
            if let Some(result) = task.try_recv() {
                break result;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        };
        assert!(matches!(result.outcome, Ok(None)));
        assert!(!path.exists());
        assert!(task.try_recv().is_none());
    }
}
