//! Staged copy/cut clipboard

use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};
use crate::fs::{CopyOptions, copy_to, move_to};

/// What a paste does with the staged source
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClipboardMode {
    Copy,
    Cut,
}

/// The single pending clipboard entry
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ClipboardSlot {
    pub source: PathBuf,
    pub mode: ClipboardMode,
}

/// Clipboard: empty, or one staged source.
///
/// A successful cut-paste empties it. A copy stays staged for further pastes
/// until something replaces or clears it.
#[derive(Debug, Default)]
pub struct Clipboard {
    slot: Option<ClipboardSlot>,
}

impl Clipboard {
    pub fn stage(&mut self, source: PathBuf, mode: ClipboardMode) {
        self.slot = Some(ClipboardSlot { source, mode });
    }

    pub fn stage_copy(&mut self, source: PathBuf) {
        self.stage(source, ClipboardMode::Copy);
    }

    pub fn stage_cut(&mut self, source: PathBuf) {
        self.stage(source, ClipboardMode::Cut);
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn slot(&self) -> Option<&ClipboardSlot> {
        self.slot.as_ref()
    }

    pub fn is_staged(&self) -> bool {
        self.slot.is_some()
    }

    /// Record the outcome of a paste of `slot`.
    ///
    /// Only a successful cut of the slot still staged empties the clipboard.
    pub fn complete_paste(&mut self, slot: &ClipboardSlot, succeeded: bool) {
        if succeeded && slot.mode == ClipboardMode::Cut && self.slot.as_ref() == Some(slot) {
            self.slot = None;
        }
    }

    /// Paste into `dest_dir` on the calling thread. Returns the new path.
    pub fn paste(&mut self, dest_dir: &Path, opts: &CopyOptions) -> AppResult<PathBuf> {
        let slot = self.slot.clone().ok_or(AppError::NothingStaged)?;
        let result = run_paste(&slot, dest_dir, opts);
        self.complete_paste(&slot, result.is_ok());
        result
    }
}

/// Execute one paste of a slot
pub fn run_paste(slot: &ClipboardSlot, dest_dir: &Path, opts: &CopyOptions) -> AppResult<PathBuf> {
    match slot.mode {
        ClipboardMode::Copy => copy_to(&slot.source, dest_dir, opts),
        ClipboardMode::Cut => move_to(&slot.source, dest_dir, opts),
    }
}
