//! Background directory listing.
//!
//! Listing a large or slow directory happens on a worker thread so the
//! interaction thread keeps responding. Results come back as whole snapshots.

pub mod manager;

use std::path::PathBuf;

use crate::errors::AppError;
use crate::fs::DirectorySnapshot;

/// Request for an I/O operation
#[derive(Debug)]
pub enum IoRequest {
    /// List directory contents
    List(PathBuf),
}

/// Response from an I/O operation
#[derive(Debug)]
pub enum IoResponse {
    /// Directory listing completed successfully
    Listed(DirectorySnapshot),
    /// Listing failed for this path
    Error(PathBuf, AppError),
}
