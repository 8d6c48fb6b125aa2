//! dirscout: directory listing, sorting, favorites and copy/move/delete
//! for a file-browsing front end.

pub mod async_io;
pub mod config;
pub mod errors;
pub mod favorites;
pub mod fs;
pub mod state;
pub mod utils;

pub use errors::{AppError, AppResult};
