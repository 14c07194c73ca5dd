//! File system helpers.
//!
//! - [`atomic`]: temp-and-rename writes for rendered artifacts and sources
//! - [`dirs`]: directory creation and removal
//! - [`discovery`]: locating email sources through the configured pattern

pub mod atomic;
pub mod dirs;
pub mod discovery;

pub use atomic::{atomic_write, safe_write};
pub use dirs::{ensure_dir, remove_dir_all};
