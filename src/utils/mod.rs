//! Utilities shared by the library and the CLI.
//!
//! - [`fs`]: atomic writes, directories and email source discovery
//! - [`progress`]: per-item progress markers for batches

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, safe_write};
pub use progress::{Marker, MarkerProgress};
