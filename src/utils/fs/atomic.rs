//! Atomic file writes using a temp-and-rename strategy.
//!
//! Readers of a destination file never see partially written content.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::dirs::ensure_dir;
use crate::core::{EmailError, Result};

/// Atomically write a string to `path`.
///
/// # Errors
///
/// Returns [`EmailError::FileWrite`] when any step of the write fails.
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Atomically write bytes to `path`.
///
/// 1. Writes the content to `<path>.tmp` next to the target
/// 2. Syncs the temporary file to disk
/// 3. Renames it over the target
///
/// Parent directories are created when missing.
///
/// # Errors
///
/// Returns [`EmailError::FileWrite`] when any step of the write fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let temp_path = temp_path_for(path);
    let write_error = |source| EmailError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    {
        let mut file = fs::File::create(&temp_path).map_err(write_error)?;
        file.write_all(content).map_err(write_error)?;
        file.sync_all().map_err(write_error)?;
    }

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        write_error(source)
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
