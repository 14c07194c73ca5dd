//! Directory creation and removal.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::core::{EmailError, Result};

/// Ensure a directory exists, creating it and its parents if necessary.
///
/// # Errors
///
/// Returns [`EmailError::FileWrite`] when the path exists but is not a
/// directory, or when creation fails.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|source| EmailError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
    } else if !path.is_dir() {
        return Err(EmailError::FileWrite {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "path exists but is not a directory"),
        });
    }
    Ok(())
}

/// Remove a directory and everything below it. A missing directory is not an error.
///
/// # Errors
///
/// Returns [`EmailError::FileWrite`] when removal fails.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    debug!("Removing {}", path.display());
    fs::remove_dir_all(path).map_err(|source| EmailError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}
