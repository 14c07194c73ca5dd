//! The expected placeholder count table.
//!
//! Stored as JSON, `{ "<email>": { "<token>": <count> } }`, with sorted keys and
//! four-space indentation. It is regenerated wholesale from the default locale
//! and never patched.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use super::count_placeholders;
use crate::config::Settings;
use crate::core::{EmailError, Result};
use crate::source::read_email;
use crate::utils::fs::{discovery, safe_write};

/// Token occurrences of one email.
pub type PlaceholderCounts = BTreeMap<String, usize>;

/// Token occurrences of every email, keyed by email name.
pub type ExpectedCounts = BTreeMap<String, PlaceholderCounts>;

/// Load the table at `path`; `None` when the file does not exist.
///
/// # Errors
///
/// Returns [`EmailError::PlaceholdersFile`] when the file exists but cannot be
/// read or parsed.
pub fn load_expected(path: &Path) -> Result<Option<ExpectedCounts>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No expected placeholder counts at {}, skipping validation", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(EmailError::PlaceholdersFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    serde_json::from_str(&content).map(Some).map_err(|e| EmailError::PlaceholdersFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Table loaded once and shared until [`invalidate`](Self::invalidate) is called.
///
/// The table is read-only during a render pass; regeneration invalidates it.
#[derive(Debug)]
pub struct ExpectedCountsCache {
    path: PathBuf,
    loaded: Mutex<Option<Option<Arc<ExpectedCounts>>>>,
}

impl ExpectedCountsCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: Mutex::new(None),
        }
    }

    /// The table, loading it on first use. `None` when no file exists.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::PlaceholdersFile`] for an unreadable file; the
    /// failure is not cached.
    pub fn get(&self) -> Result<Option<Arc<ExpectedCounts>>> {
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = loaded.as_ref() {
            return Ok(table.clone());
        }

        let table = load_expected(&self.path)?.map(Arc::new);
        *loaded = Some(table.clone());
        Ok(table)
    }

    /// Drop the loaded table so the next [`get`](Self::get) reads the file again.
    pub fn invalidate(&self) {
        *self.loaded.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Regenerate the table from every email of the default locale.
///
/// Returns the written path, or `None` when the default locale has no emails
/// (the existing file is left untouched).
///
/// # Errors
///
/// Returns the read error of any default-locale email, or a write error.
pub fn generate_config(settings: &Settings) -> Result<Option<PathBuf>> {
    let emails = discovery::emails(settings, None, Some(&settings.default_locale))?;

    let mut table = ExpectedCounts::new();
    for email in &emails {
        let (_, placeholders) = read_email(settings, email)?;
        table.insert(email.name.clone(), count_placeholders(&placeholders));
    }

    if table.is_empty() {
        info!("No emails found for locale {}, placeholder counts not generated", settings.default_locale);
        return Ok(None);
    }

    let path = settings.placeholders_filepath();
    safe_write(&path, &to_json(&table)?)?;
    info!("Wrote expected placeholder counts for {} emails to {}", table.len(), path.display());
    Ok(Some(path))
}

fn to_json(table: &ExpectedCounts) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    table.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(|e| EmailError::Serialize {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file() {
        let temp = tempdir().unwrap();
        assert!(load_expected(&temp.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn test_load_invalid_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("placeholders_config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_expected(&path), Err(EmailError::PlaceholdersFile { .. })));
    }

    #[test]
    fn test_cache_invalidate() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("placeholders_config.json");
        let cache = ExpectedCountsCache::new(&path);
        assert!(cache.get().unwrap().is_none());

        std::fs::write(&path, r#"{"welcome": {"name": 1}}"#).unwrap();
        assert!(cache.get().unwrap().is_none());

        cache.invalidate();
        let table = cache.get().unwrap().unwrap();
        assert_eq!(table["welcome"]["name"], 1);
    }

    #[test]
    fn test_json_layout() {
        let mut table = ExpectedCounts::new();
        table.insert("welcome".to_string(), PlaceholderCounts::from([("name".to_string(), 2)]));
        table.insert("reset".to_string(), PlaceholderCounts::new());
        assert_eq!(to_json(&table).unwrap(), "{\n    \"reset\": {},\n    \"welcome\": {\n        \"name\": 2\n    }\n}");
    }
}
