//! Email source discovery.
//!
//! Sources are found by expanding the configured [`EmailPattern`] under the
//! source root. The per-locale global source is never returned as an email.

use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

use crate::config::Settings;
use crate::constants::{GLOBAL_EMAIL_NAME, SOURCE_EXTENSION};
use crate::core::Result;
use crate::models::Email;
use crate::pattern::{EmailPattern, compile_glob, glob_matches};

/// Emails under the source root, optionally restricted to one name and/or
/// locale, sorted by path.
///
/// # Errors
///
/// Returns a configuration error when the pattern is invalid.
pub fn emails(settings: &Settings, name: Option<&str>, locale: Option<&str>) -> Result<Vec<Email>> {
    let pattern = EmailPattern::new(&settings.pattern)?;
    let source_dir = settings.source_dir();

    let emails: Vec<Email> = pattern
        .find_matches(&source_dir, name, locale)?
        .into_iter()
        .filter(|relative| relative.to_string_lossy().ends_with(SOURCE_EXTENSION))
        .filter_map(|relative| {
            let (name, locale) = pattern.extract(&relative)?;
            (name != GLOBAL_EMAIL_NAME).then(|| Email::new(name, locale, source_dir.join(&relative)))
        })
        .collect();

    debug!("Discovered {} emails in {}", emails.len(), source_dir.display());
    Ok(emails)
}

/// The email `name` in `locale`, if its source exists.
///
/// # Errors
///
/// Returns a configuration error when the pattern is invalid.
pub fn email(settings: &Settings, name: &str, locale: &str) -> Result<Option<Email>> {
    Ok(emails(settings, Some(name), Some(locale))?.into_iter().next())
}

/// Emails processed by a batch: everything, or the subset matching the
/// `exclusive` glob (relative to the source root).
///
/// # Errors
///
/// Returns a configuration error when the pattern or the exclusive glob is invalid.
pub fn batch_emails(settings: &Settings) -> Result<Vec<Email>> {
    let all = emails(settings, None, None)?;
    let Some(exclusive) = settings.exclusive.as_deref() else {
        return Ok(all);
    };

    let filter = compile_glob("exclusive", exclusive)?;
    let source_dir = settings.source_dir();
    let selected: Vec<Email> = all
        .into_iter()
        .filter(|email| {
            email.path.strip_prefix(&source_dir).is_ok_and(|relative| glob_matches(&filter, relative))
        })
        .collect();
    debug!("Exclusive filter '{}' selected {} emails", exclusive, selected.len());
    Ok(selected)
}

/// Distinct email names across all locales, sorted.
///
/// # Errors
///
/// Returns a configuration error when the pattern is invalid.
pub fn email_names(settings: &Settings) -> Result<Vec<String>> {
    let names: BTreeSet<String> = emails(settings, None, None)?.into_iter().map(|email| email.name).collect();
    Ok(names.into_iter().collect())
}

/// Source path of `name` in `locale`, whether or not it exists.
pub fn email_path(settings: &Settings, name: &str, locale: &str) -> PathBuf {
    settings.source_dir().join(settings.pattern.replace("{name}", name).replace("{locale}", locale))
}

/// The global source of `locale`. The file may not exist.
pub fn global_email(settings: &Settings, locale: &str) -> Email {
    Email::new(GLOBAL_EMAIL_NAME, locale, email_path(settings, GLOBAL_EMAIL_NAME, locale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn project() -> (tempfile::TempDir, Settings) {
        let temp = tempdir().unwrap();
        for path in ["src/en/welcome.xml", "src/en/reset.xml", "src/en/global.xml", "src/fr/welcome.xml", "src/fr/notes.md"]
        {
            let full = temp.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, "<resources/>").unwrap();
        }
        let settings = Settings::with_root(temp.path());
        (temp, settings)
    }

    #[test]
    fn test_emails_skip_global_and_other_files() {
        let (_temp, settings) = project();
        let found: Vec<String> = emails(&settings, None, None).unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(found, vec!["en/reset", "en/welcome", "fr/welcome"]);
    }

    #[test]
    fn test_email_lookup() {
        let (_temp, settings) = project();
        let email = email(&settings, "welcome", "fr").unwrap().unwrap();
        assert_eq!(email.path, settings.source_dir().join("fr/welcome.xml"));
        assert!(super::email(&settings, "reset", "fr").unwrap().is_none());
    }

    #[test]
    fn test_email_names() {
        let (_temp, settings) = project();
        assert_eq!(email_names(&settings).unwrap(), vec!["reset", "welcome"]);
    }

    #[test]
    fn test_exclusive_subset() {
        let (_temp, mut settings) = project();
        settings.exclusive = Some("fr/*.xml".to_string());
        let selected = batch_emails(&settings).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].locale, "fr");
    }

    #[test]
    fn test_global_email_path() {
        let settings = Settings::with_root("/project");
        let global = global_email(&settings, "de");
        assert_eq!(global.path, PathBuf::from("/project/src/de/global.xml"));
        assert_eq!(global.name, "global");
    }
}
