//! Programmatic access to a project for editors and other tools.
//!
//! [`EmailService`] wraps the same read, validate and render steps the batch
//! uses, one email at a time, plus the source editing operations that keep the
//! expected placeholder counts in sync.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::core::{EmailError, Result};
use crate::models::{Email, Placeholder, Placeholders, RenderedEmail};
use crate::render;
use crate::source::read_email;
use crate::utils::fs::{discovery, safe_write};
use crate::validator::{ExpectedCountsCache, generate_config, validate_placeholders};

/// Single-email operations over one project.
#[derive(Debug, Clone)]
pub struct EmailService {
    settings: Arc<Settings>,
    expected: Arc<ExpectedCountsCache>,
}

impl EmailService {
    pub fn new(settings: Arc<Settings>) -> Self {
        let expected = Arc::new(ExpectedCountsCache::new(settings.placeholders_filepath()));
        Self {
            settings,
            expected,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shared expected-count cache, for handing to a batch run.
    pub fn expected_counts(&self) -> Arc<ExpectedCountsCache> {
        Arc::clone(&self.expected)
    }

    /// Distinct email names across all locales, sorted.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the pattern is invalid.
    pub fn email_names(&self) -> Result<Vec<String>> {
        discovery::email_names(&self.settings)
    }

    /// Render `name` in `locale`.
    ///
    /// Returns `None` when the email does not exist, or when it fails
    /// validation and `force` is not set.
    ///
    /// # Errors
    ///
    /// Returns read and render errors, including a missing subject.
    pub fn render_email(&self, locale: &str, name: &str) -> Result<Option<RenderedEmail>> {
        self.render(locale, name, &BTreeMap::new())
    }

    /// Render `name` in `locale` with placeholder contents replaced.
    ///
    /// Each override replaces the default content of the placeholder with that
    /// name and drops its variants; unknown names are added as text
    /// placeholders. Validation runs against the stored contents.
    ///
    /// # Errors
    ///
    /// Same as [`render_email`](Self::render_email).
    pub fn render_with_overrides(
        &self,
        locale: &str,
        name: &str,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Option<RenderedEmail>> {
        self.render(locale, name, overrides)
    }

    fn render(&self, locale: &str, name: &str, overrides: &BTreeMap<String, String>) -> Result<Option<RenderedEmail>> {
        let Some(email) = discovery::email(&self.settings, name, locale)? else {
            debug!("Email {}/{} not found", locale, name);
            return Ok(None);
        };

        let (template, placeholders) = read_email(&self.settings, &email)?;
        if !self.is_valid(&email, &placeholders)? {
            return Ok(None);
        }

        let placeholders = apply_overrides(placeholders, overrides);
        render::render_email(&self.settings, &email, &template, &placeholders).map(Some)
    }

    fn is_valid(&self, email: &Email, placeholders: &Placeholders) -> Result<bool> {
        let expected = self.expected.get()?;
        let report = validate_placeholders(&email.name, &email.locale, placeholders, expected.as_deref());
        if report.valid {
            return Ok(true);
        }

        if self.settings.force {
            warn!("Placeholder validation failed for {} (forced): {}", email, report.summary());
            Ok(true)
        } else {
            debug!("Placeholder validation failed for {}: {}", email, report.summary());
            Ok(false)
        }
    }

    /// Raw source document of `name` in `locale`.
    ///
    /// # Errors
    ///
    /// - [`EmailError::EmailNotFound`] when the source does not exist
    /// - [`EmailError::FileRead`] when it cannot be read
    pub fn template_source(&self, locale: &str, name: &str) -> Result<String> {
        let email = self.require(locale, name)?;
        std::fs::read_to_string(&email.path).map_err(|source| EmailError::FileRead {
            path: email.path,
            source,
        })
    }

    /// Write the source document of `name` in `locale` and regenerate the
    /// expected counts. Returns the written path.
    ///
    /// # Errors
    ///
    /// Returns a write error, or any error of [`regenerate_placeholders`](Self::regenerate_placeholders).
    pub fn save_template(&self, locale: &str, name: &str, content: &str) -> Result<PathBuf> {
        let path = discovery::email_path(&self.settings, name, locale);
        safe_write(&path, content)?;
        info!("Saved {}/{} to {}", locale, name, path.display());

        self.regenerate_placeholders()?;
        Ok(path)
    }

    /// Delete `name` in every locale and regenerate the expected counts.
    /// Returns the deleted paths.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::FileWrite`] when a source cannot be removed.
    pub fn delete_template(&self, name: &str) -> Result<Vec<PathBuf>> {
        let emails = discovery::emails(&self.settings, Some(name), None)?;

        let mut deleted = Vec::with_capacity(emails.len());
        for email in emails {
            std::fs::remove_file(&email.path).map_err(|source| EmailError::FileWrite {
                path: email.path.clone(),
                source,
            })?;
            info!("Deleted {}", email.path.display());
            deleted.push(email.path);
        }

        self.regenerate_placeholders()?;
        Ok(deleted)
    }

    /// Expected placeholder names of every discovered email.
    ///
    /// Emails missing from the count table (or every email, when there is no
    /// table) map to an empty list.
    ///
    /// # Errors
    ///
    /// Returns discovery errors and an unreadable count table.
    pub fn email_placeholders(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let expected = self.expected.get()?;
        let names = self.email_names()?;

        Ok(names
            .into_iter()
            .map(|name| {
                let placeholders = expected
                    .as_deref()
                    .and_then(|table| table.get(&name))
                    .map(|counts| counts.keys().cloned().collect())
                    .unwrap_or_default();
                (name, placeholders)
            })
            .collect())
    }

    /// Regenerate the expected-count file from the default locale.
    ///
    /// Returns the written path, `None` when the default locale has no emails.
    ///
    /// # Errors
    ///
    /// Returns read errors of default-locale emails and write errors.
    pub fn regenerate_placeholders(&self) -> Result<Option<PathBuf>> {
        let written = generate_config(&self.settings)?;
        self.expected.invalidate();
        Ok(written)
    }

    pub fn placeholders_filepath(&self) -> PathBuf {
        self.settings.placeholders_filepath()
    }

    fn require(&self, locale: &str, name: &str) -> Result<Email> {
        discovery::email(&self.settings, name, locale)?.ok_or_else(|| EmailError::EmailNotFound {
            name: name.to_string(),
            locale: locale.to_string(),
        })
    }
}

fn apply_overrides(mut placeholders: Placeholders, overrides: &BTreeMap<String, String>) -> Placeholders {
    for (name, content) in overrides {
        match placeholders.get_mut(name) {
            Some(placeholder) => {
                placeholder.content.clone_from(content);
                placeholder.variants.clear();
            }
            None => {
                placeholders.insert(name.clone(), Placeholder::new(name.clone(), content.clone()));
            }
        }
    }
    placeholders
}
