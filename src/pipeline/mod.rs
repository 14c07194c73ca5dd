//! Per-email orchestration and batch fan-out.
//!
//! # Item lifecycle
//!
//! ```text
//! Discovered ─> Validating ─> Rendering ─> Written
//!                   │             │
//!                   └─────────────┴─> FallbackAttempted ─> Substituted | Failed
//! ```
//!
//! - An invalid email goes to fallback unless `force` is set, in which case
//!   the failure is recorded as a warning and rendering proceeds
//! - Any read or render failure (missing subject included) goes to fallback
//! - Fallback renders the same email name in the default locale and writes it
//!   under the requested locale's output directory
//!
//! Each (email, locale) pair is processed independently; nothing is shared
//! between items except the read-only expected-count table.

mod batch;
mod report;
mod writer;

pub use batch::run_batch;
pub use report::{BatchReport, ItemReport, Outcome};
pub use writer::{output_dir, save_rendered};

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::core::{EmailError, Result};
use crate::models::{Email, RenderedEmail};
use crate::render::render_email;
use crate::source::read_email;
use crate::utils::fs::discovery;
use crate::validator::{ExpectedCountsCache, unused_placeholders, validate_placeholders};

/// Runs the item lifecycle for single emails.
#[derive(Debug, Clone)]
pub struct EmailPipeline {
    settings: Arc<Settings>,
    expected: Arc<ExpectedCountsCache>,
}

impl EmailPipeline {
    pub const fn new(settings: Arc<Settings>, expected: Arc<ExpectedCountsCache>) -> Self {
        Self {
            settings,
            expected,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate, render and write `email`, falling back to the default locale.
    pub fn process(&self, email: &Email) -> ItemReport {
        let mut warnings = Vec::new();

        let outcome = match self.prepare(email, &mut warnings) {
            Ok(rendered) => self.write(email, &email.locale, &rendered, Outcome::Written),
            Err(error) => self.fallback(email, &error, &mut warnings),
        };

        ItemReport {
            email: email.clone(),
            outcome,
            warnings,
        }
    }

    /// Read, validate and render `email` without writing anything.
    ///
    /// Warnings that do not stop rendering (forced validation failures,
    /// placeholders the template never uses) are pushed to `warnings`.
    ///
    /// # Errors
    ///
    /// - [`EmailError::Validation`] for an invalid email when `force` is not set
    /// - any read or render error
    pub fn prepare(&self, email: &Email, warnings: &mut Vec<String>) -> Result<RenderedEmail> {
        let (template, placeholders) = read_email(&self.settings, email)?;

        let expected = self.expected.get()?;
        let report = validate_placeholders(&email.name, &email.locale, &placeholders, expected.as_deref());
        if !report.valid {
            let error = EmailError::Validation {
                email: email.name.clone(),
                locale: email.locale.clone(),
                summary: report.summary(),
            };
            if !self.settings.force {
                return Err(error);
            }
            warn!("{} (forced)", error);
            warnings.push(error.to_string());
        }

        let unused = unused_placeholders(&template, &placeholders);
        if !unused.is_empty() {
            let message = format!("placeholders not used in template {}: {}", template.name, unused.join(", "));
            warn!("{}: {}", email, message);
            warnings.push(message);
        }

        render_email(&self.settings, email, &template, &placeholders)
    }

    fn write(&self, email: &Email, locale: &str, rendered: &RenderedEmail, outcome: Outcome) -> Outcome {
        match save_rendered(&self.settings, &email.name, locale, rendered) {
            Ok(_) => outcome,
            Err(error) => Outcome::Failed {
                reason: error.to_string(),
            },
        }
    }

    fn fallback(&self, email: &Email, error: &EmailError, warnings: &mut Vec<String>) -> Outcome {
        let default_locale = self.settings.default_locale.as_str();
        if email.locale == default_locale {
            warn!("Email {} failed: {}", email, error);
            return Outcome::Failed {
                reason: error.to_string(),
            };
        }

        debug!("Email {} failed ({}), trying {}", email, error, default_locale);
        let default_email = match discovery::email(&self.settings, &email.name, default_locale) {
            Ok(Some(default_email)) => default_email,
            Ok(None) => {
                return Outcome::Failed {
                    reason: format!("{error}; no {default_locale} version to fall back to"),
                };
            }
            Err(lookup_error) => {
                return Outcome::Failed {
                    reason: format!("{error}; fallback lookup failed: {lookup_error}"),
                };
            }
        };

        match self.prepare(&default_email, warnings) {
            Ok(rendered) => {
                warn!("Email {}/{} substituted by {}/{}", email.locale, email.name, default_locale, email.name);
                self.write(email, &email.locale, &rendered, Outcome::Substituted {
                    from: default_locale.to_string(),
                    reason: error.to_string(),
                })
            }
            Err(fallback_error) => Outcome::Failed {
                reason: format!("{error}; fallback to {default_locale} failed: {fallback_error}"),
            },
        }
    }
}
