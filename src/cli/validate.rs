//! Validate every discovered email without rendering.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

use crate::config::Settings;
use crate::core::Result as EmailResult;
use crate::models::Email;
use crate::source::read_email;
use crate::utils::fs::discovery;
use crate::validator::{ExpectedCountsCache, ValidationReport, validate_placeholders};

/// Read every email and compare its placeholder tokens with the expected counts.
#[derive(Args, Debug, Default)]
pub struct ValidateCommand {
    /// Only validate sources matching this glob (relative to the source directory)
    #[arg(short, long)]
    exclusive: Option<String>,
}

impl ValidateCommand {
    /// # Errors
    ///
    /// Returns configuration errors, and an error when any email is invalid or
    /// unreadable.
    pub async fn execute(self, settings: Arc<Settings>) -> Result<()> {
        let settings = match self.exclusive {
            Some(exclusive) => Arc::new(Settings {
                exclusive: Some(exclusive),
                ..(*settings).clone()
            }),
            None => settings,
        };
        settings.validate()?;

        let results = tokio::task::spawn_blocking(move || validate_all(&settings))
            .await
            .context("Validation task failed")??;

        let mut failures = 0;
        for (email, result) in &results {
            match result {
                Ok(report) if report.valid => println!("{} {}", "✓".green(), email),
                Ok(report) => {
                    failures += 1;
                    println!("{} {}: {}", "✗".red(), email, report.summary());
                }
                Err(reason) => {
                    failures += 1;
                    println!("{} {}: {}", "✗".red(), email, reason);
                }
            }
        }

        if failures > 0 {
            bail!("{} of {} emails failed validation", failures, results.len());
        }
        println!("{}", format!("All {} emails are valid", results.len()).green().bold());
        Ok(())
    }
}

type EmailValidation = (Email, Result<ValidationReport, String>);

fn validate_all(settings: &Settings) -> EmailResult<Vec<EmailValidation>> {
    let expected = ExpectedCountsCache::new(settings.placeholders_filepath());
    let table = expected.get()?;

    Ok(discovery::batch_emails(settings)?
        .into_iter()
        .map(|email| {
            let result = read_email(settings, &email)
                .map(|(_, placeholders)| {
                    validate_placeholders(&email.name, &email.locale, &placeholders, table.as_deref())
                })
                .map_err(|e| e.to_string());
            (email, result)
        })
        .collect())
}
