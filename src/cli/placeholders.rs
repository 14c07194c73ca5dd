//! Regenerate the expected placeholder count file.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

use crate::config::Settings;
use crate::service::EmailService;

/// Count placeholder tokens of every default-locale email and write them to
/// `placeholders_config.json` in the source directory.
#[derive(Args, Debug, Default)]
pub struct PlaceholdersCommand {
    /// Locale the counts are taken from (default: the configured default locale)
    #[arg(long)]
    default_locale: Option<String>,
}

impl PlaceholdersCommand {
    /// # Errors
    ///
    /// Returns read errors of default-locale emails and write errors.
    pub async fn execute(self, settings: Arc<Settings>) -> Result<()> {
        let settings = match self.default_locale {
            Some(default_locale) => Arc::new(Settings {
                default_locale,
                ..(*settings).clone()
            }),
            None => settings,
        };
        let locale = settings.default_locale.clone();
        let service = EmailService::new(settings);

        let written = tokio::task::spawn_blocking(move || service.regenerate_placeholders())
            .await
            .context("Placeholder generation task failed")??;

        match written {
            Some(path) => println!("{} {}", "Wrote".green().bold(), path.display()),
            None => println!("{}", format!("No emails found for locale {locale}, nothing written").yellow()),
        }
        Ok(())
    }
}
