//! Render every discovered email.

use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use super::CliConfig;
use crate::config::Settings;
use crate::pipeline::run_batch;
use crate::utils::progress::MarkerProgress;
use crate::validator::ExpectedCountsCache;

/// Command-line overrides of the loaded [`Settings`].
#[derive(Args, Debug, Default)]
pub struct RenderCommand {
    /// Directory holding the email sources
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Directory receiving rendered files
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Directory holding HTML templates and style sheets
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Base URL of relative image targets
    #[arg(short, long)]
    images: Option<String>,

    /// Comma-separated right-to-left locales
    #[arg(long, value_delimiter = ',')]
    rtl: Option<Vec<String>>,

    /// Discovery pattern, containing {locale} and {name}
    #[arg(short, long)]
    pattern: Option<String>,

    /// Fail when the template references a placeholder with no content
    #[arg(long, overrides_with = "no_strict")]
    strict: bool,

    /// Render missing placeholders as empty strings
    #[arg(long, overrides_with = "strict")]
    no_strict: bool,

    /// Render emails that fail placeholder validation
    #[arg(short, long)]
    force: bool,

    /// Number of concurrent render workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Locale borrowed from when an email fails
    #[arg(long)]
    default_locale: Option<String>,

    /// Only render sources matching this glob (relative to the source directory)
    #[arg(short, long)]
    exclusive: Option<String>,

    /// Variant selected for placeholders that define it
    #[arg(long)]
    variant: Option<String>,
}

impl RenderCommand {
    /// Apply the flags on top of `settings`.
    pub fn apply(self, mut settings: Settings) -> Settings {
        if let Some(source) = self.source {
            settings.source = source;
        }
        if let Some(destination) = self.destination {
            settings.destination = destination;
        }
        if let Some(templates) = self.templates {
            settings.templates = templates;
        }
        if let Some(images) = self.images {
            settings.images = images;
        }
        if let Some(rtl) = self.rtl {
            settings.rtl = rtl;
        }
        if let Some(pattern) = self.pattern {
            settings.pattern = pattern;
        }
        if self.strict {
            settings.strict = true;
        }
        if self.no_strict {
            settings.strict = false;
        }
        if self.force {
            settings.force = true;
        }
        if let Some(workers) = self.workers {
            settings.workers = workers;
        }
        if let Some(default_locale) = self.default_locale {
            settings.default_locale = default_locale;
        }
        if self.exclusive.is_some() {
            settings.exclusive = self.exclusive;
        }
        if self.variant.is_some() {
            settings.variant = self.variant;
        }
        settings
    }

    /// Render the batch and print the report.
    ///
    /// # Errors
    ///
    /// Returns configuration errors, and an error when any email failed.
    pub async fn execute(self, settings: Settings, config: &CliConfig) -> Result<()> {
        let settings = self.apply(settings);
        settings.validate()?;

        let settings = Arc::new(settings);
        let expected = Arc::new(ExpectedCountsCache::new(settings.placeholders_filepath()));
        let progress = if config.quiet {
            MarkerProgress::hidden()
        } else {
            MarkerProgress::new(0, !config.no_progress)
        };

        let report = run_batch(settings, expected, &progress).await?;
        if !config.quiet {
            report.print();
        }

        if !report.success() {
            bail!("{} of {} emails failed to render", report.failed_count(), report.items.len());
        }
        Ok(())
    }
}
