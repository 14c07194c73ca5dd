//! Command-line interface for the email parser.
//!
//! # Available Commands
//!
//! - `render` - render every discovered email (the default when no command is given)
//! - `placeholders` - regenerate the expected placeholder count file
//! - `validate` - check every email against the expected counts without rendering
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--no-progress` - Print plain markers instead of a progress bar
//! - `--config` - Path to a configuration file (default: `email-parser.toml` in the root)
//! - `--root` - Project root every relative directory is resolved against
//!
//! # Example
//!
//! ```bash
//! # Render everything with the project configuration
//! email-parser
//!
//! # Render only French emails, borrowing from German when they fail
//! email-parser render --exclusive 'fr/*' --default-locale de
//!
//! # Refresh the expected placeholder counts after editing English sources
//! email-parser placeholders
//! ```

mod placeholders;
mod render;
mod validate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

pub use placeholders::PlaceholdersCommand;
pub use render::RenderCommand;
pub use validate::ValidateCommand;

/// Runtime options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter applied when `RUST_LOG` is not set; `None` keeps logging off.
    pub log_level: Option<String>,

    /// Print plain markers instead of a progress bar.
    pub no_progress: bool,

    /// Print neither progress nor the batch report.
    pub quiet: bool,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over [`log_level`](Self::log_level). Calling
    /// this more than once is harmless.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = &self.log_level {
            EnvFilter::new(level)
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Render localized email sources into subject, text and HTML files.
#[derive(Parser)]
#[command(name = "email-parser", version, about, long_about = None)]
pub struct Cli {
    /// Command to run; `render` when omitted.
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print plain progress markers instead of a progress bar.
    #[arg(long, global = true)]
    no_progress: bool,

    /// Configuration file (default: email-parser.toml in the project root).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every discovered email
    Render(RenderCommand),

    /// Regenerate the expected placeholder count file from the default locale
    Placeholders(PlaceholdersCommand),

    /// Validate every discovered email without rendering
    Validate(ValidateCommand),
}

impl Cli {
    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Returns configuration errors, and a summary error when any email failed.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            quiet: self.quiet,
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let settings = Settings::load(&self.root, self.config.as_deref())
            .with_context(|| format!("Failed to load settings for {}", self.root.display()))?;

        match self.command.unwrap_or_default() {
            Commands::Render(cmd) => cmd.execute(settings, &config).await,
            Commands::Placeholders(cmd) => cmd.execute(Arc::new(settings)).await,
            Commands::Validate(cmd) => cmd.execute(Arc::new(settings)).await,
        }
    }
}

impl Default for Commands {
    fn default() -> Self {
        Self::Render(RenderCommand::default())
    }
}
