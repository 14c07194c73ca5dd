//! The immutable settings value threaded through every operation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::parser::parse_config;
use crate::constants::{CONFIG_FILENAME, FALLBACK_CORE_COUNT, PLACEHOLDERS_FILENAME};
use crate::core::{EmailError, Result};
use crate::pattern::EmailPattern;

const DEFAULT_SOURCE: &str = "src";
const DEFAULT_DESTINATION: &str = "target";
const DEFAULT_TEMPLATES: &str = "templates_html";
const DEFAULT_PATTERN: &str = "{locale}/{name}.xml";
const DEFAULT_IMAGES: &str = "http://app.getkeepsafe.com/emails/img";
const DEFAULT_LOCALE: &str = "en";

/// Project configuration.
///
/// Directory fields are relative to [`Settings::root`] unless absolute. Every
/// field has a default, so an empty configuration file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Project root every relative directory is resolved against.
    #[serde(skip)]
    pub root: PathBuf,

    /// Directory holding the email sources.
    pub source: PathBuf,

    /// Directory receiving rendered artifacts.
    pub destination: PathBuf,

    /// Directory holding HTML templates and style sheets.
    pub templates: PathBuf,

    /// Discovery pattern relative to the source directory.
    ///
    /// Must contain both `{name}` and `{locale}`.
    pub pattern: String,

    /// Base URL prepended to relative image targets.
    pub images: String,

    /// Locales rendered right-to-left.
    pub rtl: Vec<String>,

    /// Locale aliases applied before RTL and link-locale lookups.
    pub locale_aliases: BTreeMap<String, String>,

    /// Replacement values for the `{link_locale}` marker, keyed by normalized locale.
    pub link_locale_mappings: BTreeMap<String, String>,

    /// Locale borrowed from when a locale fails to validate or render.
    pub default_locale: String,

    /// Fail rendering when the template references a placeholder with no content.
    pub strict: bool,

    /// Render even when placeholder validation fails.
    pub force: bool,

    /// Size of the batch worker pool.
    pub workers: usize,

    /// Glob (relative to the source directory) restricting a batch to a subset.
    pub exclusive: Option<String>,

    /// Variant selected for every placeholder that defines it.
    pub variant: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            source: PathBuf::from(DEFAULT_SOURCE),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            templates: PathBuf::from(DEFAULT_TEMPLATES),
            pattern: DEFAULT_PATTERN.to_string(),
            images: DEFAULT_IMAGES.to_string(),
            rtl: vec!["ar".to_string(), "he".to_string()],
            locale_aliases: BTreeMap::from([
                ("pt-BR".to_string(), "pt".to_string()),
                ("zh-TW-Hant".to_string(), "zh-TW".to_string()),
            ]),
            link_locale_mappings: BTreeMap::new(),
            default_locale: DEFAULT_LOCALE.to_string(),
            strict: true,
            force: false,
            workers: default_workers(),
            exclusive: None,
            variant: None,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map(std::num::NonZero::get).unwrap_or(FALLBACK_CORE_COUNT)
}

impl Settings {
    /// Default settings rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load settings for the project at `root`.
    ///
    /// An explicit `config` path must exist. Without one, `email-parser.toml` in
    /// the project root is used when present and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::FileRead`] or [`EmailError::ConfigParse`] when the
    /// configuration file cannot be loaded.
    pub fn load(root: &Path, config: Option<&Path>) -> Result<Self> {
        let path = match config {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let candidate = root.join(CONFIG_FILENAME);
                candidate.is_file().then_some(candidate)
            }
        };

        let mut settings = match path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                parse_config::<Self>(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };
        settings.root = root.to_path_buf();
        Ok(settings)
    }

    /// Check the settings for configuration errors.
    ///
    /// # Errors
    ///
    /// - [`EmailError::MissingPatternParam`] when the pattern lacks `{name}` or `{locale}`
    /// - [`EmailError::InvalidSetting`] for a zero worker count or an empty default locale
    pub fn validate(&self) -> Result<()> {
        EmailPattern::new(&self.pattern)?;

        if self.workers == 0 {
            return Err(EmailError::InvalidSetting {
                key: "workers".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.default_locale.trim().is_empty() {
            return Err(EmailError::InvalidSetting {
                key: "default_locale".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        }
    }

    /// Absolute-or-root-relative source directory.
    pub fn source_dir(&self) -> PathBuf {
        self.resolve(&self.source)
    }

    /// Absolute-or-root-relative destination directory.
    pub fn destination_dir(&self) -> PathBuf {
        self.resolve(&self.destination)
    }

    /// Absolute-or-root-relative templates directory.
    pub fn templates_dir(&self) -> PathBuf {
        self.resolve(&self.templates)
    }

    /// Location of the expected placeholder count file.
    pub fn placeholders_filepath(&self) -> PathBuf {
        self.source_dir().join(PLACEHOLDERS_FILENAME)
    }

    /// Apply the locale alias table.
    pub fn normalize_locale<'a>(&'a self, locale: &'a str) -> &'a str {
        self.locale_aliases.get(locale).map_or(locale, String::as_str)
    }

    /// Whether `locale` renders right-to-left.
    pub fn is_rtl(&self, locale: &str) -> bool {
        let normalized = self.normalize_locale(locale);
        self.rtl.iter().any(|rtl| rtl == normalized)
    }

    /// Value substituted for the `{link_locale}` marker.
    pub fn link_locale<'a>(&'a self, locale: &'a str) -> &'a str {
        let normalized = self.normalize_locale(locale);
        self.link_locale_mappings.get(normalized).map_or(normalized, String::as_str)
    }
}
