//! Error handling for the email parser
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`EmailError`]) for the library, so callers can
//!    tell recoverable per-email failures from fatal configuration problems
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    for CLI users
//!
//! # Error Categories
//!
//! - **Configuration**: [`EmailError::MissingPatternParam`], [`EmailError::InvalidSetting`].
//!   Fatal at startup, never recovered.
//! - **Source reading**: [`EmailError::SourceParse`], [`EmailError::UnknownPlaceholderType`], ...
//!   Recovered by the orchestrator through default-locale fallback.
//! - **Rendering**: [`EmailError::MissingSubject`], [`EmailError::Rendering`].
//! - **Validation**: [`EmailError::Validation`].
//!
//! Library operations return `Result<T, EmailError>`; only the CLI and the batch
//! boundary work with [`anyhow::Error`], converting it back into an
//! [`ErrorContext`] through [`user_friendly_error`] before display.

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::templating::TemplateError;

/// Enumerated error type for every failure the email parser can report.
#[derive(Error, Debug)]
pub enum EmailError {
    /// The discovery pattern lacks a required `{name}` or `{locale}` parameter.
    #[error("{{{param}}} is a required parameter in the pattern but it is not present in {pattern}")]
    MissingPatternParam {
        /// Missing parameter (`name` or `locale`)
        param: String,
        /// Offending pattern
        pattern: String,
    },

    /// A configuration value is unusable.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting {
        /// Setting name
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// The configuration file could not be parsed.
    #[error("Invalid configuration file {path}: {reason}")]
    ConfigParse {
        /// Configuration file path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A file could not be read.
    #[error("Failed to read {path}")]
    FileRead {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written.
    #[error("Failed to write {path}")]
    FileWrite {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An email source is not well-formed XML.
    #[error("Malformed source {origin} at line {line}, column {column}{}: {message}", element_suffix(.element))]
    SourceParse {
        /// Path or label of the source document
        origin: String,
        /// 1-based line of the failure
        line: u32,
        /// 1-based column of the failure
        column: u32,
        /// Name of the nearest `string`-like element preceding the failure
        element: Option<String>,
        /// Parser message
        message: String,
    },

    /// An email source is well-formed but structurally invalid.
    #[error("Invalid source {origin}: {reason}")]
    InvalidSource {
        /// Path or label of the source document
        origin: String,
        /// What is wrong
        reason: String,
    },

    /// The source root lacks the mandatory `template` attribute.
    #[error("Source {origin} does not declare a template")]
    MissingTemplateAttribute {
        /// Path or label of the source document
        origin: String,
    },

    /// A placeholder declares a type outside the closed set.
    #[error("Unknown placeholder type '{value}' for '{name}'")]
    UnknownPlaceholderType {
        /// Placeholder name
        name: String,
        /// Rejected type value
        value: String,
    },

    /// A source declares an email type outside the closed set.
    #[error("Unknown email type '{value}'")]
    UnknownEmailType {
        /// Rejected type value
        value: String,
    },

    /// No template markup exists for the requested name.
    #[error("Template '{name}' not found (looked in: {searched})")]
    TemplateNotFound {
        /// Template file name
        name: String,
        /// Directories that were probed
        searched: String,
    },

    /// The email has no usable `subject` placeholder.
    #[error("Subject is required for every email ({email}/{locale})")]
    MissingSubject {
        /// Email name
        email: String,
        /// Email locale
        locale: String,
    },

    /// The HTML body could not be assembled.
    #[error("Failed to generate html content for template {template} in locale {locale}: {source}")]
    Rendering {
        /// Template name
        template: String,
        /// Locale being rendered
        locale: String,
        /// Structured substitution failure
        #[source]
        source: TemplateError,
    },

    /// Placeholder counts do not match the expected-count table.
    #[error("Placeholder validation failed for {email}/{locale}: {summary}")]
    Validation {
        /// Email name
        email: String,
        /// Email locale
        locale: String,
        /// Human-readable mismatch summary
        summary: String,
    },

    /// The expected placeholder count file is unreadable.
    #[error("Invalid placeholder count file {path}: {reason}")]
    PlaceholdersFile {
        /// File path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Source serialization failed.
    #[error("Failed to serialize email source: {reason}")]
    Serialize {
        /// Writer message
        reason: String,
    },

    /// No source exists for the requested email.
    #[error("Email '{name}' not found for locale '{locale}'")]
    EmailNotFound {
        /// Email name
        name: String,
        /// Requested locale
        locale: String,
    },

    /// I/O error without more specific context.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

fn element_suffix(element: &Option<String>) -> String {
    element.as_ref().map(|name| format!(" (inside '{name}')")).unwrap_or_default()
}

impl EmailError {
    /// Whether this error is a configuration problem that must abort the process.
    ///
    /// Everything else is a per-email failure handled by the orchestrator.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingPatternParam { .. }
                | Self::InvalidSetting { .. }
                | Self::ConfigParse { .. }
        )
    }
}

/// Error wrapper carrying user-facing details and suggestions.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: EmailError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: EmailError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Known [`EmailError`] variants get tailored suggestions; anything else is
/// wrapped with its full cause chain as details.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<ErrorContext>() {
        Ok(context) => return context,
        Err(error) => error,
    };

    match error.downcast::<EmailError>() {
        Ok(email_error) => create_error_context(email_error),
        Err(error) => {
            let mut chain = error.chain();
            let message = chain.next().map(ToString::to_string).unwrap_or_default();
            let causes: Vec<String> = chain.map(ToString::to_string).collect();
            let context = ErrorContext::new(EmailError::Other {
                message,
            });
            if causes.is_empty() {
                context
            } else {
                context.with_details(causes.join("\n  caused by: "))
            }
        }
    }
}

fn create_error_context(error: EmailError) -> ErrorContext {
    match &error {
        EmailError::MissingPatternParam {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use a pattern containing both {locale} and {name}, e.g. '{locale}/{name}.xml'")
            .with_details("The pattern is used to discover email sources and to derive their name and locale"),
        EmailError::ConfigParse {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax of the configuration file"),
        EmailError::TemplateNotFound {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Declare email_type=\"marketing|transactional\" on the source and check --templates",
        ),
        EmailError::PlaceholdersFile {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Regenerate the file with 'email-parser placeholders'"),
        EmailError::FileRead {
            path,
            ..
        } => {
            let details = format!("Path: {}", path.display());
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check that the file exists and is readable")
        }
        _ => ErrorContext::new(error),
    }
}
