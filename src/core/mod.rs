//! Core types for the email parser
//!
//! This module holds the error system shared by every other module:
//!
//! - [`EmailError`] - enumerated failure modes of reading, rendering and validating emails
//! - [`ErrorContext`] - user-friendly wrapper with details and suggestions for the CLI
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! Library operations return [`Result`], an alias over [`EmailError`], so callers can
//! match on the variant to decide between locale fallback and aborting the process.

pub mod error;

pub use error::{EmailError, ErrorContext, user_friendly_error};

/// Result alias used by every library operation.
pub type Result<T, E = EmailError> = std::result::Result<T, E>;
