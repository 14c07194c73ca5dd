//! Email Parser - localized email rendering
//!
//! Renders per-locale email sources into the three artifacts a sending system
//! needs: a subject line, a plain-text body and an HTML body.
//!
//! # Architecture Overview
//!
//! - Authors write one XML source per email and locale holding named
//!   placeholders (markdown text, attributes, raw HTML, images, bitmaps)
//! - Each source names an HTML template whose `{{name}}` slots consume the
//!   placeholders; style sheets declared next to it are inlined into the HTML
//! - A per-locale `global.xml` supplies shared placeholders (`global_<name>`)
//! - Every translation is checked against the `{{token}}` counts of the default
//!   locale; an email that fails to validate or render is replaced by its
//!   default-locale version
//!
//! # Core Modules
//!
//! - [`config`] - the immutable [`config::Settings`] value
//! - [`source`] - reading and writing email sources, global placeholder lookup
//! - [`templating`] - template resolution and slot substitution
//! - [`markdown`] - markdown to HTML and to plain text
//! - [`render`] - subject, text and HTML renderers plus CSS inlining
//! - [`validator`] - placeholder count validation and the expected-count file
//! - [`pipeline`] - per-email lifecycle with locale fallback, batch fan-out
//! - [`service`] - single-email operations for editors and tools
//! - [`cli`] - the `email-parser` command line
//!
//! # Example
//!
//! ```rust,no_run
//! use email_parser::config::Settings;
//! use email_parser::service::EmailService;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let settings = Settings::load(std::path::Path::new("."), None)?;
//! let service = EmailService::new(Arc::new(settings));
//! if let Some(email) = service.render_email("en", "welcome")? {
//!     println!("{}", email.subjects.subject);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod markdown;
pub mod models;
pub mod pattern;
pub mod pipeline;
pub mod placeholders;
pub mod render;
pub mod service;
pub mod source;
pub mod templating;
pub mod utils;
pub mod validator;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
