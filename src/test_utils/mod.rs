//! Test utilities for email parser tests
//!
//! This module provides shared helpers for unit tests and the integration
//! suite. It is only compiled for tests or with the `test-utils` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use email_parser::test_utils::{SourceFixture, TestProject};
//!
//! # fn main() -> anyhow::Result<()> {
//! let project = TestProject::with_basic_template()?;
//! project.add_source(&SourceFixture::basic("en", "welcome", &[("subject", "Hi"), ("title", "Hello")]))?;
//! # Ok(())
//! # }
//! ```

pub mod environment;
pub mod fixtures;

pub use environment::TestProject;
pub use fixtures::{SourceFixture, TemplateFixture};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
