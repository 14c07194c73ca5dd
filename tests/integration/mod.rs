//! Integration test suite for the email parser
//!
//! End-to-end tests over throwaway projects built with
//! [`email_parser::test_utils::TestProject`].
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **batch**: batch rendering, output layout, exclusive filter, RTL and variants
//! - **cli**: the `email-parser` binary
//! - **fallback**: default-locale substitution and forced validation
//! - **service**: the programmatic [`email_parser::service::EmailService`]
//! - **source**: source serialization read back through the reader

mod batch;
mod cli;
mod fallback;
mod service;
mod source;
