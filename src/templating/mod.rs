//! HTML templates for emails.
//!
//! - [`resolve_template`] finds a template's markup and style sheets and scans
//!   the placeholders it declares
//! - [`TemplateRenderer`] substitutes rendered placeholder fragments into the
//!   template body with Tera
//!
//! # Placeholder tokens
//!
//! - `{{name}}` declares a text placeholder
//! - `{{type:name:key=value;key=value}}` declares a typed placeholder with
//!   attributes; it is rewritten to `{{name}}` before substitution
//! - `{{subject}}` and `{{base_url}}` are injected by the renderer

mod error;
mod renderer;
mod resolver;

pub use error::{ErrorLocation, TemplateError};
pub use renderer::{MissingPolicy, TemplateRenderer};
pub use resolver::{extract_placeholders, resolve_template, rewrite_extended_tokens};
