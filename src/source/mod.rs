//! Email sources: reading, global placeholder lookup and serialization.
//!
//! [`read_email`] is the full read of one email: parse its source document,
//! resolve the template it references, and merge in the locale's global
//! placeholders that the template declares.

mod reader;
pub mod writer;

pub use reader::{EmailSource, parse_source};
pub use writer::create_email_content;

use std::path::Path;
use tracing::debug;

use crate::config::Settings;
use crate::constants::GLOBAL_PLACEHOLDER_PREFIX;
use crate::core::{EmailError, Result};
use crate::models::{Email, Placeholder, Placeholders, Template};
use crate::placeholders::merge_globals;
use crate::templating::resolve_template;
use crate::utils::fs::discovery;

/// Read and parse the source document at `path`.
///
/// # Errors
///
/// Returns [`EmailError::FileRead`] if the file cannot be read, or any parse
/// error from [`parse_source`].
pub fn read_source(path: &Path) -> Result<EmailSource> {
    let xml = std::fs::read_to_string(path).map_err(|source| EmailError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source(&xml, &path.display().to_string())
}

/// Global placeholders of `locale`, keyed by effective (prefixed) name.
///
/// A locale without a global source has no globals.
///
/// # Errors
///
/// Returns the read error when the global source exists but cannot be parsed.
pub fn read_globals(settings: &Settings, locale: &str) -> Result<Placeholders> {
    let global = discovery::global_email(settings, locale);
    if !global.path.is_file() {
        debug!("No global placeholders for locale {}", locale);
        return Ok(Placeholders::new());
    }

    let source = read_source(&global.path)?;
    Ok(source
        .placeholders
        .into_values()
        .map(|placeholder| {
            let name = format!("{GLOBAL_PLACEHOLDER_PREFIX}{}", placeholder.name);
            Placeholder {
                name,
                ..placeholder
            }
            .global()
        })
        .map(|placeholder| (placeholder.name.clone(), placeholder))
        .collect())
}

/// Read an email into its template and merged placeholder set.
///
/// # Errors
///
/// - [`EmailError::MissingTemplateAttribute`] when the source names no template
/// - any read, parse or template resolution error
pub fn read_email(settings: &Settings, email: &Email) -> Result<(Template, Placeholders)> {
    debug!("Reading email {} from {}", email, email.path.display());
    let source = read_source(&email.path)?;
    let template_name = source.template.ok_or_else(|| EmailError::MissingTemplateAttribute {
        origin: email.path.display().to_string(),
    })?;

    let template = resolve_template(settings, &template_name, &source.styles, source.email_type)?;
    let globals = read_globals(settings, &email.locale)?;
    let placeholders = merge_globals(source.placeholders, globals, &template);

    Ok((template, placeholders))
}
