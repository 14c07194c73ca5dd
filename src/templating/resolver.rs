//! Template lookup and placeholder declaration scanning.
//!
//! Templates live under `<templates>/<email_type>/<name>`. Style sheets are
//! looked up next to the template first and then in the templates root.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::constants::BASE_URL;
use crate::core::{EmailError, Result};
use crate::models::{EmailType, MetaPlaceholder, PlaceholderType, Template};

pub(super) static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("token regex is valid"));

/// Resolve the template `name` declared by an email source.
///
/// With a declared `email_type` the template is loaded from that type's
/// directory. Without one every [`EmailType`] is probed in order, then the
/// templates root itself.
///
/// # Errors
///
/// - [`EmailError::TemplateNotFound`] when no candidate file exists
/// - [`EmailError::FileRead`] when a declared style sheet cannot be read
/// - [`EmailError::UnknownPlaceholderType`] for an extended token with an unknown type
pub fn resolve_template(
    settings: &Settings,
    name: &str,
    style_files: &[String],
    email_type: Option<EmailType>,
) -> Result<Template> {
    let root = settings.templates_dir();
    let (path, content) = match email_type {
        Some(email_type) => {
            let path = root.join(email_type.as_str()).join(name);
            let content = read_template(&path).ok_or_else(|| EmailError::TemplateNotFound {
                name: name.to_string(),
                searched: path.display().to_string(),
            })?;
            (path, content)
        }
        None => {
            warn!("Email type is not declared for template {}, probing all types", name);
            probe_template(&root, name)?
        }
    };
    debug!("Resolved template {} to {}", name, path.display());

    let template_dir = path.parent().unwrap_or(&root);
    let styles = read_styles(&root, template_dir, style_files)?;
    let placeholders = extract_placeholders(&content)?;

    Ok(Template {
        name: name.to_string(),
        style_files: style_files.to_vec(),
        styles,
        content,
        placeholders,
        email_type,
    })
}

fn read_template(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

fn probe_template(root: &Path, name: &str) -> Result<(PathBuf, String)> {
    let candidates: Vec<PathBuf> = EmailType::ALL
        .iter()
        .map(|email_type| root.join(email_type.as_str()).join(name))
        .chain(std::iter::once(root.join(name)))
        .collect();

    for candidate in &candidates {
        if let Some(content) = read_template(candidate) {
            return Ok((candidate.clone(), content));
        }
    }

    Err(EmailError::TemplateNotFound {
        name: name.to_string(),
        searched: candidates.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "),
    })
}

/// Each style sheet wrapped in its own `<style>` tag, in declaration order.
fn read_styles(root: &Path, template_dir: &Path, style_files: &[String]) -> Result<String> {
    let mut styles = String::new();
    for style in style_files {
        let local = template_dir.join(style);
        let path = if local.is_file() {
            local
        } else {
            root.join(style)
        };
        let css = std::fs::read_to_string(&path).map_err(|source| EmailError::FileRead {
            path: path.clone(),
            source,
        })?;
        styles.push_str("<style>");
        styles.push_str(&css);
        styles.push_str("</style>");
    }
    Ok(styles)
}

/// Declared placeholders of `markup` in first-occurrence order.
///
/// `base_url` is injected by the renderer and never declared.
///
/// # Errors
///
/// Returns [`EmailError::UnknownPlaceholderType`] for an extended token whose
/// type is outside the closed set.
pub fn extract_placeholders(markup: &str) -> Result<Vec<MetaPlaceholder>> {
    let mut placeholders: Vec<MetaPlaceholder> = Vec::new();
    for caps in TOKEN_RE.captures_iter(markup) {
        let placeholder = parse_token(&caps[1])?;
        if placeholder.name == BASE_URL || placeholders.iter().any(|p| p.name == placeholder.name) {
            continue;
        }
        placeholders.push(placeholder);
    }
    Ok(placeholders)
}

/// Parse the inside of a `{{...}}` token.
///
/// `name` is a bare text placeholder; `type:name:key=value;key=value` is an
/// extended declaration.
fn parse_token(token: &str) -> Result<MetaPlaceholder> {
    let token = token.trim();
    let mut parts = token.splitn(3, ':');
    let (Some(first), Some(name)) = (parts.next(), parts.next()) else {
        return Ok(MetaPlaceholder::text(token));
    };

    let kind = PlaceholderType::parse(name, first.trim())?;
    let attributes: BTreeMap<String, String> = parts
        .next()
        .map(|attrs| {
            attrs
                .split(';')
                .filter_map(|pair| pair.split_once('='))
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .collect()
        })
        .unwrap_or_default();

    Ok(MetaPlaceholder {
        name: name.trim().to_string(),
        kind,
        attributes,
    })
}

/// Rewrite extended tokens to bare `{{name}}` tokens.
pub fn rewrite_extended_tokens(markup: &str) -> String {
    TOKEN_RE
        .replace_all(markup, |caps: &Captures<'_>| {
            let token = caps[1].trim();
            match token.split(':').nth(1) {
                Some(name) => format!("{{{{{}}}}}", name.trim()),
                None => format!("{{{{{token}}}}}"),
            }
        })
        .into_owned()
}
