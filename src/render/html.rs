//! HTML body rendering.
//!
//! Every non-subject placeholder is converted into an HTML fragment according
//! to its [`PlaceholderType`], the fragments are substituted into the template
//! body, and right-to-left locales get `dir="rtl"` on the first element.

use lol_html::{RewriteStrSettings, element, rewrite_str};
use std::cell::Cell;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::RenderContext;
use super::css::inline_css;
use crate::constants::{BASE_URL, LINK_LOCALE_MARKER, SUBJECT, SUBJECT_PLACEHOLDERS};
use crate::core::{EmailError, Result};
use crate::markdown::{escape_attribute, is_absolute_url, join_url, to_html};
use crate::models::{Placeholder, PlaceholderType, Placeholders, Template};
use crate::templating::{MissingPolicy, TemplateRenderer};

/// Render the HTML body of one email.
///
/// `subject` is injected as the reserved `subject` variable.
///
/// # Errors
///
/// Returns [`EmailError::Rendering`] when substitution fails, most commonly a
/// strict-mode placeholder without a value.
pub fn render_html(
    ctx: &RenderContext<'_>,
    template: &Template,
    placeholders: &Placeholders,
    subject: &str,
) -> Result<String> {
    let mut values: BTreeMap<String, String> = placeholders
        .values()
        .filter(|placeholder| !SUBJECT_PLACEHOLDERS.contains(&placeholder.name.as_str()))
        .map(|placeholder| (placeholder.name.clone(), render_fragment(ctx, template, placeholder)))
        .collect();
    values.insert(SUBJECT.to_string(), subject.to_string());
    values.insert(BASE_URL.to_string(), ctx.settings.images.clone());

    let renderer = TemplateRenderer::new(MissingPolicy::from_strict(ctx.settings.strict));
    let html = renderer.render(&template.name, &template.content, &values).map_err(|source| {
        EmailError::Rendering {
            template: template.name.clone(),
            locale: ctx.locale.to_string(),
            source,
        }
    })?;

    if ctx.settings.is_rtl(ctx.locale) {
        debug!("Marking {} as right-to-left", ctx.locale);
        Ok(mark_rtl(&html))
    } else {
        Ok(html)
    }
}

/// HTML fragment substituted for one placeholder.
fn render_fragment(ctx: &RenderContext<'_>, template: &Template, placeholder: &Placeholder) -> String {
    let base_url = ctx.settings.images.as_str();

    let content = placeholder.get_content(ctx.variant);
    if placeholder.kind != PlaceholderType::Bitmap && content.trim().is_empty() {
        return content.to_string();
    }
    let content = content.replace(LINK_LOCALE_MARKER, ctx.settings.link_locale(ctx.locale));

    match placeholder.kind {
        PlaceholderType::Text => inline_css(&to_html(&content, Some(base_url)), &template.styles),
        PlaceholderType::Attribute => content.trim().to_string(),
        PlaceholderType::Raw => content,
        PlaceholderType::Image => {
            let markdown = format!("![{}]({})", placeholder.name, content.trim());
            inline_css(&to_html(&markdown, Some(base_url)), &template.styles)
        }
        PlaceholderType::Bitmap => inline_css(&bitmap_tag(placeholder, base_url), &template.styles),
    }
}

/// `<img>` element built from a bitmap placeholder's attributes.
fn bitmap_tag(placeholder: &Placeholder, base_url: &str) -> String {
    let attributes: Vec<String> = placeholder
        .attributes
        .iter()
        .map(|(key, value)| {
            let value = if key == "src" && !value.is_empty() && !is_absolute_url(value) {
                join_url(base_url, value)
            } else {
                value.clone()
            };
            format!("{key}=\"{}\"", escape_attribute(&value))
        })
        .collect();

    if attributes.is_empty() {
        "<img />".to_string()
    } else {
        format!("<img {} />", attributes.join(" "))
    }
}

/// Set `dir="rtl"` on the first element of `html`.
fn mark_rtl(html: &str) -> String {
    let marked = Cell::new(false);
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                if !marked.get() {
                    marked.set(true);
                    el.set_attribute("dir", "rtl")?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    );

    match result {
        Ok(marked_html) => marked_html,
        Err(e) => {
            warn!("Failed to mark HTML as right-to-left: {}", e);
            html.to_string()
        }
    }
}
