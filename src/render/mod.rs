//! Rendering of one email into its subject lines, text body and HTML body.
//!
//! The three renderers are independent; [`render_email`] runs them in order
//! so a missing subject fails fast before any markup work is done.
//!
//! ```text
//! Placeholders ──┬── render_subject ──> Subjects
//!                ├── render_text ─────> text body
//!                └── render_html ─────> html body (CSS inlined, RTL marked)
//! ```

mod css;
mod html;
mod subject;
mod text;

pub use css::{CssRule, inline_css, parse_styles};
pub use html::render_html;
pub use subject::render_subject;
pub use text::render_text;

use tracing::debug;

use crate::config::Settings;
use crate::core::Result;
use crate::models::{Email, Placeholders, RenderedEmail, Template};

/// Per-call rendering parameters.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub settings: &'a Settings,
    /// Locale of the content being rendered
    pub locale: &'a str,
    /// Variant selected for this invocation
    pub variant: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    /// Context for `locale` with the variant configured in `settings`.
    pub fn new(settings: &'a Settings, locale: &'a str) -> Self {
        Self {
            settings,
            locale,
            variant: settings.variant.as_deref(),
        }
    }
}

/// Render `email` from its resolved template and merged placeholders.
///
/// # Errors
///
/// - [`crate::core::EmailError::MissingSubject`] when no subject resolves
/// - [`crate::core::EmailError::Rendering`] when the HTML substitution fails
pub fn render_email(
    settings: &Settings,
    email: &Email,
    template: &Template,
    placeholders: &Placeholders,
) -> Result<RenderedEmail> {
    let ctx = RenderContext::new(settings, &email.locale);
    debug!("Rendering {} with template {}", email, template.name);

    let subjects = render_subject(&email.name, &email.locale, placeholders, ctx.variant)?;
    let text = render_text(&ctx, template, placeholders);
    let html = render_html(&ctx, template, placeholders, &subjects.subject)?;

    Ok(RenderedEmail {
        subjects,
        text,
        html,
    })
}
