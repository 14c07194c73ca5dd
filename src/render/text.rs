//! Plain-text body rendering.

use tracing::trace;

use super::RenderContext;
use crate::constants::{LINK_LOCALE_MARKER, SUBJECT_PLACEHOLDERS, TEXT_PLACEHOLDER_SEPARATOR};
use crate::markdown::to_text;
use crate::models::{Placeholders, Template};

/// Render the plain-text body of one email.
///
/// Placeholders are visited in the template's declaration order. Attribute
/// values and the subject lines are left out. Empty fragments are dropped so
/// no stray separators remain.
pub fn render_text(ctx: &RenderContext<'_>, template: &Template, placeholders: &Placeholders) -> String {
    let link_locale = ctx.settings.link_locale(ctx.locale);

    template
        .placeholder_names()
        .filter(|name| !SUBJECT_PLACEHOLDERS.contains(name))
        .filter_map(|name| placeholders.get(name))
        .filter(|placeholder| placeholder.is_text())
        .map(|placeholder| {
            trace!("Text fragment for {}", placeholder.name);
            to_text(&placeholder.get_content(ctx.variant).replace(LINK_LOCALE_MARKER, link_locale))
        })
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(TEXT_PLACEHOLDER_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::models::{MetaPlaceholder, Placeholder, PlaceholderType};

    fn template(names: &[&str]) -> Template {
        Template {
            name: "basic_template.html".to_string(),
            style_files: Vec::new(),
            styles: String::new(),
            content: String::new(),
            placeholders: names.iter().map(|name| MetaPlaceholder::text(*name)).collect(),
            email_type: None,
        }
    }

    fn placeholders(items: Vec<Placeholder>) -> Placeholders {
        items.into_iter().map(|p| (p.name.clone(), p)).collect()
    }

    #[test]
    fn test_follows_declaration_order() {
        let settings = Settings::default();
        let ctx = RenderContext {
            settings: &settings,
            locale: "en",
            variant: None,
        };
        let text = render_text(
            &ctx,
            &template(&["zeta", "alpha"]),
            &placeholders(vec![Placeholder::new("alpha", "second"), Placeholder::new("zeta", "first")]),
        );
        assert_eq!(text, "first\n\nsecond");
    }

    #[test]
    fn test_skips_attributes_subjects_and_empty_fragments() {
        let settings = Settings::default();
        let ctx = RenderContext {
            settings: &settings,
            locale: "en",
            variant: None,
        };
        let text = render_text(
            &ctx,
            &template(&["subject", "color", "empty", "body"]),
            &placeholders(vec![
                Placeholder::new("subject", "Hello"),
                Placeholder::new("color", "red").with_kind(PlaceholderType::Attribute),
                Placeholder::new("empty", "  "),
                Placeholder::new("body", "[label](http://x)"),
            ]),
        );
        assert_eq!(text, "label (http://x)");
    }

    #[test]
    fn test_keeps_image_placeholders() {
        let settings = Settings::default();
        let ctx = RenderContext {
            settings: &settings,
            locale: "en",
            variant: None,
        };
        let text = render_text(
            &ctx,
            &template(&["hero", "body"]),
            &placeholders(vec![
                Placeholder::new("hero", "img/hero.png").with_kind(PlaceholderType::Image),
                Placeholder::new("body", "b"),
            ]),
        );
        assert_eq!(text, "img/hero.png\n\nb");
    }

    #[test]
    fn test_uses_variant_and_link_locale() {
        let settings = Settings::default();
        let ctx = RenderContext {
            settings: &settings,
            locale: "pt-BR",
            variant: Some("B"),
        };
        let text = render_text(
            &ctx,
            &template(&["body"]),
            &placeholders(vec![Placeholder::new("body", "a").with_variant("B", "see http://x/{link_locale}")]),
        );
        assert_eq!(text, "see http://x/pt");
    }
}
