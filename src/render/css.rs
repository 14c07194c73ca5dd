//! CSS inlining for HTML fragments.
//!
//! Email clients ignore `<style>` blocks, so every rule of the template's style
//! sheets is copied into the `style` attribute of the elements it matches.
//! Style sheets are parsed with lightningcss and rules apply in cascade order:
//! ascending selector specificity, source order among equals. An element's own
//! `style` declarations beat normal sheet rules and lose to `!important` ones.
//! At-rules and selectors the rewriter cannot match (pseudo-classes, for
//! instance) are skipped.

use lightningcss::properties::Property;
use lightningcss::rules::CssRule as SheetRule;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute, StyleSheet};
use lightningcss::traits::ToCss;
use lol_html::{RewriteStrSettings, Selector, element, rewrite_str};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static STYLE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("style regex is valid"));

const ORIGINAL_STYLE_ATTR: &str = "data-inline-style";

/// `(property, value)` pairs in declaration order.
pub type Declarations = Vec<(String, String)>;

/// One selector with its declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    pub specificity: u32,
    pub declarations: Declarations,
    pub important: Declarations,
}

fn parser_options<'i>() -> ParserOptions<'i> {
    ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    }
}

/// Parse every `<style>` block of `markup` into rules, one per selector,
/// sorted into cascade order.
///
/// Markup without `<style>` tags is treated as a bare style sheet.
pub fn parse_styles(markup: &str) -> Vec<CssRule> {
    let sheets: Vec<&str> = if STYLE_BLOCK_RE.is_match(markup) {
        STYLE_BLOCK_RE.captures_iter(markup).filter_map(|c| c.get(1)).map(|m| m.as_str()).collect()
    } else {
        vec![markup]
    };

    let mut rules = Vec::new();
    for sheet in sheets {
        parse_sheet(sheet, &mut rules);
    }
    rules.sort_by_key(|rule| rule.specificity);
    rules
}

fn parse_sheet(sheet: &str, rules: &mut Vec<CssRule>) {
    let stylesheet = match StyleSheet::parse(sheet, parser_options()) {
        Ok(stylesheet) => stylesheet,
        Err(e) => {
            warn!("Failed to parse style sheet: {}", e);
            return;
        }
    };

    for rule in &stylesheet.rules.0 {
        let SheetRule::Style(style) = rule else {
            debug!("Skipping CSS at-rule");
            continue;
        };

        let declarations = print_properties(&style.declarations.declarations);
        let important = print_properties(&style.declarations.important_declarations);
        if declarations.is_empty() && important.is_empty() {
            continue;
        }

        for selector in &style.selectors.0 {
            match selector.to_css_string(PrinterOptions::default()) {
                Ok(text) => rules.push(CssRule {
                    selector: text,
                    specificity: selector.specificity(),
                    declarations: declarations.clone(),
                    important: important.clone(),
                }),
                Err(e) => debug!("Skipping unprintable CSS selector: {}", e),
            }
        }
    }
}

fn print_properties(properties: &[Property<'_>]) -> Declarations {
    properties
        .iter()
        .filter_map(|property| {
            let name = property.property_id().name().to_string();
            match property.value_to_css_string(PrinterOptions::default()) {
                Ok(value) if value.contains('"') && !value.contains('\'') => Some((name, value.replace('"', "'"))),
                Ok(value) => Some((name, value)),
                Err(e) => {
                    debug!("Skipping CSS property {}: {}", name, e);
                    None
                }
            }
        })
        .collect()
}

/// Parse the content of a `style` attribute into normal and `!important`
/// declarations. Invalid declarations are dropped.
pub fn parse_declarations(style: &str) -> (Declarations, Declarations) {
    match StyleAttribute::parse(style, parser_options()) {
        Ok(attribute) => (
            print_properties(&attribute.declarations.declarations),
            print_properties(&attribute.declarations.important_declarations),
        ),
        Err(e) => {
            debug!("Ignoring unparsable style attribute '{}': {}", style, e);
            (Vec::new(), Vec::new())
        }
    }
}

fn merge_declarations(target: &mut Declarations, declarations: &[(String, String)]) {
    for (prop, value) in declarations {
        match target.iter_mut().find(|(existing, _)| existing == prop) {
            Some(entry) => entry.1.clone_from(value),
            None => target.push((prop.clone(), value.clone())),
        }
    }
}

fn format_declarations(declarations: &[(String, String)]) -> String {
    declarations.iter().map(|(prop, value)| format!("{prop}: {value}")).collect::<Vec<_>>().join("; ")
}

fn current_style(el: &lol_html::html_content::Element<'_, '_>) -> Declarations {
    el.get_attribute("style").map(|style| parse_declarations(&style).0).unwrap_or_default()
}

/// Inline the rules of `styles` into `html`.
///
/// Text outside any element (an inline text block) passes through unchanged.
pub fn inline_css(html: &str, styles: &str) -> String {
    let html = html.trim();

    let rules: Vec<CssRule> = parse_styles(styles)
        .into_iter()
        .filter(|rule| match rule.selector.parse::<Selector>() {
            Ok(_) => true,
            Err(e) => {
                debug!("Skipping CSS selector '{}': {}", rule.selector, e);
                false
            }
        })
        .collect();
    if rules.is_empty() {
        return html.to_string();
    }

    let mut handlers = vec![element!("*", |el| {
        if let Some(style) = el.get_attribute("style") {
            el.set_attribute(ORIGINAL_STYLE_ATTR, &style)?;
            el.remove_attribute("style");
        }
        Ok(())
    })];

    for rule in rules.iter().filter(|rule| !rule.declarations.is_empty()) {
        handlers.push(element!(rule.selector.as_str(), move |el| {
            let mut current = current_style(el);
            merge_declarations(&mut current, &rule.declarations);
            el.set_attribute("style", &format_declarations(&current))?;
            Ok(())
        }));
    }

    handlers.push(element!("*", |el| {
        if let Some(original) = el.get_attribute(ORIGINAL_STYLE_ATTR) {
            let mut current = current_style(el);
            merge_declarations(&mut current, &parse_declarations(&original).0);
            el.set_attribute("style", &format_declarations(&current))?;
        }
        Ok(())
    }));

    for rule in rules.iter().filter(|rule| !rule.important.is_empty()) {
        handlers.push(element!(rule.selector.as_str(), move |el| {
            let mut current = current_style(el);
            merge_declarations(&mut current, &rule.important);
            el.set_attribute("style", &format_declarations(&current))?;
            Ok(())
        }));
    }

    handlers.push(element!("*", |el| {
        if let Some(original) = el.get_attribute(ORIGINAL_STYLE_ATTR) {
            el.remove_attribute(ORIGINAL_STYLE_ATTR);
            let important = parse_declarations(&original).1;
            if !important.is_empty() {
                let mut current = current_style(el);
                merge_declarations(&mut current, &important);
                el.set_attribute("style", &format_declarations(&current))?;
            }
        }
        Ok(())
    }));

    match rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    ) {
        Ok(inlined) => inlined,
        Err(e) => {
            warn!("Failed to inline CSS: {}", e);
            html.to_string()
        }
    }
}
