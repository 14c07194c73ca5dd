//! Placeholder substitution with Tera.
//!
//! Template bodies use Mustache-style `{{name}}` tokens. Placeholder names may
//! contain characters Tera reads as operators (`cta-button`), so each distinct
//! token is rewritten to a generated `{{ slot_N }}` reference before rendering
//! and the context is keyed by those references. Literal markup containing
//! braces is wrapped in a raw block so `{%` and `{#` stay text.
//! Escaping is disabled because every substituted fragment is already HTML.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use strsim::levenshtein;
use tera::{Context as TeraContext, Tera};
use tracing::debug;

use super::error::{ErrorLocation, TemplateError};
use super::resolver::{TOKEN_RE, rewrite_extended_tokens};

static ERROR_POSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+):(\d+)").expect("error position regex is valid"));

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

const SLOT_PREFIX: &str = "slot_";

/// How tokens without a value are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Fail with [`TemplateError::VariableNotFound`]
    Strict,
    /// Substitute an empty string
    Ignore,
}

impl MissingPolicy {
    pub const fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Ignore
        }
    }
}

/// A placeholder token of the template, in first-occurrence order.
#[derive(Debug)]
struct Slot {
    name: String,
    line: usize,
}

/// Markup rewritten for Tera plus the placeholder behind each `slot_N`.
#[derive(Debug)]
struct PreparedMarkup {
    markup: String,
    slots: Vec<Slot>,
}

impl PreparedMarkup {
    fn new(markup: &str) -> Self {
        let markup = rewrite_extended_tokens(markup);
        let mut prepared = String::with_capacity(markup.len());
        let mut slots: Vec<Slot> = Vec::new();
        let mut last = 0;

        for caps in TOKEN_RE.captures_iter(&markup) {
            let Some(token) = caps.get(0) else {
                continue;
            };
            push_literal(&mut prepared, &markup[last..token.start()]);

            let name = caps[1].trim();
            let index = match slots.iter().position(|slot| slot.name == name) {
                Some(index) => index,
                None => {
                    slots.push(Slot {
                        name: name.to_string(),
                        line: markup[..token.start()].matches('\n').count() + 1,
                    });
                    slots.len() - 1
                }
            };
            prepared.push_str(&format!("{{{{ {SLOT_PREFIX}{index} }}}}"));
            last = token.end();
        }
        push_literal(&mut prepared, &markup[last..]);

        Self {
            markup: prepared,
            slots,
        }
    }
}

fn push_literal(out: &mut String, text: &str) {
    if text.contains('{') {
        out.push_str("{% raw %}");
        out.push_str(text);
        out.push_str("{% endraw %}");
    } else {
        out.push_str(text);
    }
}

/// Substitutes placeholder values into template bodies.
#[derive(Debug, Clone, Copy)]
pub struct TemplateRenderer {
    policy: MissingPolicy,
}

impl TemplateRenderer {
    pub const fn new(policy: MissingPolicy) -> Self {
        Self {
            policy,
        }
    }

    /// Render `markup` with `values`.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::VariableNotFound`] in strict mode when a token has no value
    /// - [`TemplateError::SyntaxError`] when Tera cannot parse the markup
    pub fn render(
        &self,
        template_name: &str,
        markup: &str,
        values: &BTreeMap<String, String>,
    ) -> Result<String, TemplateError> {
        let prepared = PreparedMarkup::new(markup);

        let mut context = TeraContext::new();
        for (index, slot) in prepared.slots.iter().enumerate() {
            let value = match values.get(&slot.name) {
                Some(value) => value.as_str(),
                None if self.policy == MissingPolicy::Ignore => {
                    debug!("Placeholder {} has no value in {}, leaving it empty", slot.name, template_name);
                    ""
                }
                None => return Err(Self::variable_not_found(slot, template_name, markup, values)),
            };
            context.insert(format!("{SLOT_PREFIX}{index}"), value);
        }

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.render_str(&prepared.markup, &context)
            .map_err(|e| Self::parse_tera_error(&e, template_name, markup))
    }

    fn variable_not_found(
        slot: &Slot,
        template_name: &str,
        markup: &str,
        values: &BTreeMap<String, String>,
    ) -> TemplateError {
        let available: Vec<String> = values.keys().cloned().collect();
        let suggestions = Self::find_similar_variables(&slot.name, &available);
        let context_lines = Some(Self::extract_context_lines(markup, slot.line, 3)).filter(|lines| !lines.is_empty());

        TemplateError::VariableNotFound {
            variable: slot.name.clone(),
            available_variables: Box::new(available),
            suggestions: Box::new(suggestions),
            location: Box::new(ErrorLocation {
                template_name: template_name.to_string(),
                line_number: Some(slot.line),
                context_lines,
            }),
        }
    }

    fn parse_tera_error(error: &tera::Error, template_name: &str, markup: &str) -> TemplateError {
        let message = Self::format_tera_error(error);
        let line_number = Self::extract_line_from_tera_error(error);
        let context_lines = line_number
            .map(|line| Self::extract_context_lines(markup, line, 3))
            .filter(|lines| !lines.is_empty());

        TemplateError::SyntaxError {
            message,
            location: Box::new(ErrorLocation {
                template_name: template_name.to_string(),
                line_number,
                context_lines,
            }),
        }
    }

    /// Find similar placeholder names using Levenshtein distance
    fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
        let mut scored: Vec<_> =
            available.iter().map(|var| (var.clone(), levenshtein(target, var))).collect();

        scored.sort_by_key(|(_, dist)| *dist);

        scored
            .into_iter()
            .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(var, _)| var)
            .collect()
    }

    fn extract_context_lines(
        content: &str,
        error_line: usize,
        context_size: usize,
    ) -> Vec<(usize, String)> {
        let lines: Vec<&str> = content.lines().collect();
        if error_line == 0 || error_line > lines.len() {
            return Vec::new();
        }

        let start = error_line.saturating_sub(context_size + 1);
        let end = (error_line + context_size).min(lines.len());

        lines[start..end]
            .iter()
            .enumerate()
            .map(|(idx, line)| (start + idx + 1, (*line).to_string()))
            .collect()
    }

    fn extract_line_from_tera_error(error: &tera::Error) -> Option<usize> {
        let error_msg = format!("{error:?}");
        ERROR_POSITION_RE
            .captures(&error_msg)
            .and_then(|caps| caps.get(1))
            .and_then(|line| line.as_str().parse::<usize>().ok())
    }

    /// Flatten a Tera error chain, dropping the internal one-off template name.
    pub fn format_tera_error(error: &tera::Error) -> String {
        use std::error::Error;

        let mut all_messages = vec![error.to_string()];
        let mut current_error: Option<&dyn Error> = error.source();
        while let Some(err) = current_error {
            all_messages.push(err.to_string());
            current_error = err.source();
        }

        let messages: Vec<String> = all_messages
            .into_iter()
            .map(|msg| {
                msg.replace("while rendering '__tera_one_off'", "")
                    .replace("Failed to render '__tera_one_off'", "Template rendering failed")
                    .replace("Failed to parse '__tera_one_off'", "Template syntax error")
                    .replace("'__tera_one_off'", "template")
                    .trim()
                    .to_string()
            })
            .filter(|msg| {
                !msg.is_empty() && msg != "Template rendering failed" && msg != "Template syntax error"
            })
            .collect();

        if messages.is_empty() {
            "Template syntax error".to_string()
        } else {
            messages.join("\n  -> ")
        }
    }
}
