//! Placeholder count validation.
//!
//! Placeholder content may itself contain `{{token}}` occurrences that are
//! filled in later by the sending system. Every translation of an email must
//! carry the same tokens the same number of times as the default locale. The
//! expected counts are kept in a JSON file generated from the default locale
//! (see [`generate_config`]).
//!
//! A failed validation never aborts a read; the orchestrator decides what to
//! do with the [`ValidationReport`].

mod counts;

pub use counts::{ExpectedCounts, ExpectedCountsCache, PlaceholderCounts, generate_config, load_expected};

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::constants::SUBJECT_PLACEHOLDERS;
use crate::models::{Placeholders, Template};

static COUNT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("count token regex is valid"));

/// Expected and actual number of occurrences of one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountMismatch {
    pub expected: usize,
    pub found: usize,
}

/// Outcome of comparing an email's tokens with the expected counts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// Expected tokens absent from the email
    pub missing: Vec<String>,
    /// Tokens present in the email but not expected
    pub extra: Vec<String>,
    /// Tokens present in both with a different number of occurrences
    pub diff_number: BTreeMap<String, CountMismatch>,
}

impl ValidationReport {
    /// Report for an email that was not checked.
    pub fn skipped() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    /// One-line description of every failure, empty when valid.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing placeholders {}", self.missing.join(", ")));
        }
        if !self.extra.is_empty() {
            parts.push(format!("extra placeholders {}", self.extra.join(", ")));
        }
        for (name, mismatch) in &self.diff_number {
            parts.push(format!("'{name}' should appear {} times but appears {}", mismatch.expected, mismatch.found));
        }
        parts.join("; ")
    }
}

/// Occurrences of each `{{token}}` in `text`.
pub fn extract_counts(text: &str) -> PlaceholderCounts {
    let mut counts = PlaceholderCounts::new();
    for caps in COUNT_TOKEN_RE.captures_iter(text) {
        *counts.entry(caps[1].to_string()).or_default() += 1;
    }
    counts
}

/// Concatenated default contents of `placeholders`, in name order.
pub fn placeholder_text(placeholders: &Placeholders) -> String {
    placeholders.values().map(|placeholder| placeholder.content.as_str()).collect()
}

/// Token occurrences across the default contents of `placeholders`.
pub fn count_placeholders(placeholders: &Placeholders) -> PlaceholderCounts {
    extract_counts(&placeholder_text(placeholders))
}

/// Compare the tokens of `text` with `expected`.
///
/// Missing tokens, extra tokens and count mismatches each make the report
/// invalid.
pub fn validate(email_name: &str, locale: &str, text: &str, expected: &PlaceholderCounts) -> ValidationReport {
    let found = extract_counts(text);

    let missing: Vec<String> = expected.keys().filter(|name| !found.contains_key(*name)).cloned().collect();
    let extra: Vec<String> = found.keys().filter(|name| !expected.contains_key(*name)).cloned().collect();
    let diff_number: BTreeMap<String, CountMismatch> = expected
        .iter()
        .filter_map(|(name, &expected)| {
            let &actual = found.get(name)?;
            (actual != expected).then(|| {
                (
                    name.clone(),
                    CountMismatch {
                        expected,
                        found: actual,
                    },
                )
            })
        })
        .collect();

    let valid = missing.is_empty() && extra.is_empty() && diff_number.is_empty();
    debug!("Validated placeholders of {}/{}: valid={}", locale, email_name, valid);

    ValidationReport {
        valid,
        missing,
        extra,
        diff_number,
    }
}

/// Validate an email's merged placeholders against the expected-count table.
///
/// Without a table every email is valid. An email absent from the table is
/// expected to contain no tokens.
pub fn validate_placeholders(
    email_name: &str,
    locale: &str,
    placeholders: &Placeholders,
    expected: Option<&ExpectedCounts>,
) -> ValidationReport {
    let Some(expected) = expected else {
        return ValidationReport::skipped();
    };
    let empty = PlaceholderCounts::new();
    validate(email_name, locale, &placeholder_text(placeholders), expected.get(email_name).unwrap_or(&empty))
}

/// Local placeholders the template never declares, subject lines excluded.
pub fn unused_placeholders(template: &Template, placeholders: &Placeholders) -> Vec<String> {
    placeholders
        .values()
        .filter(|placeholder| !placeholder.is_global)
        .map(|placeholder| placeholder.name.as_str())
        .filter(|name| !SUBJECT_PLACEHOLDERS.contains(name) && !template.declares(name))
        .map(str::to_string)
        .collect()
}
