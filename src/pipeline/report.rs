//! Per-item outcomes and the deferred batch report.

use colored::Colorize;
use serde::Serialize;

use crate::models::Email;
use crate::utils::progress::Marker;

/// Final state of one email/locale pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Rendered from its own content and written
    Written,
    /// Failed, then rendered from `from` and written under the requested locale
    Substituted {
        from: String,
        reason: String,
    },
    /// Neither the email nor its fallback could be rendered
    Failed {
        reason: String,
    },
}

/// Outcome of one email plus the warnings collected while processing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub email: Email,
    pub outcome: Outcome,
    pub warnings: Vec<String>,
}

impl ItemReport {
    pub const fn succeeded(&self) -> bool {
        !matches!(self.outcome, Outcome::Failed { .. })
    }

    pub const fn marker(&self) -> Marker {
        match self.outcome {
            Outcome::Written => Marker::Written,
            Outcome::Substituted {
                ..
            } => Marker::Substituted,
            Outcome::Failed {
                ..
            } => Marker::Failed,
        }
    }
}

/// Every item of a batch, sorted by source path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn new(mut items: Vec<ItemReport>) -> Self {
        items.sort_by(|a, b| a.email.path.cmp(&b.email.path));
        Self {
            items,
        }
    }

    /// Whether no item failed.
    pub fn success(&self) -> bool {
        self.items.iter().all(ItemReport::succeeded)
    }

    pub fn failed_count(&self) -> usize {
        self.items.iter().filter(|item| !item.succeeded()).count()
    }

    pub fn substituted_count(&self) -> usize {
        self.items.iter().filter(|item| matches!(item.outcome, Outcome::Substituted { .. })).count()
    }

    /// Failure messages, one per failed item.
    pub fn errors(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| match &item.outcome {
                Outcome::Failed {
                    reason,
                } => Some(format!("{}: {reason}", item.email)),
                _ => None,
            })
            .collect()
    }

    /// Substitution notices followed by every collected warning.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for item in &self.items {
            if let Outcome::Substituted {
                from,
                reason,
            } = &item.outcome
            {
                warnings.push(format!(
                    "Email {} substituted by {}/{}: {reason}",
                    item.email, from, item.email.name
                ));
            }
            warnings.extend(item.warnings.iter().map(|warning| format!("{}: {warning}", item.email)));
        }
        warnings
    }

    /// Print numbered `ERRORS:` and `WARNINGS:` lists to stderr.
    pub fn print(&self) {
        print_list(&"ERRORS:".red().bold().to_string(), &self.errors());
        print_list(&"WARNINGS:".yellow().bold().to_string(), &self.warnings());
    }
}

fn print_list(title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    eprintln!("{title}");
    for (index, line) in lines.iter().enumerate() {
        eprintln!("{:>3}. {line}", index + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(locale: &str, outcome: Outcome) -> ItemReport {
        ItemReport {
            email: Email::new("welcome", locale, format!("src/{locale}/welcome.xml")),
            outcome,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_success_and_counts() {
        let report = BatchReport::new(vec![
            item("fr", Outcome::Substituted {
                from: "en".to_string(),
                reason: "Subject is required".to_string(),
            }),
            item("en", Outcome::Written),
        ]);
        assert!(report.success());
        assert_eq!(report.substituted_count(), 1);
        assert_eq!(report.items[0].email.locale, "en");
        assert_eq!(report.warnings(), vec!["Email fr/welcome substituted by en/welcome: Subject is required"]);
    }

    #[test]
    fn test_failure() {
        let mut failed = item("de", Outcome::Failed {
            reason: "boom".to_string(),
        });
        failed.warnings.push("unused placeholder legacy".to_string());
        let report = BatchReport::new(vec![item("en", Outcome::Written), failed]);

        assert!(!report.success());
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.errors(), vec!["de/welcome: boom"]);
        assert_eq!(report.warnings(), vec!["de/welcome: unused placeholder legacy"]);
        assert_eq!(report.items[0].marker(), Marker::Failed);
    }
}
