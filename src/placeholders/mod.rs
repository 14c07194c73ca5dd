//! Merging of global placeholders into an email's own placeholders.
//!
//! Every locale may define a `global` source whose placeholders are shared by
//! many emails. They are known under their effective name (`global_<name>`)
//! and merged into an email only when its template declares that name.

use tracing::debug;

use crate::models::{Placeholders, Template};

/// Merge `globals` into `local` for `template`.
///
/// Globals the template does not declare are dropped. A local placeholder
/// with the same name as a global one always wins.
pub fn merge_globals(local: Placeholders, globals: Placeholders, template: &Template) -> Placeholders {
    let mut merged: Placeholders =
        globals.into_iter().filter(|(name, _)| template.declares(name)).collect();
    debug!("Merging {} global placeholders into template {}", merged.len(), template.name);

    for (name, placeholder) in local {
        if merged.contains_key(&name) {
            debug!("Local placeholder {} overrides the global definition", name);
        }
        merged.insert(name, placeholder);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetaPlaceholder, Placeholder};

    fn template(names: &[&str]) -> Template {
        Template {
            name: "t.html".to_string(),
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
    fn test_only_declared_globals_are_merged() {
        let merged = merge_globals(
            placeholders(vec![Placeholder::new("subject", "Hi")]),
            placeholders(vec![
                Placeholder::new("global_footer", "footer").global(),
                Placeholder::new("global_unused", "unused").global(),
            ]),
            &template(&["global_footer", "content"]),
        );

        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["global_footer", "subject"]);
        assert!(merged["global_footer"].is_global);
    }

    #[test]
    fn test_local_wins() {
        let merged = merge_globals(
            placeholders(vec![Placeholder::new("global_footer", "local footer")]),
            placeholders(vec![Placeholder::new("global_footer", "global footer").global()]),
            &template(&["global_footer"]),
        );

        assert_eq!(merged["global_footer"].content, "local footer");
        assert!(!merged["global_footer"].is_global);
    }

    #[test]
    fn test_no_globals() {
        let merged = merge_globals(
            placeholders(vec![Placeholder::new("subject", "Hi")]),
            Placeholders::new(),
            &template(&["content"]),
        );
        assert_eq!(merged.len(), 1);
    }
}
