//! Subject line resolution.

use crate::constants::{SUBJECT, SUBJECT_A, SUBJECT_B, SUBJECT_RESEND};
use crate::core::{EmailError, Result};
use crate::models::{Placeholders, Subjects};

/// Resolve the subject family of one email.
///
/// `subject` is mandatory. The A/B and resend subjects are optional and each
/// resolves `variant` against its own variants.
///
/// # Errors
///
/// Returns [`EmailError::MissingSubject`] when `subject` is absent or blank.
/// This is never relaxed by strict or force settings.
pub fn render_subject(
    email: &str,
    locale: &str,
    placeholders: &Placeholders,
    variant: Option<&str>,
) -> Result<Subjects> {
    let resolve = |name: &str| {
        placeholders
            .get(name)
            .map(|placeholder| placeholder.get_content(variant).trim().to_string())
            .filter(|content| !content.is_empty())
    };

    let subject = resolve(SUBJECT).ok_or_else(|| EmailError::MissingSubject {
        email: email.to_string(),
        locale: locale.to_string(),
    })?;

    Ok(Subjects {
        subject,
        subject_a: resolve(SUBJECT_A),
        subject_b: resolve(SUBJECT_B),
        subject_resend: resolve(SUBJECT_RESEND),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Placeholder;

    fn placeholders(items: Vec<Placeholder>) -> Placeholders {
        items.into_iter().map(|p| (p.name.clone(), p)).collect()
    }

    #[test]
    fn test_subject_family() {
        let subjects = render_subject(
            "welcome",
            "en",
            &placeholders(vec![
                Placeholder::new("subject", "dummy subject"),
                Placeholder::new("subject_a", "aaa"),
                Placeholder::new("subject_b", "bbb"),
            ]),
            None,
        )
        .unwrap();

        assert_eq!(subjects.subject, "dummy subject");
        assert_eq!(subjects.subject_a.as_deref(), Some("aaa"));
        assert_eq!(subjects.subject_b.as_deref(), Some("bbb"));
        assert_eq!(subjects.subject_resend, None);
    }

    #[test]
    fn test_missing_subject() {
        let error = render_subject("welcome", "fr", &placeholders(vec![Placeholder::new("body", "x")]), None)
            .unwrap_err();
        assert!(matches!(error, EmailError::MissingSubject { ref email, ref locale }
            if email == "welcome" && locale == "fr"));
    }

    #[test]
    fn test_blank_subject_is_missing() {
        let result = render_subject("welcome", "en", &placeholders(vec![Placeholder::new("subject", " \n ")]), None);
        assert!(matches!(result, Err(EmailError::MissingSubject { .. })));
    }

    #[test]
    fn test_subject_variants_resolve_independently() {
        let items = placeholders(vec![
            Placeholder::new("subject", "default").with_variant("B", "variant"),
            Placeholder::new("subject_resend", "resend"),
        ]);
        let subjects = render_subject("welcome", "en", &items, Some("B")).unwrap();
        assert_eq!(subjects.subject, "variant");
        assert_eq!(subjects.subject_resend.as_deref(), Some("resend"));
    }
}
