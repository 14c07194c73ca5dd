//! Rendered artifact output.

use std::path::PathBuf;
use tracing::debug;

use crate::config::Settings;
use crate::constants::{
    HTML_EXTENSION, SUBJECT_A_EXTENSION, SUBJECT_B_EXTENSION, SUBJECT_EXTENSION, SUBJECT_RESEND_EXTENSION,
    TEXT_EXTENSION,
};
use crate::core::Result;
use crate::models::RenderedEmail;
use crate::utils::fs::safe_write;

/// Directory holding the artifacts of `locale`.
pub fn output_dir(settings: &Settings, locale: &str) -> PathBuf {
    settings.destination_dir().join(locale)
}

/// Write the artifacts of `name` under `locale`'s output directory.
///
/// `locale` is the requested locale, which differs from the content's locale
/// when the default locale was substituted. Optional subjects are written only
/// when present. Returns the written paths.
///
/// # Errors
///
/// Returns [`crate::core::EmailError::FileWrite`] when a file cannot be written.
pub fn save_rendered(settings: &Settings, name: &str, locale: &str, rendered: &RenderedEmail) -> Result<Vec<PathBuf>> {
    let dir = output_dir(settings, locale);
    let subjects = &rendered.subjects;

    let files = [
        (SUBJECT_EXTENSION, Some(subjects.subject.as_str())),
        (SUBJECT_A_EXTENSION, subjects.subject_a.as_deref()),
        (SUBJECT_B_EXTENSION, subjects.subject_b.as_deref()),
        (SUBJECT_RESEND_EXTENSION, subjects.subject_resend.as_deref()),
        (TEXT_EXTENSION, Some(rendered.text.as_str())),
        (HTML_EXTENSION, Some(rendered.html.as_str())),
    ];

    let mut written = Vec::new();
    for (extension, content) in files {
        let Some(content) = content else {
            continue;
        };
        let path = dir.join(format!("{name}{extension}"));
        safe_write(&path, content)?;
        written.push(path);
    }
    debug!("Wrote {} files for {}/{}", written.len(), locale, name);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Subjects;
    use tempfile::tempdir;

    #[test]
    fn test_save_rendered() {
        let temp = tempdir().unwrap();
        let settings = Settings::with_root(temp.path());
        let rendered = RenderedEmail {
            subjects: Subjects {
                subject: "Hello".to_string(),
                subject_a: Some("A".to_string()),
                ..Subjects::default()
            },
            text: "text".to_string(),
            html: "<p>html</p>".to_string(),
        };

        let written = save_rendered(&settings, "welcome", "fr", &rendered).unwrap();
        let names: Vec<String> =
            written.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["welcome.subject", "welcome.a.subject", "welcome.text", "welcome.html"]);

        let dir = temp.path().join("target").join("fr");
        assert_eq!(std::fs::read_to_string(dir.join("welcome.subject")).unwrap(), "Hello");
        assert_eq!(std::fs::read_to_string(dir.join("welcome.html")).unwrap(), "<p>html</p>");
        assert!(!dir.join("welcome.b.subject").exists());
    }
}
