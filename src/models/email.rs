use serde::Serialize;
use std::path::PathBuf;

/// Identity of one discovered email source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Email {
    pub name: String,
    pub locale: String,
    pub path: PathBuf,
}

impl Email {
    pub fn new(name: impl Into<String>, locale: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            locale: locale.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.locale, self.name)
    }
}

/// Subject line plus the optional A/B and resend subjects.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Subjects {
    pub subject: String,
    pub subject_a: Option<String>,
    pub subject_b: Option<String>,
    pub subject_resend: Option<String>,
}

/// The three artifacts rendered for one email and locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub subjects: Subjects,
    pub text: String,
    pub html: String,
}
