use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::placeholder::PlaceholderType;
use crate::core::{EmailError, Result};

/// Category of email, selecting the template directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailType {
    Marketing,
    Transactional,
}

impl EmailType {
    /// Probe order used when a source does not declare its type.
    pub const ALL: [Self; 2] = [Self::Marketing, Self::Transactional];

    /// Parse the `email_type` root attribute.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::UnknownEmailType`] for values outside the closed set.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "marketing" => Ok(Self::Marketing),
            "transactional" => Ok(Self::Transactional),
            other => Err(EmailError::UnknownEmailType {
                value: other.to_string(),
            }),
        }
    }

    /// Directory name under the templates root.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Marketing => "marketing",
            Self::Transactional => "transactional",
        }
    }
}

impl fmt::Display for EmailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration of an expected placeholder inside template markup.
///
/// Written either `{{name}}` or `{{type:name:key=value;key=value}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaPlaceholder {
    pub name: String,
    pub kind: PlaceholderType,
    pub attributes: BTreeMap<String, String>,
}

impl MetaPlaceholder {
    /// Bare text declaration.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlaceholderType::Text,
            attributes: BTreeMap::new(),
        }
    }
}

/// Template resolved for one email.
///
/// Built fresh on every read; template files may change between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    /// Template file name, e.g. `basic_template.html`
    pub name: String,
    /// Style sheet names in declaration order
    pub style_files: Vec<String>,
    /// Concatenated `<style>` blocks, empty when no style is declared
    pub styles: String,
    /// Body markup with extended tokens still present
    pub content: String,
    /// Declared placeholders in first-occurrence order, unique by name
    pub placeholders: Vec<MetaPlaceholder>,
    /// Declared email type, `None` for legacy sources
    pub email_type: Option<EmailType>,
}

impl Template {
    /// Whether the template declares a placeholder called `name`.
    pub fn declares(&self, name: &str) -> bool {
        self.placeholders.iter().any(|p| p.name == name)
    }

    /// Declared placeholder names in order.
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(|p| p.name.as_str())
    }
}
