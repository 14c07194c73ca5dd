use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::{EmailError, Result};

/// Placeholders of one email keyed by effective name.
pub type Placeholders = BTreeMap<String, Placeholder>;

/// Closed set of placeholder content types.
///
/// Every render site matches this exhaustively; unknown type values are
/// rejected when the source is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderType {
    /// Markdown prose
    #[default]
    Text,
    /// Attribute or CSS value, inserted as-is and excluded from the text body
    Attribute,
    /// Markup inserted verbatim
    Raw,
    /// Image path rendered as a markdown image
    Image,
    /// Image element described entirely by attributes
    Bitmap,
}

impl PlaceholderType {
    /// Parse the `type` attribute of the placeholder called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::UnknownPlaceholderType`] for values outside the closed set.
    pub fn parse(name: &str, value: &str) -> Result<Self> {
        match value {
            "text" => Ok(Self::Text),
            "attribute" => Ok(Self::Attribute),
            "raw" => Ok(Self::Raw),
            "image" => Ok(Self::Image),
            "bitmap" => Ok(Self::Bitmap),
            other => Err(EmailError::UnknownPlaceholderType {
                name: name.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Attribute value used in source documents.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Attribute => "attribute",
            Self::Raw => "raw",
            Self::Image => "image",
            Self::Bitmap => "bitmap",
        }
    }
}

impl fmt::Display for PlaceholderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named unit of author-supplied content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Effective name (prefixed for globals)
    pub name: String,
    /// Content type
    pub kind: PlaceholderType,
    /// Whether this placeholder came from the locale's global source
    pub is_global: bool,
    /// Default content
    pub content: String,
    /// Alternate contents keyed by variant id
    pub variants: BTreeMap<String, String>,
    /// Extra attributes (bitmap `id`/`src`/`alt` and pass-through attributes)
    pub attributes: BTreeMap<String, String>,
}

impl Placeholder {
    /// Text placeholder with no variants or attributes.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlaceholderType::Text,
            is_global: false,
            content: content.into(),
            variants: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Same placeholder with another content type.
    #[must_use]
    pub fn with_kind(mut self, kind: PlaceholderType) -> Self {
        self.kind = kind;
        self
    }

    /// Same placeholder with one more variant.
    #[must_use]
    pub fn with_variant(mut self, variant: impl Into<String>, content: impl Into<String>) -> Self {
        self.variants.insert(variant.into(), content.into());
        self
    }

    /// Same placeholder with one more extra attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Same placeholder marked as global.
    #[must_use]
    pub fn global(mut self) -> Self {
        self.is_global = true;
        self
    }

    /// Content for `variant`, or the default content when the variant is
    /// absent or not defined for this placeholder.
    pub fn get_content(&self, variant: Option<&str>) -> &str {
        variant.and_then(|v| self.variants.get(v)).map_or(self.content.as_str(), String::as_str)
    }

    /// New placeholder whose default content is `variant`'s content and whose
    /// variants are cleared.
    #[must_use]
    pub fn pick_variant(&self, variant: &str) -> Self {
        Self {
            content: self.get_content(Some(variant)).to_string(),
            variants: BTreeMap::new(),
            ..self.clone()
        }
    }

    /// Whether the content belongs in the plain-text body.
    pub const fn is_text(&self) -> bool {
        !matches!(self.kind, PlaceholderType::Attribute)
    }
}
