//! Test fixtures for creating sample project files
//!
//! This module provides builders for email sources, global sources and HTML
//! templates.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Test fixture for an HTML template under `<templates>/<email_type>/`
#[derive(Clone, Debug)]
pub struct TemplateFixture {
    pub name: String,
    pub email_type: String,
    pub content: String,
}

impl TemplateFixture {
    /// Transactional `basic.html` with a title, a content slot and a global footer
    pub fn basic() -> Self {
        Self {
            name: "basic.html".to_string(),
            email_type: "transactional".to_string(),
            content: "<html><body><h1>{{title}}</h1>{{content}}<footer>{{global_footer}}</footer></body></html>"
                .to_string(),
        }
    }

    /// Template with arbitrary markup
    pub fn new(name: &str, email_type: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            email_type: email_type.to_string(),
            content: content.to_string(),
        }
    }

    /// Write the template below `templates_dir`
    pub fn write_to(&self, templates_dir: &Path) -> Result<PathBuf> {
        let path = templates_dir.join(&self.email_type).join(&self.name);
        write_file(&path, &self.content)?;
        Ok(path)
    }
}

/// Test fixture for one email source document
#[derive(Clone, Debug)]
pub struct SourceFixture {
    pub locale: String,
    pub name: String,
    pub content: String,
}

impl SourceFixture {
    /// Source rendered with [`TemplateFixture::basic`]
    pub fn basic(locale: &str, name: &str, placeholders: &[(&str, &str)]) -> Self {
        Self::with_template(locale, name, "basic.html", Some("transactional"), placeholders)
    }

    /// Source naming `template`, with each placeholder as a CDATA `string`
    pub fn with_template(
        locale: &str,
        name: &str,
        template: &str,
        email_type: Option<&str>,
        placeholders: &[(&str, &str)],
    ) -> Self {
        let email_type = email_type.map(|t| format!(" email_type=\"{t}\"")).unwrap_or_default();
        let content = format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources template=\"{template}\"{email_type}>\n{}</resources>\n",
            string_elements(placeholders)
        );
        Self::raw(locale, name, &content)
    }

    /// Global source of `locale`
    pub fn global(locale: &str, placeholders: &[(&str, &str)]) -> Self {
        let content = format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n{}</resources>\n",
            string_elements(placeholders)
        );
        Self::raw(locale, "global", &content)
    }

    /// Source with arbitrary content
    pub fn raw(locale: &str, name: &str, content: &str) -> Self {
        Self {
            locale: locale.to_string(),
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    /// Write the source to `<source_dir>/<locale>/<name>.xml`
    pub fn write_to(&self, source_dir: &Path) -> Result<PathBuf> {
        let path = source_dir.join(&self.locale).join(format!("{}.xml", self.name));
        write_file(&path, &self.content)?;
        Ok(path)
    }
}

fn string_elements(placeholders: &[(&str, &str)]) -> String {
    placeholders
        .iter()
        .map(|(name, content)| format!("    <string name=\"{name}\"><![CDATA[{content}]]></string>\n"))
        .collect()
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
