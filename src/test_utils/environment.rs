//! Test project setup and management
//!
//! This module provides a throwaway project layout for integration and library tests.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::fixtures::{SourceFixture, TemplateFixture};
use crate::config::Settings;

/// Test project rooted in a temporary directory
///
/// Uses the default layout: `src/` for sources, `templates_html/` for
/// templates and `target/` for rendered output.
pub struct TestProject {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestProject {
    /// Create an empty project
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().to_path_buf();
        Ok(Self {
            temp_dir,
            root,
        })
    }

    /// Create a project holding [`TemplateFixture::basic`] and English and
    /// French globals
    pub fn with_basic_template() -> Result<Self> {
        let project = Self::new()?;
        project.add_template(&TemplateFixture::basic())?;
        project.add_source(&SourceFixture::global("en", &[("footer", "Sent with care")]))?;
        project.add_source(&SourceFixture::global("fr", &[("footer", "Envoyé avec soin")]))?;
        Ok(project)
    }

    /// Default settings for this project with two workers
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings {
            workers: 2,
            ..Settings::with_root(&self.root)
        }
    }

    /// Get the project root path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn add_template(&self, template: &TemplateFixture) -> Result<PathBuf> {
        template.write_to(&self.settings().templates_dir())
    }

    pub fn add_source(&self, source: &SourceFixture) -> Result<PathBuf> {
        source.write_to(&self.settings().source_dir())
    }

    /// Create a file in the project directory
    pub fn create_file(&self, path: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, content)?;
        Ok(full_path)
    }

    /// Read a file from the project directory
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(fs::read_to_string(self.root.join(path))?)
    }

    /// Check if a file exists in the project directory
    pub fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        self.root.join(path).exists()
    }

    /// Read a rendered file, e.g. `output("fr", "welcome.html")`
    pub fn output(&self, locale: &str, file: &str) -> Result<String> {
        Ok(fs::read_to_string(self.settings().destination_dir().join(locale).join(file))?)
    }
}
