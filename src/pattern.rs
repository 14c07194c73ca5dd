//! Source discovery pattern.
//!
//! Email sources are located with a pattern such as `{locale}/{name}.xml`,
//! relative to the source root. The pattern works in both directions:
//!
//! - **Expansion**: `{name}` and `{locale}` are replaced with concrete values,
//!   or with `*` to build a glob that enumerates candidates
//! - **Extraction**: a discovered relative path is matched back against the
//!   pattern to recover its name and locale
//!
//! # Examples
//!
//! ```rust
//! use email_parser::pattern::EmailPattern;
//! use std::path::Path;
//!
//! # fn example() -> email_parser::core::Result<()> {
//! let pattern = EmailPattern::new("{locale}/{name}.xml")?;
//! assert_eq!(pattern.expand(Some("welcome"), Some("en")), "en/welcome.xml");
//! assert_eq!(
//!     pattern.extract(Path::new("fr/welcome.xml")),
//!     Some(("welcome".to_string(), "fr".to_string()))
//! );
//! # Ok(())
//! # }
//! ```

use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::core::{EmailError, Result};

const NAME_PARAM: &str = "{name}";
const LOCALE_PARAM: &str = "{locale}";

/// `*` never crosses a directory separator.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled discovery pattern.
#[derive(Debug, Clone)]
pub struct EmailPattern {
    original_pattern: String,
    extractor: Regex,
}

impl EmailPattern {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::MissingPatternParam`] when `{name}` or `{locale}`
    /// is absent.
    pub fn new(pattern: &str) -> Result<Self> {
        for param in [NAME_PARAM, LOCALE_PARAM] {
            if !pattern.contains(param) {
                return Err(EmailError::MissingPatternParam {
                    param: param.trim_matches(|c| c == '{' || c == '}').to_string(),
                    pattern: pattern.to_string(),
                });
            }
        }

        let escaped = regex::escape(pattern)
            .replacen(&regex::escape(NAME_PARAM), "(?P<name>[^/]+?)", 1)
            .replacen(&regex::escape(LOCALE_PARAM), "(?P<locale>[^/]+?)", 1)
            .replace(&regex::escape(NAME_PARAM), "[^/]+")
            .replace(&regex::escape(LOCALE_PARAM), "[^/]+");
        let extractor = Regex::new(&format!("^{escaped}$")).map_err(|e| EmailError::InvalidSetting {
            key: "pattern".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            original_pattern: pattern.to_string(),
            extractor,
        })
    }

    /// Relative path for `name` and `locale`; `None` expands to `*`.
    pub fn expand(&self, name: Option<&str>, locale: Option<&str>) -> String {
        self.original_pattern
            .replace(NAME_PARAM, name.unwrap_or("*"))
            .replace(LOCALE_PARAM, locale.unwrap_or("*"))
    }

    /// Name and locale of a relative path matching the pattern.
    pub fn extract(&self, relative_path: &Path) -> Option<(String, String)> {
        let path = normalize_separators(relative_path);
        let caps = self.extractor.captures(&path)?;
        Some((caps.name("name")?.as_str().to_string(), caps.name("locale")?.as_str().to_string()))
    }

    /// Relative paths of the files under `base_path` matching the glob
    /// expansion for `name` and `locale`, sorted.
    ///
    /// A missing base directory has no matches.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::InvalidSetting`] when the expansion is not a valid glob.
    pub fn find_matches(&self, base_path: &Path, name: Option<&str>, locale: Option<&str>) -> Result<Vec<PathBuf>> {
        let glob = self.expand(name, locale);
        let matcher = compile_glob("pattern", &glob)?;
        debug!("Searching for '{}' in {}", glob, base_path.display());

        let mut matches: Vec<PathBuf> = WalkDir::new(base_path)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.path().strip_prefix(base_path).ok().map(Path::to_path_buf))
            .filter(|relative| {
                let matched = glob_matches(&matcher, relative);
                trace!("Checking {}: {}", relative.display(), matched);
                matched
            })
            .collect();
        matches.sort();

        debug!("Found {} matches for '{}'", matches.len(), glob);
        Ok(matches)
    }

    /// The pattern as configured.
    pub fn as_str(&self) -> &str {
        &self.original_pattern
    }
}

/// Compile a glob, reporting failures against the setting `key`.
pub(crate) fn compile_glob(key: &str, glob: &str) -> Result<Pattern> {
    Pattern::new(glob).map_err(|e| EmailError::InvalidSetting {
        key: key.to_string(),
        reason: format!("invalid glob '{glob}': {e}"),
    })
}

/// Whether a relative path matches a compiled glob, `*` not crossing `/`.
pub(crate) fn glob_matches(pattern: &Pattern, relative_path: &Path) -> bool {
    pattern.matches_with(&normalize_separators(relative_path), MATCH_OPTIONS)
}

fn normalize_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
