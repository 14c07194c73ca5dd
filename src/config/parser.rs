//! Generic TOML parsing for configuration files.
//!
//! Reads a file and deserializes it into any [`DeserializeOwned`] type, reporting
//! failures as [`EmailError`] variants that carry the offending path.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::core::{EmailError, Result};

/// Parse a TOML configuration file into the specified type.
///
/// # Errors
///
/// - [`EmailError::FileRead`] when the file cannot be read
/// - [`EmailError::ConfigParse`] when the content is not valid TOML for `T`
///
/// # Examples
///
/// ```rust,no_run
/// use email_parser::config::{Settings, parse_config};
/// use std::path::Path;
///
/// # fn example() -> email_parser::core::Result<()> {
/// let settings: Settings = parse_config(Path::new("email-parser.toml"))?;
/// println!("sources under {}", settings.source.display());
/// # Ok(())
/// # }
/// ```
pub fn parse_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| EmailError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|e| EmailError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.message().to_string(),
    })
}
