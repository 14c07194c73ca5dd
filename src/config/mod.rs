//! Configuration for the email parser
//!
//! All behaviour that depends on the project layout or on user preferences is
//! captured in one immutable [`Settings`] value. The binary builds it once and
//! shares it as `Arc<Settings>` with the orchestrator, the batch workers and the
//! service API; nothing reads configuration from global state.
//!
//! # Sources of configuration
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. An optional `email-parser.toml` in the project root (or `--config PATH`)
//! 3. Command-line flags, applied by the CLI on top of the loaded value
//!
//! ```toml
//! source = "src"
//! destination = "target"
//! templates = "templates_html"
//! pattern = "{locale}/{name}.xml"
//! images = "https://cdn.example.com/emails/img"
//! rtl = ["ar", "he"]
//! default_locale = "en"
//! strict = true
//! workers = 8
//!
//! [locale_aliases]
//! "pt-BR" = "pt"
//!
//! [link_locale_mappings]
//! "zh-TW" = "zh-hant"
//! ```

mod parser;
mod settings;

pub use parser::parse_config;
pub use settings::Settings;
