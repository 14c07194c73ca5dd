//! Global constants used throughout the email parser.
//!
//! File names, output extensions and the reserved placeholder vocabulary are
//! defined centrally so the reader, renderers and writers agree on them.

/// Extension of email source documents.
pub const SOURCE_EXTENSION: &str = ".xml";

/// Output extension of the primary subject line.
pub const SUBJECT_EXTENSION: &str = ".subject";

/// Output extension of the `subject_a` A/B arm.
pub const SUBJECT_A_EXTENSION: &str = ".a.subject";

/// Output extension of the `subject_b` A/B arm.
pub const SUBJECT_B_EXTENSION: &str = ".b.subject";

/// Output extension of the resend subject.
pub const SUBJECT_RESEND_EXTENSION: &str = ".resend.subject";

/// Output extension of the plain-text body.
pub const TEXT_EXTENSION: &str = ".text";

/// Output extension of the HTML body.
pub const HTML_EXTENSION: &str = ".html";

/// Name of the per-locale source holding global placeholders.
pub const GLOBAL_EMAIL_NAME: &str = "global";

/// Prefix that turns a global placeholder's raw name into its effective name.
pub const GLOBAL_PLACEHOLDER_PREFIX: &str = "global_";

/// File (under the source root) storing expected placeholder counts.
pub const PLACEHOLDERS_FILENAME: &str = "placeholders_config.json";

/// Default project configuration file looked up in the project root.
pub const CONFIG_FILENAME: &str = "email-parser.toml";

/// Mandatory subject placeholder.
pub const SUBJECT: &str = "subject";

/// Optional subject family, in output order after [`SUBJECT`].
pub const SUBJECT_A: &str = "subject_a";
pub const SUBJECT_B: &str = "subject_b";
pub const SUBJECT_RESEND: &str = "subject_resend";

/// Every placeholder name handled by the subject renderer.
pub const SUBJECT_PLACEHOLDERS: [&str; 4] = [SUBJECT, SUBJECT_A, SUBJECT_B, SUBJECT_RESEND];

/// Template variable injected by the renderer with the base image URL.
pub const BASE_URL: &str = "base_url";

/// Marker replaced by the email's link locale inside placeholder content.
pub const LINK_LOCALE_MARKER: &str = "{link_locale}";

/// Separator between placeholder fragments in the text body.
pub const TEXT_PLACEHOLDER_SEPARATOR: &str = "\n\n";

/// Attribute set on anchors whose target opted out of click tracking.
pub const NO_TRACKING_ATTRIBUTE: &str = "clicktracking";

/// Value of [`NO_TRACKING_ATTRIBUTE`].
pub const NO_TRACKING_VALUE: &str = "off";

/// Link target prefix that opts an anchor out of click tracking.
pub const NO_TRACKING_PREFIX: char = '!';

/// Default number of batch workers when CPU detection fails.
pub const FALLBACK_CORE_COUNT: usize = 4;
