//! Parsing of email source documents.
//!
//! A source is a small XML document:
//!
//! ```xml
//! <resources template="basic.html" style="main.css,extra.css" email_type="transactional">
//!   <string name="subject">Welcome</string>
//!   <string name="intro" type="text"><![CDATA[Hello **there**]]></string>
//!   <string-array name="cta">
//!     <item>Start now</item>
//!     <item variant="B">Try it</item>
//!   </string-array>
//!   <bitmap name="logo" id="logo" src="logo.png" alt="Logo"/>
//! </resources>
//! ```

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::core::{EmailError, Result};
use crate::models::{EmailType, Placeholder, PlaceholderType, Placeholders};

static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<string[^>]*>").expect("segment regex is valid"));
static SEGMENT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#" name="([^"]+)""#).expect("segment name regex is valid"));

pub(crate) const STRING_ELEMENT: &str = "string";
pub(crate) const ARRAY_ELEMENT: &str = "string-array";
pub(crate) const LEGACY_ARRAY_ELEMENT: &str = "array";
pub(crate) const ITEM_ELEMENT: &str = "item";
pub(crate) const BITMAP_ELEMENT: &str = "bitmap";

pub(crate) const NAME_ATTR: &str = "name";
pub(crate) const TYPE_ATTR: &str = "type";
pub(crate) const VARIANT_ATTR: &str = "variant";
pub(crate) const TEMPLATE_ATTR: &str = "template";
pub(crate) const STYLE_ATTR: &str = "style";
pub(crate) const EMAIL_TYPE_ATTR: &str = "email_type";
const LEGACY_IS_TEXT_ATTR: &str = "isText";

/// Parsed content of one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSource {
    /// Template file name, absent for global sources
    pub template: Option<String>,
    /// Declared style sheets in order
    pub styles: Vec<String>,
    /// Declared email type
    pub email_type: Option<EmailType>,
    /// Local placeholders keyed by raw name
    pub placeholders: Placeholders,
}

/// Parse a source document.
///
/// `origin` names the document in diagnostics (usually its path).
///
/// # Errors
///
/// - [`EmailError::SourceParse`] for malformed XML, with the line, column and the
///   name of the nearest preceding `string` element
/// - [`EmailError::UnknownPlaceholderType`] / [`EmailError::UnknownEmailType`] for
///   values outside the closed sets
/// - [`EmailError::InvalidSource`] for elements lacking a `name`
pub fn parse_source(xml: &str, origin: &str) -> Result<EmailSource> {
    let document = roxmltree::Document::parse(xml).map_err(|e| {
        let pos = e.pos();
        let element = nearest_segment_name(xml, pos.row, pos.col);
        warn!(
            "Malformed source {} at {}:{} near {:?}: {}",
            origin, pos.row, pos.col, element, e
        );
        EmailError::SourceParse {
            origin: origin.to_string(),
            line: pos.row,
            column: pos.col,
            element,
            message: e.to_string(),
        }
    })?;

    let root = document.root_element();

    let template = root.attribute(TEMPLATE_ATTR).map(str::to_string);
    let styles = root
        .attribute(STYLE_ATTR)
        .map(|styles| {
            styles.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
        })
        .unwrap_or_default();
    let email_type = root.attribute(EMAIL_TYPE_ATTR).map(EmailType::parse).transpose()?;

    let mut placeholders = Placeholders::new();
    for node in root.children().filter(roxmltree::Node::is_element) {
        let placeholder = match node.tag_name().name() {
            STRING_ELEMENT => parse_string(node, origin)?,
            ARRAY_ELEMENT | LEGACY_ARRAY_ELEMENT => parse_array(node, origin)?,
            BITMAP_ELEMENT => parse_bitmap(node, origin)?,
            other => {
                debug!("Ignoring <{}> element in {}", other, origin);
                continue;
            }
        };
        if placeholders.contains_key(&placeholder.name) {
            warn!("Placeholder '{}' is defined twice in {}, keeping the last one", placeholder.name, origin);
        }
        placeholders.insert(placeholder.name.clone(), placeholder);
    }

    Ok(EmailSource {
        template,
        styles,
        email_type,
        placeholders,
    })
}

fn required_name(node: roxmltree::Node<'_, '_>, origin: &str) -> Result<String> {
    node.attribute(NAME_ATTR).map(str::to_string).ok_or_else(|| EmailError::InvalidSource {
        origin: origin.to_string(),
        reason: format!("<{}> element without a name attribute", node.tag_name().name()),
    })
}

fn placeholder_kind(node: roxmltree::Node<'_, '_>, name: &str) -> Result<PlaceholderType> {
    match node.attribute(TYPE_ATTR) {
        Some(value) => PlaceholderType::parse(name, value),
        None if node.attribute(LEGACY_IS_TEXT_ATTR) == Some("false") => Ok(PlaceholderType::Attribute),
        None => Ok(PlaceholderType::Text),
    }
}

fn extra_attributes(node: roxmltree::Node<'_, '_>, known: &[&str]) -> BTreeMap<String, String> {
    node.attributes()
        .filter(|attr| !known.contains(&attr.name()))
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect()
}

fn node_text(node: roxmltree::Node<'_, '_>) -> String {
    node.children().filter(roxmltree::Node::is_text).filter_map(|n| n.text()).collect()
}

fn parse_string(node: roxmltree::Node<'_, '_>, origin: &str) -> Result<Placeholder> {
    let name = required_name(node, origin)?;
    let kind = placeholder_kind(node, &name)?;
    Ok(Placeholder {
        kind,
        content: node_text(node),
        attributes: extra_attributes(node, &[NAME_ATTR, TYPE_ATTR, LEGACY_IS_TEXT_ATTR]),
        ..Placeholder::new(name, "")
    })
}

fn parse_array(node: roxmltree::Node<'_, '_>, origin: &str) -> Result<Placeholder> {
    let name = required_name(node, origin)?;
    let kind = placeholder_kind(node, &name)?;

    let mut content = String::new();
    let mut variants = BTreeMap::new();
    for item in node.children().filter(|n| n.has_tag_name(ITEM_ELEMENT)) {
        match item.attribute(VARIANT_ATTR) {
            Some(variant) => {
                variants.insert(variant.to_string(), node_text(item));
            }
            None => content = node_text(item),
        }
    }

    Ok(Placeholder {
        kind,
        content,
        variants,
        attributes: extra_attributes(node, &[NAME_ATTR, TYPE_ATTR, LEGACY_IS_TEXT_ATTR]),
        ..Placeholder::new(name, "")
    })
}

fn parse_bitmap(node: roxmltree::Node<'_, '_>, origin: &str) -> Result<Placeholder> {
    let name = required_name(node, origin)?;
    Ok(Placeholder {
        kind: PlaceholderType::Bitmap,
        attributes: extra_attributes(node, &[NAME_ATTR]),
        ..Placeholder::new(name, "")
    })
}

/// Name of the last `<string ...>` opening tag before the 1-based `line`/`column`.
fn nearest_segment_name(xml: &str, line: u32, column: u32) -> Option<String> {
    let offset = byte_offset(xml, line, column);
    let segment = SEGMENT_RE.find_iter(&xml[..offset]).last()?;
    SEGMENT_NAME_RE.captures(segment.as_str()).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

fn byte_offset(xml: &str, line: u32, column: u32) -> usize {
    let mut offset = 0;
    for (index, text) in xml.split_inclusive('\n').enumerate() {
        if index + 1 == line as usize {
            let within = text
                .char_indices()
                .nth(column.saturating_sub(1) as usize)
                .map_or(text.len(), |(i, _)| i);
            return offset + within;
        }
        offset += text.len();
    }
    xml.len()
}
