//! Serialization of placeholders back into a source document.

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event};

use super::reader::{
    ARRAY_ELEMENT, BITMAP_ELEMENT, EMAIL_TYPE_ATTR, ITEM_ELEMENT, NAME_ATTR, STRING_ELEMENT,
    STYLE_ATTR, TEMPLATE_ATTR, TYPE_ATTR, VARIANT_ATTR,
};
use crate::core::{EmailError, Result};
use crate::models::{EmailType, Placeholder, PlaceholderType, Placeholders};

const ROOT_ELEMENT: &str = "resources";
const CDATA_TERMINATOR: &str = "]]>";

/// Build the source document for an email.
///
/// Contents are written as CDATA. The `type` attribute is omitted for text
/// placeholders, placeholders with variants become `string-array` elements and
/// bitmaps become empty `bitmap` elements. Global placeholders are skipped; they
/// belong to the locale's global source.
///
/// # Errors
///
/// Returns [`EmailError::Serialize`] if the XML writer fails.
pub fn create_email_content(
    template: &str,
    styles: &[String],
    email_type: Option<EmailType>,
    placeholders: &Placeholders,
) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let joined_styles = styles.join(",");
    let mut root = BytesStart::new(ROOT_ELEMENT);
    root.push_attribute((TEMPLATE_ATTR, template));
    if !styles.is_empty() {
        root.push_attribute((STYLE_ATTR, joined_styles.as_str()));
    }
    if let Some(email_type) = email_type {
        root.push_attribute((EMAIL_TYPE_ATTR, email_type.as_str()));
    }
    write(&mut writer, Event::Start(root))?;

    for placeholder in placeholders.values().filter(|p| !p.is_global) {
        match placeholder.kind {
            PlaceholderType::Bitmap => write_bitmap(&mut writer, placeholder)?,
            _ if !placeholder.variants.is_empty() => write_array(&mut writer, placeholder)?,
            _ => write_string(&mut writer, placeholder)?,
        }
    }

    write(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

    let mut content = String::from_utf8(writer.into_inner()).map_err(|e| EmailError::Serialize {
        reason: e.to_string(),
    })?;
    content.push('\n');
    Ok(content)
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(|e| EmailError::Serialize {
        reason: e.to_string(),
    })
}

fn element_start<'a>(tag: &'a str, placeholder: &'a Placeholder) -> BytesStart<'a> {
    let mut start = BytesStart::new(tag);
    start.push_attribute((NAME_ATTR, placeholder.name.as_str()));
    if placeholder.kind != PlaceholderType::Text {
        start.push_attribute((TYPE_ATTR, placeholder.kind.as_str()));
    }
    for (key, value) in &placeholder.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    start
}

/// Write `content` as CDATA, splitting sections around embedded terminators.
fn write_cdata(writer: &mut Writer<Vec<u8>>, content: &str) -> Result<()> {
    if content.is_empty() {
        return Ok(());
    }
    let mut rest = content;
    while let Some(index) = rest.find(CDATA_TERMINATOR) {
        // "]]" closes this section, ">" opens the next one
        let split = index + 2;
        write(writer, Event::CData(BytesCData::new(&rest[..split])))?;
        rest = &rest[split..];
    }
    write(writer, Event::CData(BytesCData::new(rest)))
}

/// Write an element holding `content`, self-closed when the content is empty.
fn write_content(writer: &mut Writer<Vec<u8>>, start: BytesStart<'_>, content: &str) -> Result<()> {
    if content.is_empty() {
        return write(writer, Event::Empty(start));
    }
    let end = start.to_end().into_owned();
    write(writer, Event::Start(start))?;
    write_cdata(writer, content)?;
    write(writer, Event::End(end))
}

fn write_string(writer: &mut Writer<Vec<u8>>, placeholder: &Placeholder) -> Result<()> {
    write_content(writer, element_start(STRING_ELEMENT, placeholder), &placeholder.content)
}

fn write_array(writer: &mut Writer<Vec<u8>>, placeholder: &Placeholder) -> Result<()> {
    write(writer, Event::Start(element_start(ARRAY_ELEMENT, placeholder)))?;

    write_content(writer, BytesStart::new(ITEM_ELEMENT), &placeholder.content)?;

    for (variant, content) in &placeholder.variants {
        let mut item = BytesStart::new(ITEM_ELEMENT);
        item.push_attribute((VARIANT_ATTR, variant.as_str()));
        write_content(writer, item, content)?;
    }

    write(writer, Event::End(BytesEnd::new(ARRAY_ELEMENT)))
}

fn write_bitmap(writer: &mut Writer<Vec<u8>>, placeholder: &Placeholder) -> Result<()> {
    let mut start = BytesStart::new(BITMAP_ELEMENT);
    start.push_attribute((NAME_ATTR, placeholder.name.as_str()));
    for (key, value) in &placeholder.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    write(writer, Event::Empty(start))
}
