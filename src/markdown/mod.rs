//! Markdown conversion of placeholder content.
//!
//! Placeholder content is CommonMark with two extensions:
//!
//! - **Inline text blocks**: a block starting with `[[...]]` is emitted as-is,
//!   bypassing block parsing. Used for snippets that must not become a paragraph.
//! - **Tracking opt-out links**: a link target prefixed with `!` loses the prefix
//!   and the anchor gets `clicktracking="off"`.
//!
//! Relative image targets are prefixed with the configured base URL; absolute
//! URLs are left untouched.
//!
//! [`to_html`] produces the HTML fragment for the HTML body and [`to_text`] the
//! plain-text reduction used for the text body.

mod text;

pub use text::to_text;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use std::sync::LazyLock;

use crate::constants::{NO_TRACKING_ATTRIBUTE, NO_TRACKING_PREFIX, NO_TRACKING_VALUE};

static INLINE_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[{2}(.+)\]{2}").expect("inline text regex is valid"));
static BLOCK_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("block separator regex is valid"));
static ABSOLUTE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z][a-z0-9+.\-]*://[^\s/?#]+\S*|data:\S+|mailto:\S+)$")
        .expect("absolute url regex is valid")
});

/// A run of content converted as one unit.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Block<'a> {
    /// `[[...]]` snippet, emitted verbatim
    Inline(&'a str),
    /// Markdown source, possibly spanning several blank-line separated blocks
    Markdown(String),
}

/// Split content into inline text snippets and markdown runs.
pub(crate) fn split_blocks(content: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for raw in BLOCK_SEPARATOR_RE.split(content) {
        match INLINE_TEXT_RE.captures(raw.trim_start()) {
            Some(caps) => {
                if !pending.is_empty() {
                    blocks.push(Block::Markdown(pending.join("\n\n")));
                    pending.clear();
                }
                if let Some(text) = caps.get(1) {
                    blocks.push(Block::Inline(text.as_str()));
                }
            }
            None => pending.push(raw),
        }
    }
    if !pending.is_empty() {
        blocks.push(Block::Markdown(pending.join("\n\n")));
    }
    blocks
}

/// Whether `url` is absolute and must not be prefixed with the base URL.
pub fn is_absolute_url(url: &str) -> bool {
    ABSOLUTE_URL_RE.is_match(url)
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub(crate) fn markdown_parser(source: &str) -> Parser<'_> {
    Parser::new_ext(source, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
}

pub(crate) fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Convert placeholder content to an HTML fragment.
///
/// # Examples
///
/// ```
/// use email_parser::markdown::to_html;
///
/// assert_eq!(to_html("text1", None), "<p>text1</p>");
/// assert_eq!(
///     to_html("![logo](img/logo.png)", Some("https://cdn.example.com")),
///     "<p><img src=\"https://cdn.example.com/img/logo.png\" alt=\"logo\" /></p>"
/// );
/// ```
pub fn to_html(content: &str, base_url: Option<&str>) -> String {
    let mut output = String::new();
    for block in split_blocks(content) {
        match block {
            Block::Inline(text) => output.push_str(text),
            Block::Markdown(source) => {
                let events = rewrite_events(markdown_parser(&source), base_url);
                html::push_html(&mut output, events.into_iter());
            }
        }
    }
    output.trim().to_string()
}

fn rewrite_events<'a>(parser: Parser<'a>, base_url: Option<&str>) -> Vec<Event<'a>> {
    // One entry per open link: whether it was rewritten to raw HTML
    let mut untracked_links: Vec<bool> = Vec::new();

    parser
        .map(|event| match event {
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = match base_url {
                    Some(base) if !dest_url.is_empty() && !is_absolute_url(&dest_url) => {
                        CowStr::from(join_url(base, &dest_url))
                    }
                    _ => dest_url,
                };
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                })
            }
            Event::Start(Tag::Link {
                dest_url,
                title,
                ..
            }) if dest_url.starts_with(NO_TRACKING_PREFIX) => {
                untracked_links.push(true);
                let href = escape_attribute(&dest_url[NO_TRACKING_PREFIX.len_utf8()..]);
                let title = if title.is_empty() {
                    String::new()
                } else {
                    format!(" title=\"{}\"", escape_attribute(&title))
                };
                Event::InlineHtml(CowStr::from(format!(
                    "<a href=\"{href}\" {NO_TRACKING_ATTRIBUTE}=\"{NO_TRACKING_VALUE}\"{title}>"
                )))
            }
            Event::Start(Tag::Link {
                ..
            }) => {
                untracked_links.push(false);
                event
            }
            Event::End(TagEnd::Link) => {
                if untracked_links.pop().unwrap_or(false) {
                    Event::InlineHtml(CowStr::from("</a>"))
                } else {
                    event
                }
            }
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph() {
        assert_eq!(to_html("text1", None), "<p>text1</p>");
    }

    #[test]
    fn test_inline_text_block_is_raw() {
        assert_eq!(to_html("[[<b>Hi</b> there]]", None), "<b>Hi</b> there");
    }

    #[test]
    fn test_inline_text_between_markdown_blocks() {
        let html = to_html("first\n\n[[raw]]\n\nsecond", None);
        assert_eq!(html, "<p>first</p>\nraw<p>second</p>");
    }

    #[test]
    fn test_relative_image_gets_base_url() {
        let html = to_html("![alt](path/to/img.jpg)", Some("base_url"));
        assert!(html.contains("src=\"base_url/path/to/img.jpg\""));
    }

    #[test]
    fn test_absolute_image_is_untouched() {
        let html = to_html("![alt](https://cdn.example.com/img.jpg)", Some("base_url"));
        assert!(html.contains("src=\"https://cdn.example.com/img.jpg\""));
    }

    #[test]
    fn test_untracked_link() {
        let html = to_html("[Unsubscribe](!http://example.com/unsub)", None);
        assert_eq!(
            html,
            "<p><a href=\"http://example.com/unsub\" clicktracking=\"off\">Unsubscribe</a></p>"
        );
    }

    #[test]
    fn test_regular_link_is_untouched() {
        let html = to_html("[Home](http://example.com)", None);
        assert_eq!(html, "<p><a href=\"http://example.com\">Home</a></p>");
    }

    #[test]
    fn test_is_absolute_url() {
        assert!(is_absolute_url("http://example.com/a.png"));
        assert!(is_absolute_url("HTTPS://example.com"));
        assert!(is_absolute_url("data:image/png;base64,AAAA"));
        assert!(!is_absolute_url("img/a.png"));
        assert!(!is_absolute_url("/img/a.png"));
        assert!(!is_absolute_url("http://"));
    }

    #[test]
    fn test_split_blocks_groups_markdown() {
        let blocks = split_blocks("- one\n\n- two\n\n[[snippet]]");
        assert_eq!(
            blocks,
            vec![Block::Markdown("- one\n\n- two".to_string()), Block::Inline("snippet")]
        );
    }
}
