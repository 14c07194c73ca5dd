//! Plain-text reduction of placeholder content.
//!
//! Walks the same markdown events as the HTML conversion and writes text
//! instead of markup:
//!
//! - `[text](href)` becomes `text (href)`, or just `href` when the text is
//!   empty or equal to it (just `text` when the href is empty)
//! - unordered list items are prefixed with `- `
//! - ordered list items are numbered from 1 by position, ignoring the numbers
//!   used in the source
//! - images and markup tags are dropped

use pulldown_cmark::{Event, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

use super::{Block, markdown_parser, split_blocks};
use crate::constants::NO_TRACKING_PREFIX;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"));

/// Convert placeholder content to plain text.
///
/// # Examples
///
/// ```
/// use email_parser::markdown::to_text;
///
/// assert_eq!(to_text("dummy [link_text](http://link_url) content"), "dummy link_text (http://link_url) content");
/// assert_eq!(to_text("5. one\n9. two"), "1. one\n2. two");
/// ```
pub fn to_text(content: &str) -> String {
    let mut output = String::new();
    for block in split_blocks(content) {
        match block {
            Block::Inline(text) => {
                ensure_line_start(&mut output);
                output.push_str(&strip_tags(text));
                output.push('\n');
            }
            Block::Markdown(source) => TextWriter::default().write(&source, &mut output),
        }
    }
    output.trim().to_string()
}

fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

fn ensure_line_start(output: &mut String) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
}

/// Open link being collected
struct PendingLink {
    href: String,
    text: String,
}

#[derive(Default)]
struct TextWriter {
    /// `None` for an unordered list, `Some(next number)` for an ordered one
    lists: Vec<Option<u64>>,
    link: Option<PendingLink>,
    image_depth: usize,
}

impl TextWriter {
    fn write(mut self, source: &str, output: &mut String) {
        for event in markdown_parser(source) {
            self.handle(event, output);
        }
    }

    fn push(&mut self, text: &str, output: &mut String) {
        if self.image_depth > 0 {
            return;
        }
        match self.link.as_mut() {
            Some(link) => link.text.push_str(text),
            None => output.push_str(text),
        }
    }

    fn handle(&mut self, event: Event<'_>, output: &mut String) {
        match event {
            Event::Text(text) | Event::Code(text) => self.push(&text, output),
            Event::Html(html) | Event::InlineHtml(html) => self.push(&strip_tags(&html), output),
            Event::SoftBreak | Event::HardBreak => self.push("\n", output),
            Event::Start(Tag::List(start)) => {
                ensure_line_start(output);
                self.lists.push(start.map(|_| 1));
            }
            Event::End(TagEnd::List(_)) => {
                self.lists.pop();
                ensure_line_start(output);
            }
            Event::Start(Tag::Item) => {
                ensure_line_start(output);
                let prefix = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let prefix = format!("{number}. ");
                        *number += 1;
                        prefix
                    }
                    _ => "- ".to_string(),
                };
                output.push_str(&prefix);
            }
            Event::End(TagEnd::Item) => ensure_line_start(output),
            Event::Start(Tag::Link {
                dest_url,
                ..
            }) => {
                let href = dest_url.strip_prefix(NO_TRACKING_PREFIX).unwrap_or(&*dest_url).to_string();
                self.link = Some(PendingLink {
                    href,
                    text: String::new(),
                });
            }
            Event::End(TagEnd::Link) => {
                if let Some(link) = self.link.take() {
                    let text = link.text.trim();
                    let rendered = if link.href.is_empty() {
                        text.to_string()
                    } else if text.is_empty() || text == link.href {
                        link.href
                    } else {
                        format!("{text} ({})", link.href)
                    };
                    output.push_str(&rendered);
                }
            }
            Event::Start(Tag::Image {
                ..
            }) => self.image_depth += 1,
            Event::End(TagEnd::Image) => self.image_depth = self.image_depth.saturating_sub(1),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock | TagEnd::TableRow) => {
                ensure_line_start(output);
            }
            Event::End(TagEnd::TableCell) => output.push(' '),
            Event::Rule => {
                ensure_line_start(output);
                output.push_str("---\n");
            }
            _ => {}
        }
    }
}
