//! Markdown structure parsing.
//!
//! Splits a post body into top-level [`Block`]s and extracts plain text the
//! way a reader would see it once rendered.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use super::fences::language_hint;
use crate::render::html_to_text;

/// One top-level piece of a post body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Formatted text: a paragraph, heading, list, quote, table or rule.
    Prose {
        /// Source Markdown of the block.
        markdown: String,
        /// Plain text content.
        text: String,
    },
    /// A code sample. Displayed, never executed.
    Code {
        /// Language hint from the fence info string.
        language: Option<String>,
        /// Code exactly as authored, without the fences.
        source: String,
        /// False for indented code blocks.
        fenced: bool,
    },
}

impl Block {
    /// Whether this is a code sample.
    pub fn is_code(&self) -> bool {
        matches!(self, Block::Code { .. })
    }

    /// Language hint of a code sample.
    pub fn language(&self) -> Option<&str> {
        match self {
            Block::Code { language, .. } => language.as_deref(),
            Block::Prose { .. } => None,
        }
    }
}

/// Markdown extensions enabled when parsing post bodies.
pub fn default_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

fn is_block_tag(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading { .. }
            | Tag::BlockQuote { .. }
            | Tag::CodeBlock { .. }
            | Tag::HtmlBlock
            | Tag::List { .. }
            | Tag::Item
            | Tag::FootnoteDefinition { .. }
            | Tag::Table { .. }
            | Tag::TableHead
            | Tag::TableRow
            | Tag::TableCell
    )
}

fn is_block_end(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Paragraph
            | TagEnd::Heading { .. }
            | TagEnd::BlockQuote { .. }
            | TagEnd::CodeBlock
            | TagEnd::HtmlBlock
            | TagEnd::List { .. }
            | TagEnd::Item
            | TagEnd::FootnoteDefinition { .. }
            | TagEnd::Table
            | TagEnd::TableHead
            | TagEnd::TableRow
            | TagEnd::TableCell
    )
}

/// Accumulates visible text from a stream of events.
#[derive(Default)]
struct TextCollector {
    text: String,
    image_depth: usize,
    /// Footnote labels in order of first sight; the HTML writer numbers them
    /// the same way.
    footnotes: Vec<String>,
}

impl TextCollector {
    fn footnote_number(&mut self, label: &str) -> usize {
        match self.footnotes.iter().position(|l| l == label) {
            Some(i) => i + 1,
            None => {
                self.footnotes.push(label.to_string());
                self.footnotes.len()
            }
        }
    }

    fn push_event(&mut self, event: &Event<'_>) {
        match event {
            Event::Start(Tag::Image { .. }) => self.image_depth += 1,
            Event::End(TagEnd::Image) => self.image_depth = self.image_depth.saturating_sub(1),
            Event::Start(Tag::FootnoteDefinition(label)) => {
                let number = self.footnote_number(label);
                self.text.push_str(&format!(" {number}"));
            }
            Event::FootnoteReference(label) => {
                let number = self.footnote_number(label);
                self.text.push_str(&number.to_string());
            }
            Event::Start(tag) if is_block_tag(tag) => self.text.push(' '),
            Event::End(tag) if is_block_end(tag) => self.text.push(' '),
            // Alt text lives in an attribute once rendered.
            _ if self.image_depth > 0 => {}
            Event::Text(t) | Event::Code(t) => self.text.push_str(t),
            Event::Html(html) | Event::InlineHtml(html) => self.text.push_str(&html_to_text(html)),
            Event::SoftBreak | Event::HardBreak | Event::Rule => self.text.push(' '),
            _ => {}
        }
    }

    /// Text collected since the last call; footnote numbering carries over.
    fn take_text(&mut self) -> String {
        let text = self.text.trim().to_string();
        self.text.clear();
        self.image_depth = 0;
        text
    }
}

/// Split a body into top-level blocks.
///
/// # Example
///
/// ```
/// use quire_content::markdown::{parse_blocks, Block};
///
/// let blocks = parse_blocks("Some prose.\n\n```ruby\nputs 1\n```\n");
/// assert_eq!(blocks.len(), 2);
/// assert_eq!(blocks[1].language(), Some("ruby"));
/// ```
pub fn parse_blocks(body: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut collector = TextCollector::default();
    let mut code: Option<(Option<String>, bool)> = None;
    let mut code_source = String::new();

    for (event, range) in Parser::new_ext(body, default_options()).into_offset_iter() {
        match &event {
            Event::Start(tag) => {
                if depth == 0 {
                    start = range.start;
                    collector.take_text();
                    code_source.clear();
                    code = match tag {
                        Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                            Some((language_hint(info), true))
                        }
                        Tag::CodeBlock(CodeBlockKind::Indented) => Some((None, false)),
                        _ => None,
                    };
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let block = match code.take() {
                        Some((language, fenced)) => Block::Code {
                            language,
                            source: std::mem::take(&mut code_source),
                            fenced,
                        },
                        None => Block::Prose {
                            markdown: body[start..range.end].trim_end().to_string(),
                            text: collector.take_text(),
                        },
                    };
                    blocks.push(block);
                    continue;
                }
            }
            Event::Rule if depth == 0 => {
                blocks.push(Block::Prose {
                    markdown: body[range.clone()].trim_end().to_string(),
                    text: String::new(),
                });
                continue;
            }
            Event::Text(t) if code.is_some() => code_source.push_str(t),
            _ => {}
        }
        collector.push_event(&event);
    }

    blocks
}

/// Extract the visible text of a Markdown fragment.
///
/// Text, inline code and code blocks are kept; block boundaries and line
/// breaks become spaces; image alt text is skipped. Footnote references and
/// definitions contribute their number, as the HTML writer shows it.
///
/// # Example
///
/// ```
/// use quire_content::markdown::extract_text_content;
///
/// let text = extract_text_content("# Title\n\nSome **bold** `code`.");
/// assert_eq!(text, "Title  Some bold code.");
/// ```
pub fn extract_text_content(markdown: &str) -> String {
    extract_text_with(markdown, default_options())
}

/// [`extract_text_content`] with explicit parser options.
///
/// Use the options the body is rendered with: smart punctuation and table
/// support change the text the parser produces.
pub fn extract_text_with(markdown: &str, options: Options) -> String {
    let mut collector = TextCollector::default();
    for event in Parser::new_ext(markdown, options) {
        collector.push_event(&event);
    }
    collector.take_text()
}

/// Find the first heading and its level.
pub fn extract_first_heading(markdown: &str) -> Option<(HeadingLevel, String)> {
    let mut level = None;
    let mut text = String::new();

    for event in Parser::new_ext(markdown, default_options()) {
        match event {
            Event::Start(Tag::Heading { level: l, .. }) => level = Some(l),
            Event::End(TagEnd::Heading { .. }) => return level.map(|l| (l, text)),
            Event::Text(t) | Event::Code(t) if level.is_some() => text.push_str(&t),
            _ => {}
        }
    }

    None
}
