//! HTML rendering of post bodies.
//!
//! Rendering is a thin layer over pulldown-cmark's HTML writer. Fenced code
//! keeps its language hint as `<code class="language-…">` so an external
//! highlighter can pick it up. [`html_to_text`] goes the other way and is
//! what the round-trip check compares against
//! [`extract_text_content`](crate::markdown::extract_text_content).

use std::sync::OnceLock;

use pulldown_cmark::{html, Options, Parser};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::flag::bool_or_string;
use crate::markdown::parser::default_options;

/// Markdown extensions used when rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// GitHub-style tables.
    #[serde(deserialize_with = "bool_or_string")]
    pub tables: bool,
    /// `[^1]` footnotes.
    #[serde(deserialize_with = "bool_or_string")]
    pub footnotes: bool,
    /// `~~struck~~` text.
    #[serde(deserialize_with = "bool_or_string")]
    pub strikethrough: bool,
    /// `- [x]` task list items.
    #[serde(deserialize_with = "bool_or_string")]
    pub task_lists: bool,
    /// Curly quotes, en and em dashes, ellipses.
    #[serde(deserialize_with = "bool_or_string")]
    pub smart_punctuation: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        let defaults = default_options();
        Self {
            tables: defaults.contains(Options::ENABLE_TABLES),
            footnotes: defaults.contains(Options::ENABLE_FOOTNOTES),
            strikethrough: defaults.contains(Options::ENABLE_STRIKETHROUGH),
            task_lists: defaults.contains(Options::ENABLE_TASKLISTS),
            smart_punctuation: false,
        }
    }
}

impl RenderOptions {
    /// Convert to pulldown-cmark parser options.
    pub fn to_options(&self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, self.task_lists);
        options.set(Options::ENABLE_SMART_PUNCTUATION, self.smart_punctuation);
        options
    }
}

/// Render a Markdown body to an HTML fragment.
///
/// # Example
///
/// ```
/// use quire_content::render::{render_html, RenderOptions};
///
/// let html = render_html("```ruby\nputs 1\n```\n", &RenderOptions::default());
/// assert!(html.contains(r#"<code class="language-ruby">"#));
/// ```
pub fn render_html(body: &str, options: &RenderOptions) -> String {
    let parser = Parser::new_ext(body, options.to_options());
    let mut out = String::with_capacity(body.len() + body.len() / 2);
    html::push_html(&mut out, parser);
    out
}

fn block_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)</?(?:p|h[1-6]|blockquote|pre|ul|ol|li|table|thead|tbody|tr|td|th|hr|br|div|dl|dt|dd)\b[^>]*>",
        )
        .expect("block tag pattern is valid")
    })
}

fn any_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos|nbsp);")
            .expect("entity pattern is valid")
    })
}

fn decode_entity(caps: &Captures<'_>) -> String {
    let name = &caps[1];
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or(name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                name.strip_prefix('#').and_then(|dec| dec.parse().ok())
            };
            code.and_then(char::from_u32)
        }
    };

    decoded.map_or_else(|| caps[0].to_string(), String::from)
}

/// Strip markup from HTML, leaving its visible text.
///
/// Block-level tags become spaces, inline tags vanish, and character
/// entities are decoded.
///
/// ```
/// use quire_content::render::html_to_text;
///
/// assert_eq!(html_to_text("<p>a &amp; <em>b</em></p>").trim(), "a & b");
/// ```
pub fn html_to_text(html: &str) -> String {
    let spaced = block_tag_re().replace_all(html, " ");
    let stripped = any_tag_re().replace_all(&spaced, "");
    entity_re()
        .replace_all(&stripped, |caps: &Captures<'_>| decode_entity(caps))
        .into_owned()
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
