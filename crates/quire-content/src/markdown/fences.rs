//! Fenced code block scanning.
//!
//! A line-oriented pass that pairs opening and closing fence markers without
//! building a full Markdown tree. It exists to catch the one authoring
//! mistake that silently swallows the rest of a post: a fence that is opened
//! and never closed.
//!
//! Fence rules follow CommonMark for top-level blocks: at most three spaces
//! of indentation, then a run of three or more backticks or tildes. A
//! backtick fence's info string may not contain a backtick. The closing
//! fence uses the same character, is at least as long as the opening run,
//! and carries no info string.
//!
//! Raw HTML blocks are skipped, so a fence line inside `<pre>` or a
//! `<div>` is content. Recognized are the blocks that end on a closing tag
//! (`pre`, `script`, `style`, `textarea`), comments, and the block-level
//! tags that run to the next blank line. Fences nested in lists or block
//! quotes are not tracked.

use quire_core::{Error, Result};
use serde::Serialize;

/// A closed fenced code block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FenceSpan {
    /// 1-based line of the opening fence.
    pub open_line: usize,
    /// 1-based line of the closing fence.
    pub close_line: usize,
    /// Fence character, `` ` `` or `~`.
    pub marker: char,
    /// First word of the info string.
    pub language: Option<String>,
}

/// Outcome of scanning a body for fences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FenceReport {
    /// Every closed block in document order.
    pub spans: Vec<FenceSpan>,
    /// Opening plus closing markers seen.
    pub marker_count: usize,
    /// Opening line of a fence still open at end of input.
    pub unterminated: Option<usize>,
}

impl FenceReport {
    /// True when every opening fence has a closing fence.
    pub fn is_balanced(&self) -> bool {
        self.unterminated.is_none()
    }
}

struct Marker<'a> {
    ch: char,
    len: usize,
    info: &'a str,
}

struct OpenFence {
    line: usize,
    ch: char,
    len: usize,
    language: Option<String>,
}

fn parse_marker(line: &str) -> Option<Marker<'_>> {
    let line = line.trim_end_matches(['\n', '\r']);
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }

    let rest = &line[indent..];
    let ch = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.chars().take_while(|c| *c == ch).count();
    if len < 3 {
        return None;
    }

    // Fence characters are ASCII, so `len` is also a byte offset.
    let info = rest[len..].trim();
    if ch == '`' && info.contains('`') {
        return None;
    }

    Some(Marker { ch, len, info })
}

/// Where a raw HTML block stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HtmlEnd {
    /// At the line containing this text (case-insensitive).
    Contains(&'static str),
    /// Before the next blank line.
    BlankLine,
}

impl HtmlEnd {
    /// Whether `line` ends the block. A blank line is not part of it.
    fn closes(self, line: &str) -> bool {
        match self {
            HtmlEnd::Contains(needle) => line.to_ascii_lowercase().contains(needle),
            HtmlEnd::BlankLine => line.trim().is_empty(),
        }
    }
}

const VERBATIM_TAGS: &[(&str, &str)] = &[
    ("pre", "</pre>"),
    ("script", "</script>"),
    ("style", "</style>"),
    ("textarea", "</textarea>"),
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "iframe", "li", "main", "nav", "ol", "p", "section", "summary", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// `rest` starts with `name` and the tag name stops there.
fn tag_named(rest: &str, name: &str) -> bool {
    rest.len() >= name.len()
        && rest.is_char_boundary(name.len())
        && rest[..name.len()].eq_ignore_ascii_case(name)
        && rest[name.len()..]
            .chars()
            .next()
            .is_none_or(|c| c.is_ascii_whitespace() || c == '>' || c == '/')
}

/// The end condition of a raw HTML block opening on `line`, if one does.
fn html_block_start(line: &str) -> Option<HtmlEnd> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = line[indent..].strip_prefix('<')?;

    if rest.starts_with("!--") {
        return Some(HtmlEnd::Contains("-->"));
    }
    if let Some((_, close)) = VERBATIM_TAGS.iter().find(|(tag, _)| tag_named(rest, tag)) {
        return Some(HtmlEnd::Contains(close));
    }
    let name = rest.strip_prefix('/').unwrap_or(rest);
    BLOCK_TAGS
        .iter()
        .any(|tag| tag_named(name, tag))
        .then_some(HtmlEnd::BlankLine)
}

/// First whitespace-separated word of a fence info string.
pub fn language_hint(info: &str) -> Option<String> {
    info.split_whitespace().next().map(str::to_string)
}

/// Scan `body` for fenced code blocks.
///
/// # Example
///
/// ```
/// use quire_content::markdown::fences::scan_fences;
///
/// let report = scan_fences("```ruby\nputs 1\n```\n");
/// assert!(report.is_balanced());
/// assert_eq!(report.marker_count, 2);
/// assert_eq!(report.spans[0].language.as_deref(), Some("ruby"));
/// ```
pub fn scan_fences(body: &str) -> FenceReport {
    let mut report = FenceReport::default();
    let mut open: Option<OpenFence> = None;
    let mut html: Option<HtmlEnd> = None;

    for (idx, line) in body.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(end) = html {
            if end.closes(line) {
                html = None;
            }
            continue;
        }
        if open.is_none() {
            if let Some(end) = html_block_start(line) {
                // Comments and verbatim blocks may close on their first line.
                if end == HtmlEnd::BlankLine || !end.closes(line) {
                    html = Some(end);
                }
                continue;
            }
        }

        let Some(marker) = parse_marker(line) else {
            continue;
        };

        match open.take() {
            None => {
                report.marker_count += 1;
                open = Some(OpenFence {
                    line: line_no,
                    ch: marker.ch,
                    len: marker.len,
                    language: language_hint(marker.info),
                });
            }
            Some(fence) => {
                if marker.ch == fence.ch && marker.len >= fence.len && marker.info.is_empty() {
                    report.marker_count += 1;
                    report.spans.push(FenceSpan {
                        open_line: fence.line,
                        close_line: line_no,
                        marker: fence.ch,
                        language: fence.language,
                    });
                } else {
                    // Inside a block: shorter or mismatched runs are content.
                    open = Some(fence);
                }
            }
        }
    }

    if let Some(fence) = open {
        log::debug!("fence opened on line {} is never closed", fence.line);
        report.unterminated = Some(fence.line);
    }

    report
}

/// Scan `body` and fail on an unterminated fence.
///
/// # Errors
///
/// Returns [`Error::BrokenCodeFence`] with the opening line of the first
/// fence left open.
pub fn check_fences(body: &str) -> Result<FenceReport> {
    let report = scan_fences(body);
    match report.unterminated {
        Some(line) => Err(Error::broken_code_fence(line)),
        None => Ok(report),
    }
}
