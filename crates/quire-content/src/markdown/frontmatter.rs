//! YAML frontmatter extraction.
//!
//! A post starts with a block delimited by `---` lines:
//!
//! ```text
//! ---
//! layout: post
//! title: "Unit Testing"
//! date: 2017-04-18 23:53:42 -0700
//! ---
//! Body text...
//! ```
//!
//! The opening delimiter must be the first line (a UTF-8 BOM and trailing
//! whitespace are tolerated). The block closes at the next line that is
//! exactly `---` or `...`.

use quire_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

const BOM: char = '\u{feff}';

/// Result of splitting a document into frontmatter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontmatterResult {
    /// Parsed frontmatter mapping, `None` when the document has no
    /// opening delimiter.
    pub frontmatter: Option<Value>,

    /// Everything after the closing delimiter line.
    pub body: String,

    /// Lines consumed by the frontmatter block, delimiters included.
    pub body_line_offset: usize,
}

impl FrontmatterResult {
    /// Whether the document had a frontmatter block.
    pub fn has_frontmatter(&self) -> bool {
        self.frontmatter.is_some()
    }

    /// Deserialize the frontmatter into a caller-defined type.
    ///
    /// Returns `Ok(None)` when there is no frontmatter.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.frontmatter {
            Some(value) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|e| Error::malformed_metadata(e.to_string())),
            None => Ok(None),
        }
    }

    /// Look up a top-level string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.frontmatter.as_ref()?.get(key)?.as_str()
    }
}

/// Split `content` into frontmatter and body.
///
/// A document without an opening delimiter is returned whole as the body
/// with `frontmatter: None`; callers that require metadata decide whether
/// that is an error.
///
/// # Errors
///
/// Returns [`Error::MalformedMetadata`] when the block is never closed, the
/// YAML does not parse, or it is not a key-value mapping.
///
/// # Example
///
/// ```
/// use quire_content::markdown::extract_frontmatter;
///
/// let result = extract_frontmatter("---\nlayout: post\n---\nHello").unwrap();
/// assert_eq!(result.get_str("layout"), Some("post"));
/// assert_eq!(result.body, "Hello");
/// ```
pub fn extract_frontmatter(content: &str) -> Result<FrontmatterResult> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    let first = match lines.next() {
        Some(first) if first.trim_end() == "---" => first,
        _ => {
            return Ok(FrontmatterResult {
                frontmatter: None,
                body: content.to_string(),
                body_line_offset: 0,
            });
        }
    };

    // Byte offset of the body once the block closes.
    let mut consumed = first.len();
    let mut yaml_lines = 1;
    let mut closed = false;
    let mut yaml = String::new();

    for line in lines {
        yaml_lines += 1;
        consumed += line.len();
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            closed = true;
            break;
        }
        yaml.push_str(line);
    }

    if !closed {
        return Err(Error::malformed_metadata(
            "front matter opened on line 1 is never closed",
        ));
    }

    let value = parse_mapping(&yaml)?;
    log::debug!("parsed front matter ({} lines)", yaml_lines);

    Ok(FrontmatterResult {
        frontmatter: Some(value),
        body: content[consumed..].to_string(),
        body_line_offset: yaml_lines,
    })
}

/// Return the body of `content`, ignoring frontmatter if present.
///
/// Unlike [`extract_frontmatter`] this never fails: an unterminated block
/// leaves the content untouched.
pub fn strip_frontmatter(content: &str) -> &str {
    let trimmed = content.strip_prefix(BOM).unwrap_or(content);
    let mut offset = 0;
    let mut lines = trimmed.split_inclusive('\n');

    match lines.next() {
        Some(first) if first.trim_end() == "---" => offset += first.len(),
        _ => return content,
    }

    for line in lines {
        offset += line.len();
        let t = line.trim_end();
        if t == "---" || t == "..." {
            return &trimmed[offset..];
        }
    }

    content
}

fn parse_mapping(yaml: &str) -> Result<Value> {
    if yaml.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }

    let value: Value =
        serde_yaml::from_str(yaml).map_err(|e| Error::malformed_metadata(e.to_string()))?;

    match value {
        Value::Mapping(_) => Ok(value),
        // A block holding only comments parses as null.
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        other => Err(Error::malformed_metadata(format!(
            "front matter must be a key-value mapping, found {}",
            describe(&other)
        ))),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
