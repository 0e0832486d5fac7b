//! The post document model.
//!
//! A [`Document`] is the parsed form of one content file: recognized
//! metadata, the ordered body blocks, and the raw body text they came from.
//! Documents are immutable once parsed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use quire_core::util::files::read_file;
use quire_core::{Error, Result};
use serde::Serialize;
use serde_yaml::Value;

use crate::markdown::{
    extract_frontmatter, extract_text_with, parse_blocks, scan_fences, Block, FenceReport,
};
use crate::render::{render_html, RenderOptions};
use crate::slug::PostSlug;

/// Timestamp layouts accepted for `date`, all with an explicit offset.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M %z",
    "%Y-%m-%dT%H:%M:%S%z",
];

/// Layouts that carry a time but no offset, used only for error messages.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a post `date` value.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] unless the value is a timestamp with a
/// timezone offset.
///
/// ```
/// use quire_content::document::parse_timestamp;
///
/// let ts = parse_timestamp("2017-04-18 23:53:42 -0700").unwrap();
/// assert_eq!(ts.offset().local_minus_utc(), -7 * 3600);
/// assert!(parse_timestamp("2017-04-18").is_err());
/// ```
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts);
    }
    for format in DATE_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
        || chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    if naive {
        Err(Error::invalid_date(format!(
            "'{value}' has no timezone offset (expected e.g. 2017-04-18 23:53:42 -0700)"
        )))
    } else {
        Err(Error::invalid_date(format!("'{value}' is not a timestamp")))
    }
}

/// Recognized front matter of a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    /// Name of the rendering template.
    pub layout: Option<String>,
    /// Display title.
    pub title: Option<String>,
    /// Raw `date` value; see [`Metadata::timestamp`].
    pub date: Option<String>,
    /// Every other key, kept verbatim.
    pub extra: BTreeMap<String, Value>,
}

impl Metadata {
    /// Build metadata from a parsed front matter mapping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMetadata`] if `value` is not a mapping, a key
    /// is not a string, or a recognized key holds a list or mapping.
    pub fn from_value(value: &Value) -> Result<Self> {
        let mapping = value
            .as_mapping()
            .ok_or_else(|| Error::malformed_metadata("front matter must be a key-value mapping"))?;

        let mut metadata = Metadata::default();
        for (key, val) in mapping {
            let key = key
                .as_str()
                .ok_or_else(|| Error::malformed_metadata(format!("non-string key {key:?}")))?;

            match key {
                "layout" => metadata.layout = scalar(key, val)?,
                "title" => metadata.title = scalar(key, val)?,
                "date" => metadata.date = scalar(key, val)?,
                _ => {
                    metadata.extra.insert(key.to_string(), val.clone());
                }
            }
        }

        Ok(metadata)
    }

    /// Parsed `date`, `Ok(None)` when absent.
    pub fn timestamp(&self) -> Result<Option<DateTime<FixedOffset>>> {
        self.date.as_deref().map(parse_timestamp).transpose()
    }

    /// Non-empty `layout`.
    pub fn layout(&self) -> Option<&str> {
        non_empty(self.layout.as_deref())
    }

    /// Non-empty `title`.
    pub fn title(&self) -> Option<&str> {
        non_empty(self.title.as_deref())
    }

    /// Whether the external renderer has what it needs: a layout and a title.
    pub fn is_renderable(&self) -> bool {
        self.layout().is_some() && self.title().is_some()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn scalar(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(Error::malformed_metadata(format!(
            "`{key}` must be a single value"
        ))),
    }
}

/// A parsed content file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Where the document was loaded from, if anywhere.
    pub path: Option<PathBuf>,
    /// Recognized front matter.
    pub metadata: Metadata,
    /// Top-level body blocks in order.
    pub body: Vec<Block>,
    /// Body text after the front matter.
    #[serde(skip)]
    pub source: String,
    /// Lines taken by the front matter block; add to a body line number to
    /// get a file line number.
    pub body_line_offset: usize,
}

impl Document {
    /// Parse a content file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMetadata`] when the front matter block is
    /// missing, unterminated, or not a key-value mapping.
    ///
    /// ```
    /// use quire_content::Document;
    ///
    /// let doc = Document::parse("---\nlayout: post\ntitle: \"Unit Testing\"\n---\nHi").unwrap();
    /// assert_eq!(doc.metadata.layout(), Some("post"));
    /// assert_eq!(doc.metadata.title(), Some("Unit Testing"));
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let split = extract_frontmatter(raw)?;
        let frontmatter = split.frontmatter.as_ref().ok_or_else(|| {
            Error::malformed_metadata("document does not start with a `---` front matter block")
        })?;
        let metadata = Metadata::from_value(frontmatter)?;
        let body = parse_blocks(&split.body);

        Ok(Self {
            path: None,
            metadata,
            body,
            source: split.body,
            body_line_offset: split.body_line_offset,
        })
    }

    /// Read and parse a content file.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = read_file(path).await?;
        let doc = Self::parse(&raw).map_err(|e| match e {
            Error::MalformedMetadata(msg) => {
                Error::malformed_metadata(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
        log::debug!("loaded {} ({} blocks)", path.display(), doc.body.len());
        Ok(doc.with_path(path))
    }

    /// Attach an origin path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Date and slug from the filename, for dated posts.
    pub fn slug(&self) -> Option<PostSlug> {
        self.path.as_deref().and_then(PostSlug::from_path)
    }

    /// Code samples in order.
    pub fn code_samples(&self) -> impl Iterator<Item = &Block> {
        self.body.iter().filter(|b| b.is_code())
    }

    /// Fence pairing of the body.
    pub fn fence_report(&self) -> FenceReport {
        scan_fences(&self.source)
    }

    /// Fence pairing of the body, failing on an unterminated fence.
    ///
    /// The reported line is a file line, front matter included.
    pub fn check_fences(&self) -> Result<FenceReport> {
        let report = self.fence_report();
        match report.unterminated {
            Some(line) => Err(Error::broken_code_fence(line + self.body_line_offset)),
            None => Ok(report),
        }
    }

    /// Render the body to an HTML fragment.
    pub fn render(&self, options: &RenderOptions) -> String {
        render_html(&self.source, options)
    }

    /// Visible text of the body as [`render`](Self::render) with the same
    /// options would show it.
    pub fn plain_text(&self, options: &RenderOptions) -> String {
        extract_text_with(&self.source, options.to_options())
    }
}
