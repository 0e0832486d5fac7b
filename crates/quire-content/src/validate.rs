//! Document checks.
//!
//! The checks an external site build relies on, collected as [`Issue`]s
//! instead of failing on the first problem so a whole content store can be
//! reported in one pass.

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use quire_core::Error;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::flag::bool_or_string;
use crate::markdown::Block;

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth fixing; does not break a build.
    Warning,
    /// The external renderer will fail or misrender.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// What was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// File could not be read as UTF-8 text.
    Unreadable { message: String },
    /// Front matter missing, unterminated, or not a mapping.
    MalformedMetadata { message: String },
    /// No non-empty `layout`.
    MissingLayout,
    /// No non-empty `title`.
    MissingTitle,
    /// No `date`.
    MissingDate,
    /// `date` is not a timestamp with an offset.
    InvalidDate { message: String },
    /// Fence opened on `line` (file line) is never closed.
    BrokenCodeFence { line: usize },
    /// Fenced code without a language hint.
    UntaggedCodeBlock { index: usize },
    /// Filename date and front matter date disagree.
    DateMismatch {
        filename: NaiveDate,
        metadata: NaiveDate,
    },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Unreadable { message } => write!(f, "file could not be read: {message}"),
            IssueKind::MalformedMetadata { message } => write!(f, "malformed metadata: {message}"),
            IssueKind::MissingLayout => f.write_str("`layout` is missing or empty"),
            IssueKind::MissingTitle => f.write_str("`title` is missing or empty"),
            IssueKind::MissingDate => f.write_str("`date` is missing"),
            IssueKind::InvalidDate { message } => write!(f, "invalid date: {message}"),
            IssueKind::BrokenCodeFence { line } => {
                write!(f, "code fence opened on line {line} is never closed")
            }
            IssueKind::UntaggedCodeBlock { index } => {
                write!(f, "code block #{index} has no language hint")
            }
            IssueKind::DateMismatch { filename, metadata } => write!(
                f,
                "filename date {filename} differs from front matter date {metadata}"
            ),
        }
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Whether the finding fails a non-strict check.
    pub severity: Severity,
    /// What was found; flattened into the JSON object.
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl Issue {
    /// Error for a file whose contents could not be read.
    pub fn unreadable(message: impl Into<String>) -> Self {
        Self::error(IssueKind::Unreadable {
            message: message.into(),
        })
    }

    fn error(kind: IssueKind) -> Self {
        Self {
            severity: Severity::Error,
            kind,
        }
    }

    fn warning(kind: IssueKind) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
        }
    }

    /// Whether this is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.kind)
    }
}

/// Which optional checks apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// A missing `date` is an error rather than a warning.
    #[serde(deserialize_with = "bool_or_string")]
    pub require_date: bool,
    /// Fenced code without a language hint is a warning.
    #[serde(deserialize_with = "bool_or_string")]
    pub require_language: bool,
}

/// Check a parsed document.
pub fn validate(doc: &Document, options: &CheckOptions) -> Vec<Issue> {
    let mut issues = Vec::new();
    let meta = &doc.metadata;

    if meta.layout().is_none() {
        issues.push(Issue::error(IssueKind::MissingLayout));
    }
    if meta.title().is_none() {
        issues.push(Issue::error(IssueKind::MissingTitle));
    }

    match meta.timestamp() {
        Ok(Some(ts)) => {
            if let Some(slug) = doc.slug() {
                let metadata = ts.date_naive();
                if slug.date != metadata {
                    issues.push(Issue::warning(IssueKind::DateMismatch {
                        filename: slug.date,
                        metadata,
                    }));
                }
            }
        }
        Ok(None) if options.require_date => issues.push(Issue::error(IssueKind::MissingDate)),
        Ok(None) => issues.push(Issue::warning(IssueKind::MissingDate)),
        Err(e) => issues.push(Issue::error(IssueKind::InvalidDate {
            message: invalid_date_message(e),
        })),
    }

    let fences = doc.fence_report();
    if let Some(line) = fences.unterminated {
        issues.push(Issue::error(IssueKind::BrokenCodeFence {
            line: line + doc.body_line_offset,
        }));
    }

    if options.require_language {
        let untagged = doc
            .code_samples()
            .enumerate()
            .filter(|(_, b)| matches!(b, Block::Code { fenced: true, language: None, .. }));
        for (i, _) in untagged {
            issues.push(Issue::warning(IssueKind::UntaggedCodeBlock { index: i + 1 }));
        }
    }

    issues
}

fn invalid_date_message(err: Error) -> String {
    match err {
        Error::InvalidDate(msg) => msg,
        other => other.to_string(),
    }
}

/// Parse and check raw file contents.
///
/// A parse failure becomes a single `MalformedMetadata` issue, so callers
/// can keep going through the rest of a store.
pub fn validate_raw(raw: &str, path: Option<&Path>, options: &CheckOptions) -> Vec<Issue> {
    match Document::parse(raw) {
        Ok(doc) => {
            let doc = match path {
                Some(p) => doc.with_path(p),
                None => doc,
            };
            validate(&doc, options)
        }
        Err(Error::MalformedMetadata(message)) => {
            vec![Issue::error(IssueKind::MalformedMetadata { message })]
        }
        Err(other) => vec![Issue::error(IssueKind::MalformedMetadata {
            message: other.to_string(),
        })],
    }
}
