//! Content store: every post under a directory.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use quire_core::util::files::{find_all_files, find_file_by_slug, read_file, FileInfo, FindOptions};
use quire_core::Result;
use serde::Serialize;

use crate::document::Document;
use crate::validate::{validate_raw, CheckOptions, Issue, Severity};

/// Issues found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// The checked file.
    pub path: PathBuf,
    /// Findings, empty for a clean file.
    pub issues: Vec<Issue>,
}

impl FileReport {
    /// Read and check one file. A read failure becomes an `Unreadable` issue.
    pub async fn check(path: PathBuf, options: &CheckOptions) -> Self {
        let issues = match read_file(&path).await {
            Ok(raw) => validate_raw(&raw, Some(&path), options),
            Err(e) => vec![Issue::unreadable(e.to_string())],
        };
        if !issues.is_empty() {
            log::warn!("{}: {} issue(s)", path.display(), issues.len());
        }
        Self { path, issues }
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Result of checking a whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// One entry per file, clean files included.
    pub files: Vec<FileReport>,
}

impl CheckReport {
    /// Total errors.
    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.count(Severity::Error)).sum()
    }

    /// Total warnings.
    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|f| f.count(Severity::Warning)).sum()
    }

    /// No errors, and no warnings either when `strict`.
    pub fn passes(&self, strict: bool) -> bool {
        self.error_count() == 0 && (!strict || self.warning_count() == 0)
    }

    /// Files with at least one issue.
    pub fn with_issues(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.issues.is_empty())
    }
}

/// Posts under a content directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    options: FindOptions,
}

impl ContentStore {
    /// Store rooted at `root`, matching Markdown files.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: FindOptions::markdown(),
        }
    }

    /// The content directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Content files, sorted by path.
    pub async fn discover(&self) -> Result<Vec<FileInfo>> {
        find_all_files(&self.root, self.options.clone()).await
    }

    /// Load every document, oldest first; undated documents sort last.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be read or parsed.
    pub async fn load_all(&self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for file in self.discover().await? {
            docs.push(Document::load(&file.path).await?);
        }
        docs.sort_by(compare_by_date);
        log::debug!("loaded {} documents from {}", docs.len(), self.root.display());
        Ok(docs)
    }

    /// Load one post by slug.
    pub async fn find(&self, slug: &str) -> Result<Document> {
        let path = find_file_by_slug(&self.root, slug, self.options.clone()).await?;
        Document::load(&path).await
    }

    /// Check every file, reporting read and parse failures as issues.
    ///
    /// # Errors
    ///
    /// Fails only when the content directory cannot be walked.
    pub async fn check_all(&self, options: &CheckOptions) -> Result<CheckReport> {
        let mut report = CheckReport::default();
        for file in self.discover().await? {
            report.files.push(FileReport::check(file.path, options).await);
        }
        Ok(report)
    }
}

fn compare_by_date(a: &Document, b: &Document) -> Ordering {
    let key = |d: &Document| d.metadata.timestamp().ok().flatten();
    match (key(a), key(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.path.cmp(&b.path)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.path.cmp(&b.path),
    }
}
