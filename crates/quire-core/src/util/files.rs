//! Async file utilities for Quire.
//!
//! Provides content discovery, lookup and read/write helpers used by the
//! content store and the CLI.

use async_walkdir::WalkDir;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{Error, Result};

/// Options for discovering content files.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// File extensions to match (without dot), e.g., `["md", "markdown"]`.
    /// Empty matches every file.
    pub extensions: Vec<String>,
    /// Maximum directory depth to search (None = unlimited)
    pub max_depth: Option<usize>,
    /// Skip files and directories whose name starts with `.`
    pub skip_hidden: bool,
}

impl FindOptions {
    /// Create options for finding markdown post files.
    pub fn markdown() -> Self {
        Self {
            extensions: vec!["md".to_string(), "markdown".to_string()],
            max_depth: None,
            skip_hidden: true,
        }
    }

    /// Replace the accepted extensions.
    pub fn with_extensions(mut self, extensions: Vec<&str>) -> Self {
        self.extensions = extensions.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Set maximum search depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    fn accepts(&self, base_path: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(base_path).unwrap_or(path);

        if let Some(max_depth) = self.max_depth {
            if relative.components().count() > max_depth {
                return false;
            }
        }

        if self.skip_hidden
            && relative
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            return false;
        }

        if self.extensions.is_empty() {
            return true;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want == ext))
    }
}

/// Information about a discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Full path to the file.
    pub path: PathBuf,
    /// File stem (filename without extension).
    pub stem: String,
    /// Path relative to the search base.
    pub relative_path: PathBuf,
}

/// Find all files matching criteria in a directory, sorted by relative path.
///
/// # Example
///
/// ```no_run
/// # use quire_core::util::files::{find_all_files, FindOptions};
/// # use std::path::Path;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let posts = find_all_files(Path::new("_posts"), FindOptions::markdown()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn find_all_files(base_path: &Path, options: FindOptions) -> Result<Vec<FileInfo>> {
    if !exists(base_path).await {
        return Err(Error::not_found(format!(
            "Content directory {} does not exist",
            base_path.display()
        )));
    }

    let mut files = Vec::new();
    let mut walker = WalkDir::new(base_path);

    while let Some(entry_result) = walker.next().await {
        let entry = entry_result.map_err(|e| Error::io(e.into()))?;
        let path = entry.path();

        if path.is_dir() || !options.accepts(base_path, &path) {
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let relative_path = path.strip_prefix(base_path).unwrap_or(&path).to_path_buf();

        files.push(FileInfo {
            path: path.to_path_buf(),
            stem,
            relative_path,
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    log::debug!("found {} files under {}", files.len(), base_path.display());
    Ok(files)
}

/// Find a post by slug within a directory.
///
/// Matches a file stem equal to `slug`, or a dated stem of the form
/// `YYYY-MM-DD-<slug>`.
pub async fn find_file_by_slug(
    base_path: &Path,
    slug: &str,
    options: FindOptions,
) -> Result<PathBuf> {
    let dated_suffix = format!("-{slug}");
    let files = find_all_files(base_path, options).await?;

    files
        .into_iter()
        .find(|f| f.stem == slug || f.stem.get(10..) == Some(dated_suffix.as_str()))
        .map(|f| f.path)
        .ok_or_else(|| {
            Error::not_found(format!(
                "Post '{}' not found in {}",
                slug,
                base_path.display()
            ))
        })
}

/// Read a file's contents as a string.
pub async fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .map_err(|e| Error::io_with_path(e, path))
}

/// Write a file, creating parent directories as needed.
pub async fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io_with_path(e, parent))?;
    }
    fs::write(path, contents)
        .await
        .map_err(|e| Error::io_with_path(e, path))
}

/// Check if a path exists.
pub async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}
