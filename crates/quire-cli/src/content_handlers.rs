//! Handler functions for the content commands.
//!
//! These implement `check`, `show`, `render`, `build` and `list` on top of
//! [`quire_content`]. Handlers print their results; the `check_*` and
//! `build_site` helpers return values so they can be tested without stdout.

use quire_content::{CheckOptions, CheckReport, ContentStore, Document, FileReport, RenderOptions};
use quire_core::traits::ConfigProvider;
use quire_core::util::files::write_file;
use quire_core::util::paths::SITE_MARKER;
use quire_core::{Error, Result};
use std::path::{Path, PathBuf};

// ============================================================================
// Option types
// ============================================================================

/// Options for `check`.
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    /// File or directory; defaults to the content path.
    pub path: Option<String>,
    /// Treat warnings as failures.
    pub strict: bool,
}

/// Options for `build`.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Output directory; defaults to the configured output path.
    pub output: Option<String>,
    /// Report what would be written without writing.
    pub dry_run: bool,
}

/// What `build` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Output files, written or planned.
    pub written: Vec<PathBuf>,
    /// Source files without a dated filename.
    pub skipped: Vec<PathBuf>,
}

// ============================================================================
// Helpers
// ============================================================================

/// The posts directory for `config`.
fn posts_dir<C: ConfigProvider>(config: &C) -> Result<PathBuf> {
    config.content_path(SITE_MARKER)
}

/// Check one file or every file under a directory.
pub async fn check_path(path: &Path, options: &CheckOptions) -> Result<CheckReport> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| Error::io_with_path(e, path))?;

    if meta.is_file() {
        return Ok(CheckReport {
            files: vec![FileReport::check(path.to_path_buf(), options).await],
        });
    }

    ContentStore::new(path).check_all(options).await
}

/// Plain text summary of a document for `show`.
pub fn describe(doc: &Document) -> String {
    let meta = &doc.metadata;
    let mut out = String::new();
    if let Some(path) = &doc.path {
        out.push_str(&format!("path:   {}\n", path.display()));
    }
    out.push_str(&format!("layout: {}\n", meta.layout().unwrap_or("-")));
    out.push_str(&format!("title:  {}\n", meta.title().unwrap_or("-")));
    out.push_str(&format!("date:   {}\n", meta.date.as_deref().unwrap_or("-")));
    for key in meta.extra.keys() {
        out.push_str(&format!("extra:  {key}\n"));
    }

    let code = doc.code_samples().count();
    out.push_str(&format!(
        "blocks: {} ({} prose, {} code)\n",
        doc.body.len(),
        doc.body.len() - code,
        code
    ));
    for (i, block) in doc.body.iter().enumerate() {
        match block {
            quire_content::Block::Prose { text, .. } => {
                out.push_str(&format!("  {:>3}. prose  {}\n", i + 1, preview(text)));
            }
            quire_content::Block::Code {
                language, source, ..
            } => {
                out.push_str(&format!(
                    "  {:>3}. code   {} ({} lines)\n",
                    i + 1,
                    language.as_deref().unwrap_or("plain"),
                    source.lines().count()
                ));
            }
        }
    }
    out
}

fn preview(text: &str) -> String {
    const WIDTH: usize = 60;
    let text = quire_content::render::normalize_whitespace(text);
    match text.char_indices().nth(WIDTH) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}

/// One line of `list` output.
pub fn list_line(doc: &Document) -> String {
    let date = match doc.metadata.timestamp() {
        Ok(Some(ts)) => ts.format("%Y-%m-%d").to_string(),
        _ => "----------".to_string(),
    };
    let path = doc
        .path
        .as_deref()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "{date}  {}  ({path})",
        doc.metadata.title().unwrap_or("(untitled)")
    )
}

/// Render every dated post under `content` into `output`.
///
/// Undated files are skipped; a post that is not renderable or has an
/// unterminated fence aborts the build before anything else is written.
pub async fn build_site(
    content: &Path,
    output: &Path,
    render: &RenderOptions,
    dry_run: bool,
) -> Result<BuildSummary> {
    let docs = ContentStore::new(content).load_all().await?;
    let mut summary = BuildSummary::default();
    let mut pages = Vec::new();

    for doc in docs {
        let source = doc.path.clone().unwrap_or_default();
        let Some(slug) = doc.slug() else {
            tracing::debug!("skipping undated file {}", source.display());
            summary.skipped.push(source);
            continue;
        };
        if !doc.metadata.is_renderable() {
            return Err(Error::invalid_data(format!(
                "{}: `layout` and `title` are required",
                source.display()
            )));
        }
        doc.check_fences()
            .map_err(|e| Error::invalid_data(format!("{}: {e}", source.display())))?;

        let target = output.join(slug.html_path());
        pages.push((target, doc.render(render)));
    }

    for (target, html) in pages {
        if !dry_run {
            write_file(&target, &html).await?;
        }
        summary.written.push(target);
    }

    Ok(summary)
}

// ============================================================================
// Handlers
// ============================================================================

/// Check posts and fail when the report does not pass.
pub async fn handle_check<C: ConfigProvider>(
    config: &C,
    options: &CheckOptions,
    args: CheckArgs,
) -> Result<()> {
    let path = match args.path {
        Some(p) => PathBuf::from(p),
        None => posts_dir(config)?,
    };
    tracing::debug!("checking {}", path.display());

    let report = check_path(&path, options).await?;
    for file in report.with_issues() {
        println!("{}", file.path.display());
        for issue in &file.issues {
            println!("  {issue}");
        }
    }
    println!(
        "Checked {} file(s): {} error(s), {} warning(s)",
        report.files.len(),
        report.error_count(),
        report.warning_count()
    );

    if report.passes(args.strict) {
        Ok(())
    } else {
        Err(Error::invalid_data(format!(
            "check failed for {}",
            path.display()
        )))
    }
}

/// Print a post's metadata and blocks.
pub async fn handle_show(file: &str, json: bool) -> Result<()> {
    let doc = Document::load(Path::new(file)).await?;
    if json {
        let out =
            serde_json::to_string_pretty(&doc).map_err(|e| Error::serialization(e.to_string()))?;
        println!("{out}");
    } else {
        print!("{}", describe(&doc));
    }
    Ok(())
}

/// Render one post to stdout or a file.
pub async fn handle_render(file: &str, output: Option<&str>, render: &RenderOptions) -> Result<()> {
    let doc = Document::load(Path::new(file)).await?;
    doc.check_fences()?;
    let html = doc.render(render);

    match output {
        Some(out) => {
            write_file(Path::new(out), &html).await?;
            tracing::info!("wrote {out}");
        }
        None => print!("{html}"),
    }
    Ok(())
}

/// Render all dated posts into the output directory.
pub async fn handle_build<C: ConfigProvider>(
    config: &C,
    render: &RenderOptions,
    options: BuildOptions,
) -> Result<()> {
    let content = posts_dir(config)?;
    let output = match options.output {
        Some(ref p) => PathBuf::from(p),
        None => config.output_path()?,
    };

    println!("Building from: {}", content.display());
    let summary = build_site(&content, &output, render, options.dry_run).await?;

    for path in &summary.written {
        println!("  {}", path.display());
    }
    if !summary.skipped.is_empty() {
        println!("Skipped {} undated file(s)", summary.skipped.len());
    }
    if options.dry_run {
        println!("Dry run: {} page(s) not written.", summary.written.len());
    } else {
        println!("Wrote {} page(s) to {}", summary.written.len(), output.display());
    }
    Ok(())
}

/// List posts oldest first.
pub async fn handle_list<C: ConfigProvider>(config: &C) -> Result<()> {
    let docs = ContentStore::new(posts_dir(config)?).load_all().await?;
    for doc in &docs {
        println!("{}", list_line(doc));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    const POST: &str = "---\nlayout: post\ntitle: \"Unit Testing\"\ndate: 2017-04-18 23:53:42 -0700\ncategories: [testing]\n---\n\nTests document intent.\n\n```ruby\nassert_equal 4, 2 + 2\n```\n";

    #[derive(Clone)]
    struct TestConfig {
        base: PathBuf,
    }

    impl ConfigProvider for TestConfig {
        fn project_name(&self) -> &str {
            "test-blog"
        }

        fn base_path(&self) -> Result<PathBuf> {
            Ok(self.base.clone())
        }

        fn content_path(&self, content_type: &str) -> Result<PathBuf> {
            Ok(self.base.join(content_type))
        }
    }

    async fn site(files: &[(&str, &str)]) -> (TempDir, TestConfig) {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("_posts");
        fs::create_dir_all(&posts).await.unwrap();
        for (name, contents) in files {
            fs::write(posts.join(name), contents).await.unwrap();
        }
        let config = TestConfig {
            base: dir.path().to_path_buf(),
        };
        (dir, config)
    }

    // ------------------------------------------------------------------------
    // check
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_check_path_single_file() {
        let (dir, _config) = site(&[("2017-04-18-unit-testing.md", POST)]).await;
        let file = dir.path().join("_posts/2017-04-18-unit-testing.md");
        let report = check_path(&file, &CheckOptions::default()).await.unwrap();
        assert_eq!(report.files.len(), 1);
        assert!(report.passes(true));
    }

    #[tokio::test]
    async fn test_check_path_unreadable_file_is_an_issue() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("2017-04-18-latin1.md");
        fs::write(&file, b"---\ntitle: caf\xe9\n---\n").await.unwrap();

        let report = check_path(&file, &CheckOptions::default()).await.unwrap();
        assert_eq!(report.error_count(), 1);
        assert!(matches!(
            report.files[0].issues[0].kind,
            quire_content::IssueKind::Unreadable { .. }
        ));
    }

    #[tokio::test]
    async fn test_check_path_missing() {
        let result = check_path(Path::new("/nonexistent/post.md"), &CheckOptions::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_handle_check_clean_site() {
        let (_dir, config) = site(&[("2017-04-18-unit-testing.md", POST)]).await;
        let result = handle_check(&config, &CheckOptions::default(), CheckArgs::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_handle_check_fails_on_unclosed_metadata() {
        let (_dir, config) = site(&[
            ("2017-04-18-unit-testing.md", POST),
            ("2017-04-19-draft.md", "---\nlayout: post\ntitle: Draft\n"),
        ])
        .await;
        let result = handle_check(&config, &CheckOptions::default(), CheckArgs::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_handle_check_strict_fails_on_warning() {
        let (_dir, config) = site(&[(
            "2017-04-18-undated.md",
            "---\nlayout: post\ntitle: Undated\n---\nBody\n",
        )])
        .await;
        let relaxed = handle_check(&config, &CheckOptions::default(), CheckArgs::default()).await;
        assert!(relaxed.is_ok());

        let strict = CheckArgs {
            strict: true,
            ..Default::default()
        };
        let result = handle_check(&config, &CheckOptions::default(), strict).await;
        assert!(result.is_err());
    }

    // ------------------------------------------------------------------------
    // show / list
    // ------------------------------------------------------------------------

    #[test]
    fn test_describe() {
        let doc = Document::parse(POST).unwrap();
        let out = describe(&doc);
        assert!(out.contains("layout: post"));
        assert!(out.contains("title:  Unit Testing"));
        assert!(out.contains("extra:  categories"));
        assert!(out.contains("blocks: 2 (1 prose, 1 code)"));
        assert!(out.contains("code   ruby (1 lines)"));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(80);
        let short = preview(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 63);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_list_line() {
        let doc = Document::parse(POST)
            .unwrap()
            .with_path("_posts/2017-04-18-unit-testing.md");
        assert_eq!(
            list_line(&doc),
            "2017-04-18  Unit Testing  (2017-04-18-unit-testing.md)"
        );
    }

    #[tokio::test]
    async fn test_handle_show_json() {
        let (dir, _config) = site(&[("2017-04-18-unit-testing.md", POST)]).await;
        let file = dir.path().join("_posts/2017-04-18-unit-testing.md");
        assert!(handle_show(file.to_str().unwrap(), true).await.is_ok());
        assert!(handle_show(file.to_str().unwrap(), false).await.is_ok());
    }

    #[tokio::test]
    async fn test_handle_list() {
        let (_dir, config) = site(&[("2017-04-18-unit-testing.md", POST)]).await;
        assert!(handle_list(&config).await.is_ok());
    }

    // ------------------------------------------------------------------------
    // render
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_handle_render_to_file() {
        let (dir, _config) = site(&[("2017-04-18-unit-testing.md", POST)]).await;
        let file = dir.path().join("_posts/2017-04-18-unit-testing.md");
        let out = dir.path().join("out/post.html");

        handle_render(
            file.to_str().unwrap(),
            Some(out.to_str().unwrap()),
            &RenderOptions::default(),
        )
        .await
        .unwrap();

        let html = fs::read_to_string(&out).await.unwrap();
        assert!(html.contains(r#"<code class="language-ruby">"#));
        assert!(html.contains("<p>Tests document intent.</p>"));
    }

    #[tokio::test]
    async fn test_handle_render_broken_fence() {
        let (dir, _config) = site(&[(
            "2017-04-18-broken.md",
            "---\nlayout: post\ntitle: Broken\n---\n```ruby\nputs 1\n",
        )])
        .await;
        let file = dir.path().join("_posts/2017-04-18-broken.md");
        let result = handle_render(file.to_str().unwrap(), None, &RenderOptions::default()).await;
        assert!(matches!(result, Err(Error::BrokenCodeFence { line: 5 })));
    }

    // ------------------------------------------------------------------------
    // build
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_build_site_writes_dated_posts() {
        let (dir, _config) = site(&[
            ("2017-04-18-unit-testing.md", POST),
            ("about.md", "---\nlayout: page\ntitle: About\n---\nHi\n"),
        ])
        .await;
        let out = dir.path().join("_site");

        let summary = build_site(
            &dir.path().join("_posts"),
            &out,
            &RenderOptions::default(),
            false,
        )
        .await
        .unwrap();

        let expected = out.join("2017/04/18/unit-testing.html");
        assert_eq!(summary.written, vec![expected.clone()]);
        assert_eq!(summary.skipped.len(), 1);
        let html = fs::read_to_string(&expected).await.unwrap();
        assert!(html.contains("language-ruby"));
    }

    #[tokio::test]
    async fn test_build_site_dry_run_writes_nothing() {
        let (dir, _config) = site(&[("2017-04-18-unit-testing.md", POST)]).await;
        let out = dir.path().join("_site");

        let summary = build_site(
            &dir.path().join("_posts"),
            &out,
            &RenderOptions::default(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(summary.written.len(), 1);
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_build_site_aborts_on_broken_fence() {
        let (dir, _config) = site(&[
            ("2017-04-18-unit-testing.md", POST),
            (
                "2017-04-19-broken.md",
                "---\nlayout: post\ntitle: Broken\n---\n```ruby\nputs 1\n",
            ),
        ])
        .await;
        let out = dir.path().join("_site");

        let result = build_site(
            &dir.path().join("_posts"),
            &out,
            &RenderOptions::default(),
            false,
        )
        .await;
        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_handle_build_uses_output_path() {
        let (dir, config) = site(&[("2017-04-18-unit-testing.md", POST)]).await;
        handle_build(&config, &RenderOptions::default(), BuildOptions::default())
            .await
            .unwrap();
        assert!(dir.path().join("_site/2017/04/18/unit-testing.html").exists());
    }
}
