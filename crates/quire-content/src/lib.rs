//! Front matter parsing, fence checking, and Markdown rendering for posts.
//!
//! A post is a Markdown file that opens with a `---` delimited YAML block:
//!
//! ```rust
//! use quire_content::{Document, render::RenderOptions};
//!
//! let raw = "---\nlayout: post\ntitle: \"Unit Testing\"\ndate: 2017-04-18 23:53:42 -0700\n---\n\n\
//!            Tests document intent.\n\n```ruby\nassert_equal 4, 2 + 2\n```\n";
//!
//! let doc = Document::parse(raw).unwrap();
//! assert_eq!(doc.metadata.layout(), Some("post"));
//! assert_eq!(doc.code_samples().count(), 1);
//!
//! let html = doc.render(&RenderOptions::default());
//! assert!(html.contains(r#"<code class="language-ruby">"#));
//! ```
//!
//! # Modules
//!
//! - [`markdown`]: frontmatter, fences, block parsing
//! - [`document`]: the [`Document`] model
//! - [`render`]: HTML output and HTML-to-text
//! - [`validate`]: document checks
//! - [`store`]: a directory of posts

#![doc = include_str!("../README.md")]

pub mod document;
mod flag;
pub mod markdown;
pub mod render;
pub mod slug;
pub mod store;
pub mod validate;

// Re-export commonly used types
pub use document::{Document, Metadata};
pub use flag::parse_flag;
pub use markdown::{Block, FrontmatterResult};
pub use render::RenderOptions;
pub use slug::PostSlug;
pub use store::{CheckReport, ContentStore, FileReport};
pub use validate::{validate, validate_raw, CheckOptions, Issue, IssueKind, Severity};

// Re-export HeadingLevel for convenience
pub use pulldown_cmark::HeadingLevel;
