//! Markdown parsing and frontmatter extraction utilities.
//!
//! - [`frontmatter`]: YAML frontmatter extraction
//! - [`fences`]: Fenced code block pairing
//! - [`parser`]: Block structure and plain-text extraction
//!
//! # Example
//!
//! ```rust
//! use quire_content::markdown::{extract_frontmatter, parse_blocks};
//!
//! let content = "---\ntitle: Hello\n---\n\nBody text";
//! let result = extract_frontmatter(content).unwrap();
//! assert_eq!(result.get_str("title"), Some("Hello"));
//! assert_eq!(parse_blocks(&result.body).len(), 1);
//! ```

pub mod fences;
pub mod frontmatter;
pub mod parser;

// Re-export key types and functions
pub use fences::{check_fences, scan_fences, FenceReport, FenceSpan};
pub use frontmatter::{extract_frontmatter, strip_frontmatter, FrontmatterResult};
pub use parser::{
    extract_first_heading, extract_text_content, extract_text_with, parse_blocks, Block,
};
