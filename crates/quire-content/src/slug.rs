//! Dated post filenames.
//!
//! Posts follow the `YYYY-MM-DD-slug.md` naming convention used by
//! Jekyll-style generators; the filename carries the publication date and
//! the URL slug.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Date and slug parsed from a post filename.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PostSlug {
    /// Publication date from the filename.
    pub date: NaiveDate,
    /// Remainder of the stem after the date.
    pub slug: String,
}

impl PostSlug {
    /// Parse a file stem such as `2017-04-18-unit-testing`.
    ///
    /// Returns `None` when the stem has no leading date or an empty slug.
    ///
    /// ```
    /// use quire_content::PostSlug;
    ///
    /// let slug = PostSlug::from_stem("2017-04-18-unit-testing").unwrap();
    /// assert_eq!(slug.slug, "unit-testing");
    /// assert_eq!(slug.date.to_string(), "2017-04-18");
    /// ```
    pub fn from_stem(stem: &str) -> Option<Self> {
        let date = stem.get(..10)?;
        let slug = stem.get(10..)?.strip_prefix('-')?;
        if slug.is_empty() {
            return None;
        }

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        Some(Self {
            date,
            slug: slug.to_string(),
        })
    }

    /// Parse the stem of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .and_then(Self::from_stem)
    }

    /// Relative output path: `YYYY/MM/DD/slug.html`.
    pub fn html_path(&self) -> PathBuf {
        PathBuf::from(format!("{:04}", self.date.year()))
            .join(format!("{:02}", self.date.month()))
            .join(format!("{:02}", self.date.day()))
            .join(format!("{}.html", self.slug))
    }
}

impl fmt::Display for PostSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date.format("%Y-%m-%d"), self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stem() {
        let slug = PostSlug::from_stem("2017-04-18-unit-testing").unwrap();
        assert_eq!(slug.date, NaiveDate::from_ymd_opt(2017, 4, 18).unwrap());
        assert_eq!(slug.slug, "unit-testing");
    }

    #[test]
    fn test_from_stem_rejects_undated() {
        assert!(PostSlug::from_stem("about").is_none());
        assert!(PostSlug::from_stem("unit-testing-is-fun").is_none());
    }

    #[test]
    fn test_from_stem_rejects_invalid_date() {
        assert!(PostSlug::from_stem("2017-13-40-bad").is_none());
    }

    #[test]
    fn test_from_stem_rejects_empty_slug() {
        assert!(PostSlug::from_stem("2017-04-18").is_none());
        assert!(PostSlug::from_stem("2017-04-18-").is_none());
    }

    #[test]
    fn test_from_path() {
        let slug = PostSlug::from_path(Path::new("_posts/2017-04-18-unit-testing.md")).unwrap();
        assert_eq!(slug.slug, "unit-testing");
    }

    #[test]
    fn test_html_path() {
        let slug = PostSlug::from_stem("2017-04-08-mocks").unwrap();
        assert_eq!(slug.html_path(), PathBuf::from("2017/04/08/mocks.html"));
    }

    #[test]
    fn test_display() {
        let slug = PostSlug::from_stem("2017-04-18-unit-testing").unwrap();
        assert_eq!(slug.to_string(), "2017-04-18-unit-testing");
    }

    #[test]
    fn test_ordering_by_date() {
        let older = PostSlug::from_stem("2016-01-01-z").unwrap();
        let newer = PostSlug::from_stem("2017-01-01-a").unwrap();
        assert!(older < newer);
    }
}
