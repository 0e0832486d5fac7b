//! Core traits for Quire.
//!
//! The primary trait is [`ConfigProvider`], which abstracts where a site's
//! posts live and where rendered fragments are written.

use std::path::PathBuf;

use crate::Result;

/// Trait for site configuration.
///
/// The CLI loads a TOML config that implements this trait; tests and
/// embedding applications can supply their own.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use quire_core::traits::ConfigProvider;
/// use quire_core::Result;
///
/// #[derive(Clone)]
/// struct BlogConfig {
///     root: PathBuf,
/// }
///
/// impl ConfigProvider for BlogConfig {
///     fn project_name(&self) -> &str {
///         "my-blog"
///     }
///
///     fn base_path(&self) -> Result<PathBuf> {
///         Ok(self.root.clone())
///     }
///
///     fn content_path(&self, content_type: &str) -> Result<PathBuf> {
///         Ok(self.root.join(format!("_{content_type}")))
///     }
/// }
///
/// let config = BlogConfig { root: PathBuf::from("/blog") };
/// assert_eq!(config.content_path("posts").unwrap(), PathBuf::from("/blog/_posts"));
/// assert_eq!(config.output_path().unwrap(), PathBuf::from("/blog/_site"));
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used for display and default paths.
    fn project_name(&self) -> &str;

    /// Root directory of the site.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined.
    fn base_path(&self) -> Result<PathBuf>;

    /// Directory holding a content type such as `"posts"` or `"drafts"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is unknown or the path
    /// cannot be resolved.
    fn content_path(&self, content_type: &str) -> Result<PathBuf>;

    /// Directory rendered fragments are written to.
    ///
    /// Defaults to `_site` under [`base_path`](Self::base_path).
    fn output_path(&self) -> Result<PathBuf> {
        Ok(self.base_path()?.join("_site"))
    }
}
