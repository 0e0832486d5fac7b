//! Path resolution utilities.

use std::path::{Path, PathBuf};

/// Maximum number of parent directories to walk when searching for a marker.
pub const MAX_WALK_LEVELS: usize = 10;

/// Marker directory identifying a site root.
pub const SITE_MARKER: &str = "_posts";

/// Directory that may hold the site root one level below a project root.
pub const CONTENT_DIR: &str = "content";

/// Finds the nearest site root at or above `start`.
///
/// At each level a directory holding [`SITE_MARKER`] wins; otherwise a
/// `content/` child holding it is returned, so both `blog/_posts` and a
/// project laid out as `repo/content/_posts` resolve from anywhere inside.
/// Gives up after [`MAX_WALK_LEVELS`] levels.
///
/// # Example
///
/// ```no_run
/// use quire_core::util::paths::find_site_root;
///
/// if let Some(root) = find_site_root(".") {
///     println!("Site root: {:?}", root);
/// }
/// ```
pub fn find_site_root<P: AsRef<Path>>(start: P) -> Option<PathBuf> {
    let mut current = start.as_ref().to_path_buf();

    for _ in 0..MAX_WALK_LEVELS {
        if current.join(SITE_MARKER).is_dir() {
            return Some(current);
        }
        let nested = current.join(CONTENT_DIR);
        if nested.join(SITE_MARKER).is_dir() {
            return Some(nested);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    None
}

/// Expands `~` to the user's home directory.
///
/// If the path starts with `~`, replaces it with the user's home directory.
/// Otherwise returns the path unchanged.
///
/// ```
/// use quire_core::util::paths::expand_tilde;
///
/// let expanded = expand_tilde("~/blog");
/// assert!(!expanded.starts_with("~"));
/// ```
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
