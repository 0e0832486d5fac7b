//! Configuration for the `quire` CLI.
//!
//! Provides the [`QuireConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `QUIRE_CONFIG` environment variable
//! 3. XDG default: `~/.config/quire/config.toml`
//! 4. Built-in defaults

use confyg::{env, Confygery};
use quire_content::{CheckOptions, RenderOptions};
use quire_core::traits::ConfigProvider;
use quire_core::util::paths::{expand_tilde, find_site_root};
use quire_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "QUIRE_CONFIG";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "QUIRE";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the `quire` CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuireConfig {
    /// Project name, used for env var prefixes and default paths.
    pub project_name: String,

    /// Site root. Defaults to the nearest directory holding `_posts`,
    /// directly or under `content/`.
    pub base_path: Option<String>,

    /// Where posts live.
    pub content: ContentConfig,

    /// Where rendered fragments go.
    pub output: OutputConfig,

    /// Markdown extensions used by `render` and `build`.
    pub render: RenderOptions,

    /// Optional checks used by `check`.
    pub check: CheckOptions,
}

/// Content storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Path to the posts directory.
    pub path: Option<String>,
}

/// Build output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory `build` writes into.
    pub path: Option<String>,
}

impl Default for QuireConfig {
    fn default() -> Self {
        Self {
            project_name: "quire".to_string(),
            base_path: None,
            content: ContentConfig::default(),
            output: OutputConfig::default(),
            render: RenderOptions::default(),
            check: CheckOptions::default(),
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl QuireConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                log::debug!("reading config from {}", path.display());
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level(ENV_PREFIX);
        env_opts.add_section("content");
        env_opts.add_section("output");
        env_opts.add_section("render");
        env_opts.add_section("check");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("quire").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Base path as seen from `start`: the explicit `base_path`, else the
    /// nearest site root, else `start` itself.
    pub fn base_path_from(&self, start: &Path) -> PathBuf {
        match &self.base_path {
            Some(p) => expand_tilde(p),
            None => find_site_root(start).unwrap_or_else(|| start.to_path_buf()),
        }
    }

    /// Flatten this config into environment variable pairs with `QUIRE_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, ENV_PREFIX, &mut vars);
        Ok(vars)
    }
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for QuireConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn base_path(&self) -> Result<PathBuf> {
        if let Some(p) = &self.base_path {
            return Ok(expand_tilde(p));
        }
        let cwd = std::env::current_dir()
            .map_err(|e| Error::config(format!("Could not determine base path: {e}")))?;
        Ok(self.base_path_from(&cwd))
    }

    fn content_path(&self, content_type: &str) -> Result<PathBuf> {
        match &self.content.path {
            Some(p) => Ok(expand_tilde(p)),
            None => Ok(self.base_path()?.join(content_type)),
        }
    }

    fn output_path(&self) -> Result<PathBuf> {
        match &self.output.path {
            Some(p) => Ok(expand_tilde(p)),
            None => Ok(self.base_path()?.join("_site")),
        }
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Restores an environment variable on drop.
    struct EnvGuard {
        key: String,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn new(key: &str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            // SAFETY: no test reads this variable from another thread.
            unsafe { std::env::set_var(key, value) };
            Self {
                key: key.to_string(),
                prev,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            // SAFETY: as in `EnvGuard::new`.
            unsafe {
                match &self.prev {
                    Some(val) => std::env::set_var(&self.key, val),
                    None => std::env::remove_var(&self.key),
                }
            }
        }
    }

    #[test]
    fn test_quire_config_default() {
        let config = QuireConfig::default();
        assert_eq!(config.project_name, "quire");
        assert!(config.base_path.is_none());
        assert!(config.content.path.is_none());
        assert!(config.output.path.is_none());
        assert!(config.render.tables);
        assert!(!config.render.smart_punctuation);
        assert!(!config.check.require_date);
    }

    #[test]
    fn test_quire_config_from_toml() {
        let toml_str = r#"
            project_name = "blog"
            base_path = "/srv/blog"

            [content]
            path = "/srv/blog/_posts"

            [output]
            path = "/srv/www"

            [render]
            smart_punctuation = true

            [check]
            require_date = true
            require_language = true
        "#;

        let config: QuireConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project_name, "blog");
        assert_eq!(config.content.path.as_deref(), Some("/srv/blog/_posts"));
        assert_eq!(config.output.path.as_deref(), Some("/srv/www"));
        assert!(config.render.smart_punctuation);
        // Unset render keys keep their defaults.
        assert!(config.render.footnotes);
        assert!(config.check.require_date);
        assert!(config.check.require_language);
    }

    #[test]
    fn test_quire_config_bool_sections_accept_strings() {
        let toml_str = r#"
            [render]
            tables = "false"
            smart_punctuation = "true"

            [check]
            require_date = "TRUE"
        "#;

        let config: QuireConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.render.tables);
        assert!(config.render.smart_punctuation);
        assert!(config.check.require_date);
        assert!(!config.check.require_language);
    }

    #[test]
    fn test_quire_config_env_overlay_bool() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render]\nfootnotes = true\n").unwrap();

        let _guard = EnvGuard::new("QUIRE_RENDER_FOOTNOTES", "false");
        let config = QuireConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert!(!config.render.footnotes);
        assert!(config.render.tables);
    }

    #[test]
    fn test_quire_config_to_toml_round_trip() {
        let config = QuireConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("project_name = \"quire\""));
        assert!(toml_str.contains("[render]"));
        assert!(toml_str.contains("[check]"));

        let parsed: QuireConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_quire_config_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                project_name = "loaded"
                [content]
                path = "/posts"
            "#,
        )
        .unwrap();

        let config = QuireConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.project_name, "loaded");
        assert_eq!(config.content.path.as_deref(), Some("/posts"));
    }

    #[test]
    fn test_quire_config_load_missing_file_uses_defaults() {
        let config = QuireConfig::load(Some("/nonexistent/quire/config.toml")).unwrap();
        assert_eq!(config.project_name, "quire");
    }

    #[test]
    fn test_resolve_config_path_explicit() {
        let path = QuireConfig::resolve_config_path(Some("/explicit/config.toml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = QuireConfig::default_config_path() {
            assert!(p.ends_with("quire/config.toml"));
        }
    }

    #[test]
    fn test_provider_explicit_paths() {
        let config = QuireConfig {
            base_path: Some("/srv/blog".into()),
            ..Default::default()
        };
        assert_eq!(config.base_path().unwrap(), PathBuf::from("/srv/blog"));
        assert_eq!(
            config.content_path("_posts").unwrap(),
            PathBuf::from("/srv/blog/_posts")
        );
        assert_eq!(config.output_path().unwrap(), PathBuf::from("/srv/blog/_site"));
    }

    #[test]
    fn test_provider_overrides() {
        let config = QuireConfig {
            base_path: Some("/srv/blog".into()),
            content: ContentConfig {
                path: Some("/elsewhere/posts".into()),
            },
            output: OutputConfig {
                path: Some("/var/www".into()),
            },
            ..Default::default()
        };
        assert_eq!(
            config.content_path("_posts").unwrap(),
            PathBuf::from("/elsewhere/posts")
        );
        assert_eq!(config.output_path().unwrap(), PathBuf::from("/var/www"));
    }

    fn repo_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    #[test]
    fn test_base_path_finds_shipped_content() {
        let config = QuireConfig::default();
        let base = config.base_path_from(&repo_root());
        assert!(base.ends_with("content"));
        assert!(base.join("_posts").is_dir());

        let from_crate = config.base_path_from(Path::new(env!("CARGO_MANIFEST_DIR")));
        assert_eq!(
            from_crate.canonicalize().unwrap(),
            base.canonicalize().unwrap()
        );
    }

    #[test]
    fn test_provider_defaults_to_shipped_posts() {
        // Tests run from the crate directory, inside the repository.
        let posts = QuireConfig::default().content_path("_posts").unwrap();
        assert!(posts.ends_with("content/_posts"), "{posts:?}");
        assert!(posts.is_dir());
    }

    #[test]
    fn test_base_path_from_explicit_wins() {
        let config = QuireConfig {
            base_path: Some("/srv/blog".into()),
            ..Default::default()
        };
        assert_eq!(config.base_path_from(&repo_root()), PathBuf::from("/srv/blog"));
    }

    #[test]
    fn test_base_path_from_falls_back_to_start() {
        let dir = TempDir::new().unwrap();
        let base = QuireConfig::default().base_path_from(dir.path());
        assert_eq!(base, dir.path());
    }

    #[test]
    fn test_to_env_vars() {
        let config = QuireConfig::default();
        let map: HashMap<_, _> = config.to_env_vars().unwrap().into_iter().collect();
        assert_eq!(map.get("QUIRE_PROJECT_NAME").unwrap(), "quire");
        assert_eq!(map.get("QUIRE_RENDER_TABLES").unwrap(), "true");
        assert_eq!(map.get("QUIRE_CHECK_REQUIRE_DATE").unwrap(), "false");
    }

    #[test]
    fn test_quire_config_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QuireConfig>();
    }
}
