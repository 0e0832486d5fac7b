//! Handler functions for `quire config` subcommands.
//!
//! Keys are dotted paths into [`QuireConfig`] (`render.tables`,
//! `content.path`). Every key is checked against [`KEYS`] before a file is
//! read, so a typo fails with the list of valid keys instead of silently
//! writing a section nothing reads.

use crate::cli::ConfigAction;
use crate::config::QuireConfig;
use quire_content::parse_flag;
use quire_core::traits::ConfigProvider;
use quire_core::{Error, Result};
use std::path::{Path, PathBuf};

// ============================================================================
// Known keys
// ============================================================================

/// The shape a key's value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Free text.
    Text,
    /// A filesystem path; may start with `~`.
    Path,
    /// A boolean, given as any text [`parse_flag`] accepts.
    Flag,
}

/// Every settable key in [`QuireConfig`].
pub const KEYS: &[(&str, KeyKind)] = &[
    ("project_name", KeyKind::Text),
    ("base_path", KeyKind::Path),
    ("content.path", KeyKind::Path),
    ("output.path", KeyKind::Path),
    ("render.tables", KeyKind::Flag),
    ("render.footnotes", KeyKind::Flag),
    ("render.strikethrough", KeyKind::Flag),
    ("render.task_lists", KeyKind::Flag),
    ("render.smart_punctuation", KeyKind::Flag),
    ("check.require_date", KeyKind::Flag),
    ("check.require_language", KeyKind::Flag),
];

/// Look up `key`, or fail naming the keys that do exist.
pub fn key_kind(key: &str) -> Result<KeyKind> {
    KEYS.iter()
        .find(|(name, _)| *name == key)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| {
            let known: Vec<&str> = KEYS.iter().map(|(name, _)| *name).collect();
            Error::config(format!(
                "Unknown config key '{key}'; expected one of: {}",
                known.join(", ")
            ))
        })
}

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
///
/// Takes the raw `--config` path because `path` and `init` must work before
/// any config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => cmd_config_get(config_path, &key),
        ConfigAction::Set { key, value } => cmd_config_set(config_path, &key, &value),
        ConfigAction::Init { file, force } => cmd_config_init(file.as_deref(), force),
        ConfigAction::Export => cmd_config_export(&QuireConfig::load(config_path)?),
    }
}

// ============================================================================
// Command handlers
// ============================================================================

/// Print the config file in effect and the directories it resolves to.
fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    let path = QuireConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory for this platform"))?;

    let config = if path.exists() {
        println!("config:  {}", path.display());
        QuireConfig::load(Some(path.to_string_lossy().as_ref()))?
    } else {
        println!("config:  {} (missing; run `quire config init`)", path.display());
        QuireConfig::default()
    };
    for line in site_paths(&config)? {
        println!("{line}");
    }
    Ok(())
}

/// `posts:` and `output:` lines for `config path`.
fn site_paths(config: &QuireConfig) -> Result<Vec<String>> {
    let posts = config.content_path(quire_core::util::paths::SITE_MARKER)?;
    let output = config.output_path()?;
    Ok(vec![
        format!("posts:   {}", posts.display()),
        format!("output:  {}", output.display()),
    ])
}

/// Print one value. An unset optional key prints nothing.
fn cmd_config_get(config_path: Option<&str>, key: &str) -> Result<()> {
    key_kind(key)?;
    let config = QuireConfig::load(config_path)?;
    if let Some(value) = config_value(&config, key)? {
        println!("{value}");
    }
    Ok(())
}

/// Write one value into the config file, which must already exist.
fn cmd_config_set(config_path: Option<&str>, key: &str, value: &str) -> Result<()> {
    let kind = key_kind(key)?;
    let path = QuireConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;
    if !path.exists() {
        return Err(Error::config(format!(
            "No config file at {}; run `quire config init` first",
            path.display()
        )));
    }

    let current = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let updated = edit_config(&current, key, kind, value)?;
    std::fs::write(&path, updated).map_err(|e| Error::io_with_path(e, &path))?;
    println!("{key} = {value} ({})", path.display());
    Ok(())
}

/// Write the default config to `file`, or to the XDG path.
fn cmd_config_init(file: Option<&str>, force: bool) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => QuireConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };
    write_default_config(&path, force)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Print every setting as a `QUIRE_*` assignment the env overlay reads back.
fn cmd_config_export(config: &QuireConfig) -> Result<()> {
    for (key, value) in config.to_env_vars()? {
        println!("{key}={value}");
    }
    Ok(())
}

// ============================================================================
// Config values
// ============================================================================

/// The value of `key` in `config` as text, `None` when an optional key is unset.
pub fn config_value(config: &QuireConfig, key: &str) -> Result<Option<String>> {
    key_kind(key)?;
    let flag = |b: bool| Some(b.to_string());
    let value = match key {
        "project_name" => Some(config.project_name.clone()),
        "base_path" => config.base_path.clone(),
        "content.path" => config.content.path.clone(),
        "output.path" => config.output.path.clone(),
        "render.tables" => flag(config.render.tables),
        "render.footnotes" => flag(config.render.footnotes),
        "render.strikethrough" => flag(config.render.strikethrough),
        "render.task_lists" => flag(config.render.task_lists),
        "render.smart_punctuation" => flag(config.render.smart_punctuation),
        "check.require_date" => flag(config.check.require_date),
        "check.require_language" => flag(config.check.require_language),
        _ => return Err(Error::config(format!("No accessor for config key '{key}'"))),
    };
    Ok(value)
}

/// Set `key` to `raw` in the TOML text `current` and return the new text.
///
/// The result must still load as a [`QuireConfig`]; nothing is returned
/// otherwise.
pub fn edit_config(current: &str, key: &str, kind: KeyKind, raw: &str) -> Result<String> {
    let mut doc: toml::Table =
        toml::from_str(current).map_err(|e| Error::config(format!("Unparsable config: {e}")))?;

    let value = match kind {
        KeyKind::Flag => parse_flag(raw).map(toml::Value::Boolean).ok_or_else(|| {
            Error::config(format!("'{key}' takes true or false, not '{raw}'"))
        })?,
        KeyKind::Text | KeyKind::Path => toml::Value::String(raw.to_string()),
    };

    let (section, field) = match key.split_once('.') {
        Some((section, field)) => (Some(section), field),
        None => (None, key),
    };
    let table = match section {
        Some(name) => doc
            .entry(name)
            .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .ok_or_else(|| Error::config(format!("'{name}' in the config file is not a table")))?,
        None => &mut doc,
    };
    table.insert(field.to_string(), value);

    let text = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    toml::from_str::<QuireConfig>(&text)
        .map_err(|e| Error::config(format!("Config would no longer load: {e}")))?;
    Ok(text)
}

/// Write the default config to `path`, refusing to clobber unless `force`.
fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "{} already exists; pass --force to replace it",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let text = QuireConfig::default().to_toml_string()?;
    std::fs::write(path, text).map_err(|e| Error::io_with_path(e, path))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_file() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        write_default_config(&path, false).unwrap();
        (dir, path)
    }

    // ------------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------------

    #[test]
    fn test_keys_cover_serialized_config() {
        let config = QuireConfig {
            base_path: Some("/srv/blog".into()),
            content: crate::config::ContentConfig {
                path: Some("/srv/blog/_posts".into()),
            },
            output: crate::config::OutputConfig {
                path: Some("/srv/www".into()),
            },
            ..Default::default()
        };
        let value = toml::Value::try_from(&config).unwrap();
        let mut serialized = Vec::new();
        for (name, value) in value.as_table().unwrap() {
            match value.as_table() {
                Some(section) => {
                    serialized.extend(section.keys().map(|field| format!("{name}.{field}")))
                }
                None => serialized.push(name.clone()),
            }
        }
        serialized.sort();

        let mut known: Vec<String> = KEYS.iter().map(|(k, _)| k.to_string()).collect();
        known.sort();
        assert_eq!(known, serialized);
    }

    #[test]
    fn test_key_kind_unknown_lists_known() {
        assert_eq!(key_kind("render.tables").unwrap(), KeyKind::Flag);
        let err = key_kind("render.tabels").unwrap_err().to_string();
        assert!(err.contains("render.tabels"));
        assert!(err.contains("render.tables"));
    }

    // ------------------------------------------------------------------------
    // get
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_value_defaults() {
        let config = QuireConfig::default();
        assert_eq!(
            config_value(&config, "project_name").unwrap().as_deref(),
            Some("quire")
        );
        assert_eq!(
            config_value(&config, "render.footnotes").unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(config_value(&config, "content.path").unwrap(), None);
    }

    #[test]
    fn test_config_value_every_key() {
        let config = QuireConfig::default();
        for (key, _) in KEYS {
            assert!(config_value(&config, key).is_ok(), "{key}");
        }
    }

    #[test]
    fn test_cmd_config_get_rejects_unknown_key() {
        let (_dir, path) = config_file();
        let result = cmd_config_get(Some(path.to_str().unwrap()), "nonexistent.key");
        assert!(result.unwrap_err().to_string().contains("Unknown config key"));
    }

    #[test]
    fn test_cmd_config_get_known_key() {
        let (_dir, path) = config_file();
        assert!(cmd_config_get(Some(path.to_str().unwrap()), "check.require_date").is_ok());
        assert!(cmd_config_get(Some(path.to_str().unwrap()), "output.path").is_ok());
    }

    // ------------------------------------------------------------------------
    // set
    // ------------------------------------------------------------------------

    #[test]
    fn test_edit_config_flag_and_path() {
        let text = QuireConfig::default().to_toml_string().unwrap();
        let text = edit_config(&text, "render.tables", KeyKind::Flag, "off").unwrap();
        let text = edit_config(&text, "content.path", KeyKind::Path, "~/blog/_posts").unwrap();

        let config: QuireConfig = toml::from_str(&text).unwrap();
        assert!(!config.render.tables);
        assert_eq!(config.content.path.as_deref(), Some("~/blog/_posts"));
    }

    #[test]
    fn test_edit_config_creates_section() {
        let text = edit_config("", "check.require_language", KeyKind::Flag, "yes").unwrap();
        let config: QuireConfig = toml::from_str(&text).unwrap();
        assert!(config.check.require_language);
    }

    #[test]
    fn test_edit_config_rejects_bad_flag() {
        let err = edit_config("", "render.tables", KeyKind::Flag, "maybe").unwrap_err();
        assert!(err.to_string().contains("render.tables"));
    }

    #[test]
    fn test_edit_config_rejects_scalar_section() {
        let result = edit_config("render = 1\n", "render.tables", KeyKind::Flag, "true");
        assert!(result.is_err());
    }

    #[test]
    fn test_cmd_config_set_updates_file() {
        let (_dir, path) = config_file();
        let p = path.to_str().unwrap();
        cmd_config_set(Some(p), "check.require_date", "true").unwrap();
        cmd_config_set(Some(p), "project_name", "notes").unwrap();

        let config = QuireConfig::load(Some(p)).unwrap();
        assert!(config.check.require_date);
        assert_eq!(config.project_name, "notes");
    }

    #[test]
    fn test_cmd_config_set_unknown_key_leaves_file() {
        let (_dir, path) = config_file();
        let before = std::fs::read_to_string(&path).unwrap();

        let result = cmd_config_set(Some(path.to_str().unwrap()), "render.tabels", "false");
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_cmd_config_set_missing_file() {
        let result = cmd_config_set(Some("/nonexistent/config.toml"), "project_name", "x");
        assert!(result.unwrap_err().to_string().contains("config init"));
    }

    // ------------------------------------------------------------------------
    // path / init / export
    // ------------------------------------------------------------------------

    #[test]
    fn test_site_paths_follow_base_path() {
        let config = QuireConfig {
            base_path: Some("/srv/blog".into()),
            ..Default::default()
        };
        let lines = site_paths(&config).unwrap();
        assert_eq!(lines[0], "posts:   /srv/blog/_posts");
        assert_eq!(lines[1], "output:  /srv/blog/_site");
    }

    #[test]
    fn test_cmd_config_path_with_and_without_file() {
        let (_dir, path) = config_file();
        assert!(cmd_config_path(Some(path.to_str().unwrap())).is_ok());
        assert!(cmd_config_path(Some("/nonexistent/config.toml")).is_ok());
    }

    #[test]
    fn test_write_default_config_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quire").join("config.toml");
        cmd_config_init(Some(path.to_str().unwrap()), false).unwrap();

        let config: QuireConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config, QuireConfig::default());
    }

    #[test]
    fn test_write_default_config_force() {
        let (_dir, path) = config_file();
        std::fs::write(&path, "project_name = \"old\"\n").unwrap();

        let err = write_default_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        write_default_config(&path, true).unwrap();
        let config = QuireConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.project_name, "quire");
    }

    #[test]
    fn test_cmd_config_export() {
        assert!(cmd_config_export(&QuireConfig::default()).is_ok());
    }
}
