//! Configuration sources and the layering between them.
//!
//! Settings come from up to three places, in precedence order:
//! **CLI argument > project tool section > user config file > default**.
//! This module holds the two file-backed sources: the typed view over the
//! project's `[package.metadata.chronicle]` table, and the optional
//! user-level defaults at `~/.config/chronicle/config.toml` (or the
//! platform-specific equivalent).
//!
//! # Example user config
//!
//! ```toml
//! tag_prefix = "v"
//! signed_tags = false
//! ignored_authors = ["dependabot[bot]"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use toml::Table;

/// Typed view over the project's tool section.
///
/// All fields are `Option<T>` so layered configuration can tell "set in the
/// section" apart from "absent". Unknown keys in the section are allowed
/// and ignored here; the raw table stays available on the project.
#[derive(Deserialize, Default, Debug, Clone)]
pub struct Settings {
    /// Project display name override
    pub name: Option<String>,

    /// Prefix of release tag names (e.g. `"v"` for `v1.2.0`)
    pub tag_prefix: Option<String>,

    /// Whether `tag` creates GPG-signed tags
    pub signed_tags: Option<bool>,

    /// Author names left out of the contributor summary
    pub ignored_authors: Option<Vec<String>>,
}

impl Settings {
    /// Deserialize the typed view from a raw settings table.
    ///
    /// # Errors
    ///
    /// Returns an error when a present key has the wrong type (e.g.
    /// `signed_tags = "yes"`); callers fall back to defaults with a
    /// warning in that case.
    pub fn from_table(table: &Table) -> Result<Self> {
        Ok(toml::Value::Table(table.clone()).try_into()?)
    }
}

/// User-level defaults from the configuration file.
#[derive(Deserialize, Default, Debug)]
pub struct UserConfig {
    /// Default release tag prefix
    pub tag_prefix: Option<String>,

    /// Default for GPG-signing created tags
    pub signed_tags: Option<bool>,

    /// Default authors left out of the contributor summary
    pub ignored_authors: Option<Vec<String>>,
}

impl UserConfig {
    /// Returns the path where the user configuration file is expected.
    ///
    /// The file lives at `<config_dir>/chronicle/config.toml`, where
    /// `<config_dir>` is the platform-specific configuration directory
    /// (e.g. `~/.config` on Linux/macOS, `%APPDATA%` on Windows).
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chronicle").join("config.toml"))
    }

    /// Load the user configuration from its default location.
    ///
    /// A missing file yields the default (empty) configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or contains
    /// invalid TOML.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("failed to read config file at {}: {e}", path.display())
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("failed to parse config file at {}: {e}", path.display())
        })?;

        Ok(config)
    }
}

/// Expand a leading `~` in a path to the user's home directory.
///
/// Paths that don't start with `~` are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}
