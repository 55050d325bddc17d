//! Project identity and configuration loading.
//!
//! A [`Project`] ties together the three things every command needs: a
//! display name, the settings table read from the project manifest, and a
//! lazily fetched contributor summary. Settings live in the
//! `[package.metadata.chronicle]` table of `Cargo.toml`; a missing manifest
//! or a missing table is not an error, the project simply falls back to the
//! name of its directory.

use std::{
    fmt::{Display, Formatter},
    fs,
    path::Path,
};

use anyhow::{Context, Result};
use toml::Table;
use tracing::error;

use crate::git::CommandRunner;

/// File read for project settings.
const MANIFEST_FILE: &str = "Cargo.toml";

/// Key of the tool's table under `[package.metadata]`.
const TOOL_SECTION: &str = "chronicle";

/// One source project: its name, its settings, and a memoized shortlog.
///
/// Instances are immutable after construction except for the one-time
/// shortlog memoization. Two projects are equal iff their names are equal;
/// the settings table does not participate in equality.
#[derive(Debug)]
pub struct Project {
    /// Display name, from the tool section or the project directory
    pub name: String,

    /// Full contents of the tool section; empty when none was found
    pub config: Table,

    /// Lazily computed contributor summary, unset until first accessed
    shortlog: Option<String>,
}

impl Project {
    /// Command producing the contributor summary, run in the project root.
    pub const SHORTLOG_CMD: &'static [&'static str] = &["git", "shortlog", "-s", "HEAD"];

    /// Create a project with the given name and an empty settings table.
    ///
    /// No I/O occurs; use [`Project::load`] to read the manifest.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Table::new(),
            shortlog: None,
        }
    }

    /// Create a project with an explicit settings table.
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: Table) -> Self {
        Self {
            name: name.into(),
            config,
            shortlog: None,
        }
    }

    /// Load the project rooted at `base_path`, or at the current working
    /// directory when `None`.
    ///
    /// A missing manifest, an empty manifest, and an absent or empty tool
    /// section are all normal: the result is a project named after the base
    /// directory with an empty settings table. When the section is present,
    /// its `name` key wins over the directory name and the whole section
    /// becomes [`Project::config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved, the
    /// manifest exists but cannot be read, or its contents are not valid
    /// TOML.
    pub fn load(base_path: Option<&Path>) -> Result<Self> {
        let base = match base_path {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir().context("failed to resolve current directory")?,
        };

        let manifest = base.join(MANIFEST_FILE);

        if !manifest.exists() {
            return Ok(Self::new(dir_name(&base)));
        }

        let content = fs::read_to_string(&manifest)
            .with_context(|| format!("failed to read {}", manifest.display()))?;
        let section = tool_section(&content)
            .with_context(|| format!("failed to parse {}", manifest.display()))?;

        match section {
            Some(table) if !table.is_empty() => {
                let name = table
                    .get("name")
                    .and_then(toml::Value::as_str)
                    .map_or_else(|| dir_name(&base), ToString::to_string);

                Ok(Self::with_config(name, table))
            }
            _ => Ok(Self::new(dir_name(&base))),
        }
    }

    /// The contributor summary for this project's repository.
    ///
    /// Computed at most once per instance: the first access runs
    /// [`Project::SHORTLOG_CMD`] through `runner` and caches the result.
    /// A failing command is logged and cached as the empty string, so a
    /// failed lookup is not retried either; a fresh instance is the only
    /// way to re-attempt it.
    pub fn shortlog(&mut self, runner: &dyn CommandRunner) -> &str {
        self.shortlog
            .get_or_insert_with(|| match runner.output(Self::SHORTLOG_CMD) {
                Ok(text) => text,
                Err(err) => {
                    error!("shortlog command failed: {err}");
                    String::new()
                }
            })
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Project {}

impl Display for Project {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Parse the manifest and extract the tool's metadata table, if any.
fn tool_section(content: &str) -> Result<Option<Table>> {
    if content.trim().is_empty() {
        return Ok(None);
    }

    let manifest: toml::Value = toml::from_str(content)?;

    let section = manifest
        .get("package")
        .and_then(|package| package.get("metadata"))
        .and_then(|metadata| metadata.get(TOOL_SECTION))
        .and_then(toml::Value::as_table);

    Ok(section.cloned())
}

/// Final path component of `base`, resolving the path first when it has
/// none (e.g. `.`).
fn dir_name(base: &Path) -> String {
    if let Some(name) = base.file_name().and_then(|name| name.to_str()) {
        return name.to_string();
    }

    base.canonicalize()
        .ok()
        .and_then(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(ToString::to_string)
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::git::test_support::FakeRunner;

    fn table(content: &str) -> Table {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_project_eq() {
        let p1 = Project::new("foo");
        let p2 = Project::new("bar");
        let p3 = Project::new("foo");

        assert_ne!(p1, p2);
        assert_eq!(p1, p3);
    }

    #[test]
    fn test_project_eq_ignores_config() {
        let p1 = Project::new("foo");
        let p2 = Project::with_config("foo", table(r#"tag_prefix = "rel-""#));

        assert_eq!(p1, p2);
    }

    #[test]
    fn test_shortlog_success_is_cached() {
        let runner = FakeRunner::new();
        runner.push_ok("  10 Foo Bar");

        let mut project = Project::new("foo");

        assert_eq!(project.shortlog(&runner), "  10 Foo Bar");
        assert_eq!(runner.call_count(), 1);
        assert_eq!(runner.calls()[0], Project::SHORTLOG_CMD);

        // cached value, no second invocation
        assert_eq!(project.shortlog(&runner), "  10 Foo Bar");
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn test_shortlog_failure_is_cached_as_empty() {
        let runner = FakeRunner::new();
        runner.push_err(128);

        let mut project = Project::new("foo");

        assert_eq!(project.shortlog(&runner), "");
        assert_eq!(runner.call_count(), 1);

        // the failure is terminal for this instance
        assert_eq!(project.shortlog(&runner), "");
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn test_shortlog_caches_are_per_instance() {
        let runner = FakeRunner::new();
        runner.push_err(128);
        runner.push_ok("   3 Baz Qux");

        let mut first = Project::new("foo");
        assert_eq!(first.shortlog(&runner), "");

        // a fresh instance retries independently of the failed one
        let mut second = Project::new("foo");
        assert_eq!(second.shortlog(&runner), "   3 Baz Qux");
        assert_eq!(runner.call_count(), 2);

        assert_eq!(first.shortlog(&runner), "");
        assert_eq!(runner.call_count(), 2);
    }

    #[test]
    fn test_load_reads_tool_section() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("Cargo.toml"),
            r#"
[package]
name = "fizzbuzz-crate"
version = "0.1.0"

[package.metadata.chronicle]
name = "fizzbuzz"
"#,
        )
        .unwrap();

        let project = Project::load(Some(tmp.path())).unwrap();

        assert_eq!(project.name, "fizzbuzz");
        assert_eq!(project.config, table(r#"name = "fizzbuzz""#));
    }

    #[test]
    fn test_load_section_without_name_falls_back_to_directory() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("my-project");
        fs::create_dir(&root).unwrap();
        fs::write(
            root.join("Cargo.toml"),
            "[package.metadata.chronicle]\ntag_prefix = \"rel-\"\n",
        )
        .unwrap();

        let project = Project::load(Some(&root)).unwrap();

        assert_eq!(project.name, "my-project");
        assert_eq!(project.config, table(r#"tag_prefix = "rel-""#));
    }

    #[test]
    fn test_load_empty_section_falls_back_to_directory() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("hollow");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("Cargo.toml"), "[package.metadata.chronicle]\n").unwrap();

        let project = Project::load(Some(&root)).unwrap();

        assert_eq!(project.name, "hollow");
        assert!(project.config.is_empty());
    }

    #[test]
    fn test_load_manifest_without_section() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("plain");
        fs::create_dir(&root).unwrap();
        fs::write(
            root.join("Cargo.toml"),
            "[package]\nname = \"plain-crate\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();

        let project = Project::load(Some(&root)).unwrap();

        assert_eq!(project.name, "plain");
        assert!(project.config.is_empty());
    }

    #[test]
    fn test_load_empty_manifest() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("empty");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("Cargo.toml"), "\n").unwrap();

        let project = Project::load(Some(&root)).unwrap();

        assert_eq!(project.name, "empty");
        assert!(project.config.is_empty());
    }

    #[test]
    fn test_load_missing_manifest() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("bare");
        fs::create_dir(&root).unwrap();

        let project = Project::load(Some(&root)).unwrap();

        assert_eq!(project.name, "bare");
        assert!(project.config.is_empty());
    }

    #[test]
    fn test_load_malformed_manifest_errors() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Cargo.toml"), "not [ valid toml").unwrap();

        assert!(Project::load(Some(tmp.path())).is_err());
    }

    #[test]
    fn test_load_defaults_to_current_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("Cargo.toml"),
            "[package.metadata.chronicle]\nname = \"cwd-project\"\n",
        )
        .unwrap();

        std::env::set_current_dir(tmp.path()).unwrap();
        let project = Project::load(None).unwrap();

        assert_eq!(project.name, "cwd-project");
    }
}
