//! Release tags read from and written to the local repository.
//!
//! A release tag is any tag whose name, after removing the configured
//! prefix, parses as a [`Version`]. Everything else (deploy markers,
//! branch-like tags) is skipped during listing.

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::{git::CommandRunner, version::Version};

/// One release tag with its metadata.
#[derive(Clone, Debug)]
pub struct Tag {
    /// Full tag name as it appears in the repository (prefix included)
    pub name: String,

    /// Version parsed from the name with the prefix removed
    pub version: Version,

    /// Tag creation date, when git reports one that parses
    pub date: Option<DateTime<FixedOffset>>,

    /// Annotated tag message (or the tagged commit's message for
    /// lightweight tags), trimmed
    pub message: String,
}

impl Tag {
    /// List the repository's release tags, newest version first.
    ///
    /// Tag names that do not parse as versions after stripping `prefix`
    /// are skipped with a debug log line. For each release tag one extra
    /// lookup fetches its creation date and message.
    ///
    /// # Errors
    ///
    /// Returns an error when any of the underlying git invocations fails.
    pub fn all(runner: &dyn CommandRunner, prefix: &str) -> Result<Vec<Self>> {
        let listing = runner.output(&["git", "tag", "--list"])?;

        let mut tags = Vec::new();

        for name in listing.lines().map(str::trim).filter(|name| !name.is_empty()) {
            let stripped = name.strip_prefix(prefix).unwrap_or(name);

            let Ok(version) = stripped.parse::<Version>() else {
                debug!("skipping tag {name}: not a release version");
                continue;
            };

            let date_raw = runner.output(&[
                "git",
                "tag",
                "--list",
                "--format",
                "%(creatordate:iso-strict)",
                name,
            ])?;
            let date = DateTime::parse_from_rfc3339(date_raw.trim()).ok();

            let message =
                runner.output(&["git", "tag", "--list", "--format", "%(contents)", name])?;

            tags.push(Self {
                name: name.to_string(),
                version,
                date,
                message: message.trim().to_string(),
            });
        }

        tags.sort_by(|a, b| b.version.cmp(&a.version));

        Ok(tags)
    }

    /// Create an annotated (or GPG-signed) tag named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when the git invocation fails, e.g. because the
    /// tag already exists or signing is not configured.
    pub fn create(
        runner: &dyn CommandRunner,
        name: &str,
        message: &str,
        signed: bool,
    ) -> Result<()> {
        let flag = if signed { "-s" } else { "-a" };

        runner.output(&["git", "tag", flag, "-m", message, name])?;

        Ok(())
    }
}
