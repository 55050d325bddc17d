//! Changelog rendering from release tags.

use std::fmt::Write as _;

use serde::Serialize;

use crate::tag::Tag;

/// Render the Markdown changelog for `project_name` from `tags`.
///
/// Tags are rendered in the order given (callers get them newest-first
/// from [`Tag::all`]): one section per release with the date and the tag
/// message.
#[must_use]
pub fn render(project_name: &str, tags: &[Tag]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Changelog: {project_name}");

    for tag in tags {
        let _ = writeln!(out, "\n## {}", tag.name);

        if let Some(date) = tag.date {
            let _ = writeln!(out, "\nReleased {}", date.format("%Y-%m-%d"));
        }

        if !tag.message.is_empty() {
            let _ = writeln!(out, "\n{}", tag.message);
        }
    }

    out
}

/// Machine-readable changelog, emitted by `generate --json`.
#[derive(Serialize, Debug)]
pub struct JsonOutput {
    /// Project display name
    pub project: String,

    /// Releases, newest first
    pub releases: Vec<JsonRelease>,
}

/// One release entry of [`JsonOutput`].
#[derive(Serialize, Debug)]
pub struct JsonRelease {
    pub tag: String,
    pub version: String,
    pub date: Option<String>,
    pub message: String,
}

impl JsonOutput {
    /// Build the JSON document from listed tags.
    #[must_use]
    pub fn from_tags(project_name: &str, tags: &[Tag]) -> Self {
        let releases = tags
            .iter()
            .map(|tag| JsonRelease {
                tag: tag.name.clone(),
                version: tag.version.to_string(),
                date: tag.date.map(|date| date.to_rfc3339()),
                message: tag.message.clone(),
            })
            .collect();

        Self {
            project: project_name.to_string(),
            releases,
        }
    }
}
