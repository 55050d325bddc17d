//! Line-based edits to `Cargo.toml`.
//!
//! Both edits here (bumping the `[package]` version and writing the tool's
//! metadata section) rewrite individual lines instead of round-tripping the
//! file through a TOML parser, so comments, ordering, and formatting of
//! everything else survive untouched.

use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::version::Version;

/// Header line of the tool's configuration section.
pub const TOOL_SECTION_HEADER: &str = "[package.metadata.chronicle]";

/// Rewrite the `[package]` `version` field of the manifest at `path`.
///
/// Returns `true` when a version field was found (and now carries
/// `version`), `false` when the manifest or the field is absent; the
/// absent case is a no-op, not an error. Version fields of other sections
/// (dependencies, metadata) are never touched.
///
/// # Errors
///
/// Returns an error when the manifest exists but cannot be read or
/// written.
pub fn update_version(path: &Path, version: &Version) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let Some(updated) = rewrite_version(&content, version) else {
        return Ok(false);
    };

    if updated != content {
        fs::write(path, updated)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(true)
}

/// Replace the first `version = …` line inside `[package]`, or return
/// `None` when there is none.
fn rewrite_version(content: &str, version: &Version) -> Option<String> {
    let mut out = String::with_capacity(content.len());
    let mut in_package = false;
    let mut replaced = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') {
            in_package = trimmed == "[package]";
        }

        if in_package && !replaced && is_version_line(trimmed) {
            out.push_str(&format!("version = \"{version}\""));
            replaced = true;
        } else {
            out.push_str(line);
        }

        out.push('\n');
    }

    replaced.then_some(out)
}

/// Check if a line assigns the plain `version` field.
fn is_version_line(line: &str) -> bool {
    line.strip_prefix("version")
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

/// Check whether the manifest content already has a tool section.
#[must_use]
pub fn has_tool_section(content: &str) -> bool {
    content
        .lines()
        .any(|line| line.trim() == TOOL_SECTION_HEADER)
}

/// Return the manifest content with a starter tool section for `name`.
///
/// An existing section is replaced wholesale (header up to the next
/// section header); otherwise the section is appended at the end.
#[must_use]
pub fn write_tool_section(content: &str, name: &str) -> String {
    let section = starter_section(name);

    if !has_tool_section(content) {
        let mut out = content.trim_end().to_string();

        if !out.is_empty() {
            out.push_str("\n\n");
        }

        out.push_str(&section);
        return out;
    }

    let mut out = String::with_capacity(content.len() + section.len());
    let mut skipping = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed == TOOL_SECTION_HEADER {
            skipping = true;
            out.push_str(&section);
            continue;
        }

        if skipping {
            if trimmed.starts_with('[') {
                skipping = false;
                out.push('\n');
            } else {
                continue;
            }
        }

        out.push_str(line);
        out.push('\n');
    }

    out
}

fn starter_section(name: &str) -> String {
    format!(
        "{TOOL_SECTION_HEADER}\nname = \"{name}\"\ntag_prefix = \"v\"\nsigned_tags = false\n"
    )
}
