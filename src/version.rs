//! Semantic version strings and bump operations.
//!
//! Versions follow the `MAJOR.MINOR.PATCH` shape with an optional
//! pre-release suffix (`1.2.0-rc.1`). A leading `v` is accepted on input so
//! that tag names parse directly, but is never part of the value itself;
//! tag prefixes are applied when composing tag names.

use std::{cmp::Ordering, fmt, str::FromStr};

use anyhow::{Context, Error, Result, bail};
use clap::ValueEnum;

/// Which component of a version to increment.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum Bump {
    /// Increment the major version and reset minor and patch
    Major,

    /// Increment the minor version and reset patch
    Minor,

    /// Increment the patch version
    Patch,
}

/// A parsed semantic version.
///
/// Ordering is numeric on the `(major, minor, patch)` triple; a pre-release
/// sorts before the release it precedes, and two pre-releases of the same
/// triple compare lexically.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl Version {
    /// The starting point for repositories with no releases yet.
    pub const ZERO: Self = Self {
        major: 0,
        minor: 0,
        patch: 0,
        pre: None,
    };

    /// Return the version with the given component incremented.
    ///
    /// Bumping always clears the pre-release component, so bumping a
    /// pre-release yields the next full release.
    #[must_use]
    pub fn bump(&self, part: Bump) -> Self {
        match part {
            Bump::Major => Self {
                major: self.major + 1,
                minor: 0,
                patch: 0,
                pre: None,
            },
            Bump::Minor => Self {
                major: self.major,
                minor: self.minor + 1,
                patch: 0,
                pre: None,
            },
            Bump::Patch => Self {
                major: self.major,
                minor: self.minor,
                patch: self.patch + 1,
                pre: None,
            },
        }
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let (core, pre) = match trimmed.split_once('-') {
            Some((_, "")) => bail!("empty pre-release in version {input:?}"),
            Some((core, pre)) => (core, Some(pre.to_string())),
            None => (trimmed, None),
        };

        let mut parts = core.split('.');
        let (Some(major), Some(minor), Some(patch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            bail!("expected MAJOR.MINOR.PATCH in version {input:?}");
        };

        Ok(Self {
            major: parse_component(major, input)?,
            minor: parse_component(minor, input)?,
            patch: parse_component(patch, input)?,
            pre,
        })
    }
}

fn parse_component(part: &str, input: &str) -> Result<u64> {
    part.parse()
        .with_context(|| format!("invalid version component {part:?} in {input:?}"))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }

        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
