use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    config::{Settings, UserConfig, expand_tilde},
    version::{Bump, Version},
};

/// Hardcoded default for the release tag prefix.
const DEFAULT_TAG_PREFIX: &str = "v";

#[derive(Parser)]
#[command(name = "chronicle")]
#[command(about = "Generate changelogs and manage release tags from git history")]
#[command(version)]
pub struct Cli {
    /// The project directory to operate on (defaults to the current directory)
    #[arg(short = 'C', long = "path", global = true)]
    path: Option<PathBuf>,

    /// Prefix of release tag names
    #[arg(long, global = true)]
    tag_prefix: Option<String>,

    /// Show debug output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a starter configuration section into Cargo.toml
    Init {
        /// Rewrite an existing section without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Render the changelog built from release tags
    Generate(GenerateArgs),

    /// Create a release tag and update the manifest version
    Tag(TagArgs),

    /// Show the contributor summary for the repository
    Contributors {
        /// Author names to leave out of the summary
        #[arg(long, action = clap::ArgAction::Append)]
        ignore_author: Vec<String>,
    },
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Write the output to a file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Emit machine-readable JSON instead of Markdown
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TagArgs {
    /// Version for the new tag (e.g. 1.2.0)
    #[arg(conflicts_with = "bump")]
    pub version: Option<Version>,

    /// Bump the given part of the latest released version instead
    #[arg(short = 'b', long, value_enum)]
    pub bump: Option<Bump>,

    /// Tag message (defaults to "<project> <version>")
    #[arg(short = 'm', long)]
    pub message: Option<String>,

    /// Create a GPG-signed tag
    #[arg(long)]
    pub sign: bool,

    /// Don't ask for confirmation before tagging
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Report what would happen without touching the repository
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn base_path(&self) -> Option<PathBuf> {
        self.path.as_deref().map(expand_tilde)
    }

    pub fn tag_prefix(&self, settings: &Settings, user: &UserConfig) -> String {
        self.tag_prefix
            .clone()
            .or_else(|| settings.tag_prefix.clone())
            .or_else(|| user.tag_prefix.clone())
            .unwrap_or_else(|| DEFAULT_TAG_PREFIX.to_string())
    }
}

impl TagArgs {
    pub fn signed(&self, settings: &Settings, user: &UserConfig) -> bool {
        self.sign || settings.signed_tags.or(user.signed_tags).unwrap_or(false)
    }
}

/// Resolve the contributor ignore list: explicit CLI names win, then the
/// project section, then the user config.
#[must_use]
pub fn ignored_authors(
    cli_ignores: &[String],
    settings: &Settings,
    user: &UserConfig,
) -> Vec<String> {
    if !cli_ignores.is_empty() {
        return cli_ignores.to_vec();
    }

    settings
        .ignored_authors
        .clone()
        .or_else(|| user.ignored_authors.clone())
        .unwrap_or_default()
}
