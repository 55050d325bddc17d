//! # chronicle
//!
//! A CLI tool for generating changelogs and managing release tags from a
//! project's git history.
//!
//! The tool reads its per-project settings from the
//! `[package.metadata.chronicle]` table of `Cargo.toml`, lists the
//! repository's release tags, and renders them into a Markdown (or JSON)
//! changelog. It can also create the next release tag, bumping the manifest
//! version along the way, and print a contributor summary.
//!
//! ## Usage
//!
//! ```bash
//! # Print the changelog for the current directory
//! chronicle generate
//!
//! # Tag the next minor release, updating Cargo.toml
//! chronicle tag --bump minor
//!
//! # Show who contributed
//! chronicle contributors
//! ```

use std::{fs, path::Path, process::exit};

use anyhow::{Context, Result, bail};
use chronicle::{
    changelog::{self, JsonOutput},
    cli::{self, Cli, Command, GenerateArgs, TagArgs},
    config::{Settings, UserConfig},
    git::{CommandRunner, GitRunner},
    manifest,
    project::Project,
    tag::Tag,
    version::Version,
};
use clap::Parser;
use colored::Colorize;
use inquire::Confirm;
use tracing_subscriber::EnvFilter;

/// Entry point for the chronicle application.
///
/// This function handles all errors gracefully by calling [`inner_main`]
/// and printing any errors to stderr before exiting with a non-zero status
/// code.
fn main() {
    if let Err(err) = inner_main() {
        eprintln!("Error: {err:#}");
        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// This function:
/// 1. Parses command-line arguments and initializes logging
/// 2. Loads the user configuration file (if present)
/// 3. Loads the project from the target directory's manifest
/// 4. Resolves layered settings (CLI > project section > user config)
/// 5. Dispatches to the requested subcommand
///
/// # Errors
///
/// This function can return errors from manifest reading and parsing, git
/// invocations, interactive prompts, and file system operations.
fn inner_main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let user_config = match UserConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "Warning: failed to load config file:".yellow());
            UserConfig::default()
        }
    };

    let root = match args.base_path() {
        Some(path) => path,
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };

    let mut project = Project::load(Some(&root))?;

    let settings = match Settings::from_table(&project.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {e}", "Warning: invalid project settings:".yellow());
            Settings::default()
        }
    };

    let prefix = args.tag_prefix(&settings, &user_config);
    let runner = GitRunner::new(&root);

    match &args.command {
        Command::Init { yes } => run_init(&root, &project, *yes),
        Command::Generate(generate) => run_generate(&project, &runner, generate, &prefix),
        Command::Tag(tag_args) => {
            let signed = tag_args.signed(&settings, &user_config);
            run_tag(&root, &project, &runner, tag_args, &prefix, signed)
        }
        Command::Contributors { ignore_author } => {
            let ignored = cli::ignored_authors(ignore_author, &settings, &user_config);
            run_contributors(&mut project, &runner, &ignored)
        }
    }
}

/// Install the process-wide tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` raises the default
/// level from `warn` to `debug`. Diagnostics go to stderr so they never
/// mix with generated output on stdout.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Write the starter configuration section into the project manifest.
fn run_init(root: &Path, project: &Project, yes: bool) -> Result<()> {
    let manifest_path = root.join("Cargo.toml");

    if !manifest_path.exists() {
        bail!("no Cargo.toml found in {}", root.display());
    }

    let content = fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;

    if manifest::has_tool_section(&content) && !yes {
        let overwrite = Confirm::new("A chronicle section already exists. Rewrite it?")
            .with_default(false)
            .prompt()?;

        if !overwrite {
            println!("{}", "Left the existing configuration untouched.".yellow());

            return Ok(());
        }
    }

    let updated = manifest::write_tool_section(&content, &project.name);
    fs::write(&manifest_path, updated)
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;

    println!("{} {}", "Configured".green(), manifest_path.display());

    Ok(())
}

/// Render the changelog to stdout or the requested output file.
fn run_generate(
    project: &Project,
    runner: &dyn CommandRunner,
    args: &GenerateArgs,
    prefix: &str,
) -> Result<()> {
    let tags = Tag::all(runner, prefix)?;

    let rendered = if args.json {
        let output = JsonOutput::from_tags(&project.name, &tags);
        let mut text = serde_json::to_string_pretty(&output)?;
        text.push('\n');
        text
    } else {
        changelog::render(&project.name, &tags)
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;

            println!("{} {}", "Wrote".green(), path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

/// Create the next release tag, updating the manifest version first.
fn run_tag(
    root: &Path,
    project: &Project,
    runner: &dyn CommandRunner,
    args: &TagArgs,
    prefix: &str,
    signed: bool,
) -> Result<()> {
    let tags = Tag::all(runner, prefix)?;
    let latest = tags.first();

    let version = match (&args.version, args.bump) {
        (Some(version), _) => version.clone(),
        (None, Some(part)) => latest
            .map_or(Version::ZERO, |tag| tag.version.clone())
            .bump(part),
        (None, None) => bail!("either a version or --bump is required"),
    };

    if let Some(tag) = latest
        && version <= tag.version
    {
        bail!(
            "version {version} is not newer than the latest release {}",
            tag.name
        );
    }

    let name = format!("{prefix}{version}");
    let message = args
        .message
        .clone()
        .unwrap_or_else(|| format!("{} {version}", project.name));

    if args.dry_run {
        println!(
            "{} {}",
            "🧪 Dry run:".yellow(),
            format!("would create tag {name} with message {message:?}").bright_white()
        );

        return Ok(());
    }

    if !args.yes {
        let confirmed = Confirm::new(&format!("Create tag {name}?"))
            .with_default(true)
            .prompt()?;

        if !confirmed {
            println!("{}", "Aborted.".yellow());

            return Ok(());
        }
    }

    if manifest::update_version(&root.join("Cargo.toml"), &version)? {
        println!(
            "Updated manifest version to {}",
            version.to_string().bright_white()
        );
    }

    Tag::create(runner, &name, &message, signed)?;

    println!("{} {}", "Created tag".green(), name.bright_white().bold());

    Ok(())
}

/// Print the contributor summary, leaving out ignored authors.
fn run_contributors(
    project: &mut Project,
    runner: &dyn CommandRunner,
    ignored: &[String],
) -> Result<()> {
    let shortlog = project.shortlog(runner).to_owned();

    if shortlog.is_empty() {
        println!("{}", "No contributor data available.".yellow());

        return Ok(());
    }

    println!("{}", format!("Contributors to {}", project.name).bold());

    for line in shortlog.lines() {
        if ignored.iter().any(|author| line.contains(author.as_str())) {
            continue;
        }

        println!("{line}");
    }

    Ok(())
}
