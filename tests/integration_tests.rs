//! Integration tests for chronicle
//!
//! These tests create temporary file structures to test the real functionality
//! of the project loader and manifest editing with actual filesystem
//! operations.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use chronicle::changelog;
use chronicle::cli::Cli;
use chronicle::config::{Settings, UserConfig};
use chronicle::manifest;
use chronicle::project::Project;
use chronicle::tag::Tag;
use clap::Parser;

/// Helper function to create a file with specified content
fn create_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Create a mock project directory with a full manifest
fn create_project(base_path: &Path, dir_name: &str, manifest: &str) -> PathBuf {
    let project_path = base_path.join(dir_name);
    create_file(&project_path.join("Cargo.toml"), manifest);

    project_path
}

#[test]
fn test_load_project_with_full_configuration() {
    let temp_dir = TempDir::new().unwrap();

    let project_path = create_project(
        temp_dir.path(),
        "fizzbuzz-dir",
        r#"[package]
name = "fizzbuzz-crate"
version = "0.3.1"
edition = "2024"

[package.metadata.chronicle]
name = "fizzbuzz"
tag_prefix = "rel-"
signed_tags = true
ignored_authors = ["dependabot[bot]"]

[dependencies]
anyhow = "1.0"
"#,
    );

    let project = Project::load(Some(&project_path)).unwrap();

    assert_eq!(project.name, "fizzbuzz");
    assert_eq!(project.config.len(), 4);

    let settings = Settings::from_table(&project.config).unwrap();
    assert_eq!(settings.tag_prefix.as_deref(), Some("rel-"));
    assert_eq!(settings.signed_tags, Some(true));
    assert_eq!(
        settings.ignored_authors,
        Some(vec!["dependabot[bot]".to_string()])
    );
}

#[test]
fn test_load_project_without_manifest_uses_directory_name() {
    let temp_dir = TempDir::new().unwrap();
    let project_path = temp_dir.path().join("bare-project");
    fs::create_dir_all(&project_path).unwrap();

    let project = Project::load(Some(&project_path)).unwrap();

    assert_eq!(project.name, "bare-project");
    assert!(project.config.is_empty());
}

#[test]
fn test_init_section_is_read_back_by_the_loader() {
    let temp_dir = TempDir::new().unwrap();

    let project_path = create_project(
        temp_dir.path(),
        "fresh",
        "[package]\nname = \"fresh-crate\"\nversion = \"0.1.0\"\n",
    );
    let manifest_path = project_path.join("Cargo.toml");

    // simulate `chronicle init`
    let content = fs::read_to_string(&manifest_path).unwrap();
    assert!(!manifest::has_tool_section(&content));

    let updated = manifest::write_tool_section(&content, "fresh");
    fs::write(&manifest_path, updated).unwrap();

    let project = Project::load(Some(&project_path)).unwrap();
    assert_eq!(project.name, "fresh");

    let settings = Settings::from_table(&project.config).unwrap();
    assert_eq!(settings.tag_prefix.as_deref(), Some("v"));
    assert_eq!(settings.signed_tags, Some(false));
}

#[test]
fn test_update_version_preserves_surrounding_manifest() {
    let temp_dir = TempDir::new().unwrap();

    let project_path = create_project(
        temp_dir.path(),
        "versioned",
        r#"# release metadata lives below
[package]
name = "versioned-crate"
version = "0.1.0"

[package.metadata.chronicle]
name = "versioned"

[dependencies]
serde = { version = "1" }
"#,
    );
    let manifest_path = project_path.join("Cargo.toml");

    let updated = manifest::update_version(&manifest_path, &"0.2.0".parse().unwrap()).unwrap();
    assert!(updated);

    let written = fs::read_to_string(&manifest_path).unwrap();
    assert!(written.contains("version = \"0.2.0\""));
    assert!(written.starts_with("# release metadata lives below"));
    assert!(written.contains("serde = { version = \"1\" }"));

    // the loader still sees the same project afterwards
    let project = Project::load(Some(&project_path)).unwrap();
    assert_eq!(project.name, "versioned");
}

#[test]
fn test_tag_prefix_layering_from_loaded_project() {
    let temp_dir = TempDir::new().unwrap();

    let project_path = create_project(
        temp_dir.path(),
        "layered",
        "[package.metadata.chronicle]\ntag_prefix = \"rel-\"\n",
    );

    let project = Project::load(Some(&project_path)).unwrap();
    let settings = Settings::from_table(&project.config).unwrap();
    let user_config = UserConfig::default();

    // the project section provides the prefix
    let cli = Cli::parse_from(["chronicle", "generate"]);
    assert_eq!(cli.tag_prefix(&settings, &user_config), "rel-");

    // an explicit CLI flag still wins
    let cli = Cli::parse_from(["chronicle", "--tag-prefix", "x-", "generate"]);
    assert_eq!(cli.tag_prefix(&settings, &user_config), "x-");
}

#[test]
fn test_changelog_render_uses_project_name() {
    let temp_dir = TempDir::new().unwrap();

    let project_path = create_project(
        temp_dir.path(),
        "release-notes",
        "[package.metadata.chronicle]\nname = \"fizzbuzz\"\n",
    );

    let project = Project::load(Some(&project_path)).unwrap();

    let tags = vec![Tag {
        name: "v1.0.0".to_string(),
        version: "1.0.0".parse().unwrap(),
        date: None,
        message: "first release".to_string(),
    }];

    let rendered = changelog::render(&project.name, &tags);

    assert!(rendered.starts_with("# Changelog: fizzbuzz"));
    assert!(rendered.contains("## v1.0.0"));
    assert!(rendered.contains("first release"));
}

#[test]
fn test_projects_with_equal_names_are_equal_across_directories() {
    let temp_dir = TempDir::new().unwrap();

    let first = create_project(
        temp_dir.path(),
        "dir-one",
        "[package.metadata.chronicle]\nname = \"same\"\n",
    );
    let second = create_project(
        temp_dir.path(),
        "dir-two",
        "[package.metadata.chronicle]\nname = \"same\"\n",
    );

    let p1 = Project::load(Some(&first)).unwrap();
    let p2 = Project::load(Some(&second)).unwrap();

    assert_eq!(p1, p2);
}
