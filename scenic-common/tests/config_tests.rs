//! Unit tests for configuration loading and root folder resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate SCENIC_ROOT_FOLDER or SCENIC_CONFIG are marked with #[serial].

use scenic_common::config::{
    load_toml_config, load_toml_or_default, locate_config_file, LoggingConfig,
    RootFolderResolver, CONFIG_FILE_ENV, ROOT_FOLDER_ENV,
};
use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug, Default, Deserialize)]
struct SampleConfig {
    #[serde(default)]
    root_folder: Option<PathBuf>,
    #[serde(default)]
    logging: LoggingConfig,
}

#[test]
#[serial]
fn test_cli_override_beats_env_and_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");

    let resolved = RootFolderResolver::new("test")
        .with_cli_override(Some(PathBuf::from("/from/cli")))
        .with_toml_value(Some(PathBuf::from("/from/toml")))
        .resolve();
    assert_eq!(resolved, PathBuf::from("/from/cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");

    let resolved = RootFolderResolver::new("test")
        .with_toml_value(Some(PathBuf::from("/from/toml")))
        .resolve();
    assert_eq!(resolved, PathBuf::from("/from/env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_blank_env_falls_through_to_toml() {
    env::set_var(ROOT_FOLDER_ENV, "  ");

    let resolved = RootFolderResolver::new("test")
        .with_toml_value(Some(PathBuf::from("/from/toml")))
        .resolve();
    assert_eq!(resolved, PathBuf::from("/from/toml"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolved = RootFolderResolver::new("test").resolve();
    assert_eq!(resolved, scenic_common::config::get_default_root_folder());
}

#[test]
fn test_load_toml_config_parses_fields() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sample.toml");
    std::fs::write(
        &path,
        "root_folder = \"/music\"\n\n[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();

    let config: SampleConfig = load_toml_config(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/music")));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_missing_file_degrades_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");

    let config: SampleConfig = load_toml_or_default(Some(&path)).unwrap();
    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_malformed_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "root_folder = [unterminated").unwrap();

    let result: scenic_common::Result<SampleConfig> = load_toml_or_default(Some(&path));
    assert!(matches!(result, Err(scenic_common::Error::Config(_))));
}

#[test]
fn test_unreadable_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    // A directory exists but cannot be read as a file
    let result: scenic_common::Result<SampleConfig> = load_toml_config(temp_dir.path());
    assert!(matches!(result, Err(scenic_common::Error::Io(_))));
}

#[test]
#[serial]
fn test_locate_config_prefers_explicit_then_env() {
    env::set_var(CONFIG_FILE_ENV, "/env/scenic-gr.toml");

    let explicit = PathBuf::from("/cli/scenic-gr.toml");
    assert_eq!(
        locate_config_file(Some(&explicit), "scenic-gr"),
        Some(explicit.clone())
    );
    assert_eq!(
        locate_config_file(None, "scenic-gr"),
        Some(PathBuf::from("/env/scenic-gr.toml"))
    );

    env::remove_var(CONFIG_FILE_ENV);
}
