//! Configuration resolution tests
//!
//! Tests that manipulate SONGQUIZ_CONFIG or XDG_CONFIG_HOME are marked with
//! #[serial] so they never run in parallel.

use serial_test::serial;
use songquiz_common::config::{resolve_config_path, ConfigSource, CONFIG_ENV_VAR};
use songquiz_common::{Error, SongquizConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_config(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Resolution Priority
// ============================================================================

#[test]
#[serial]
fn test_cli_path_overrides_env() {
    let dir = TempDir::new().unwrap();
    let cli = write_config(dir.path(), "cli.toml", "[matching]\ndedup_threshold = 0.7");
    let env = write_config(dir.path(), "env.toml", "[matching]\ndedup_threshold = 0.6");
    std::env::set_var(CONFIG_ENV_VAR, &env);

    let config = SongquizConfig::load(Some(cli.as_path())).unwrap();
    assert_eq!(config.matching.dedup_threshold, 0.7);

    std::env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    let dir = TempDir::new().unwrap();
    let env = write_config(dir.path(), "env.toml", "[tags]\nmin_weight = 40");
    std::env::set_var(CONFIG_ENV_VAR, &env);

    assert_eq!(resolve_config_path(None), ConfigSource::Environment(env.clone()));
    let config = SongquizConfig::load(None).unwrap();
    assert_eq!(config.tags.min_weight, 40);

    std::env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    std::env::set_var(CONFIG_ENV_VAR, "  ");
    assert!(!matches!(resolve_config_path(None), ConfigSource::Environment(_)));
    std::env::remove_var(CONFIG_ENV_VAR);
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_default_location_missing_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    std::env::remove_var(CONFIG_ENV_VAR);
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    assert_eq!(
        resolve_config_path(None),
        ConfigSource::DefaultLocation(dir.path().join("songquiz").join("config.toml"))
    );
    let config = SongquizConfig::load(None).unwrap();
    assert_eq!(config, SongquizConfig::default());

    std::env::remove_var("XDG_CONFIG_HOME");
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_default_location_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("songquiz")).unwrap();
    write_config(
        &dir.path().join("songquiz"),
        "config.toml",
        "[logging]\nlevel = \"debug\"",
    );
    std::env::remove_var(CONFIG_ENV_VAR);
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    let config = SongquizConfig::load(None).unwrap();
    assert_eq!(config.logging.level, "debug");

    std::env::remove_var("XDG_CONFIG_HOME");
}

// ============================================================================
// Explicit File Errors
// ============================================================================

#[test]
#[serial]
fn test_missing_explicit_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = SongquizConfig::load(Some(missing.as_path())).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
#[serial]
fn test_missing_env_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    std::env::set_var(CONFIG_ENV_VAR, dir.path().join("gone.toml"));

    assert!(matches!(SongquizConfig::load(None), Err(Error::Config(_))));

    std::env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_unparsable_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let bad = write_config(dir.path(), "bad.toml", "[matching\ntitle_min_shared = ");

    let err = SongquizConfig::load(Some(bad.as_path())).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("bad.toml"));
}

#[test]
#[serial]
fn test_invalid_values_in_file_are_config_error() {
    let dir = TempDir::new().unwrap();
    let bad = write_config(dir.path(), "bad.toml", "[taxonomy.extra]\ncountry = [\"x\"]");

    assert!(matches!(SongquizConfig::load(Some(bad.as_path())), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_full_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        "full.toml",
        r#"
[logging]
level = "warn"

[matching]
title_min_shared = 2
artist_min_shared = 1
dedup_threshold = 0.85

[tags]
min_weight = 30
ignored = ["seen live", "awesome"]

[taxonomy.extra]
"hip hop" = ["chicago drill"]
"#,
    );

    let config = SongquizConfig::from_file(&path).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.tags.min_weight, 30);
    assert_eq!(config.tags.ignored, vec!["seen live", "awesome"]);
    assert_eq!(config.taxonomy.extra["hip hop"], vec!["chicago drill"]);
}
