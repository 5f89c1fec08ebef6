//! Integration tests for configuration resolution and loading
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate FGB_CONFIG or XDG_CONFIG_HOME are marked with #[serial].

use fgb_common::config::{load_config, resolve_config_source, ConfigSource, CONFIG_ENV_VAR};
use fgb_common::{AnalysisConfig, Error, UnmatchedParticipantPolicy};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_argument_has_highest_priority() {
    let temp_dir = TempDir::new().unwrap();
    let cli_path = temp_dir.path().join("cli.toml");
    env::set_var(CONFIG_ENV_VAR, "/tmp/fgb-env-config.toml");

    let source = resolve_config_source(Some(&cli_path));
    assert_eq!(source, ConfigSource::CommandLine(cli_path));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/fgb-env-config.toml");

    let source = resolve_config_source(None);
    assert_eq!(
        source,
        ConfigSource::Environment("/tmp/fgb-env-config.toml".into())
    );

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_load_from_cli_file() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        unmatched_participant_policy = "fail"

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    let (config, source) = load_config(Some(&path)).unwrap();
    assert_eq!(source, ConfigSource::CommandLine(path));
    assert_eq!(config.unmatched_participant_policy, UnmatchedParticipantPolicy::Fail);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.stimuli, AnalysisConfig::default().stimuli);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");

    let result = load_config(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_invalid_toml_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "stimuli = [").unwrap();

    assert!(load_config(Some(&path)).is_err());
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = AnalysisConfig::default();
    let text = toml::to_string(&config).unwrap();
    let parsed = AnalysisConfig::from_toml_str(&text).unwrap();
    assert_eq!(parsed, config);
}

/// Point the per-user config directory at `dir` for the duration of `f`
///
/// `dirs` honours XDG_CONFIG_HOME on Linux only.
#[cfg(target_os = "linux")]
fn with_user_config_dir<F: FnOnce()>(dir: &std::path::Path, f: F) {
    let saved = env::var_os("XDG_CONFIG_HOME");
    env::remove_var(CONFIG_ENV_VAR);
    env::set_var("XDG_CONFIG_HOME", dir);

    f();

    match saved {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_user_config_file_used_when_present() {
    let temp_dir = TempDir::new().unwrap();
    let fgb_dir = temp_dir.path().join("fgb");
    fs::create_dir_all(&fgb_dir).unwrap();
    let path = fgb_dir.join("config.toml");
    fs::write(&path, "yates_correction = false\n").unwrap();

    with_user_config_dir(temp_dir.path(), || {
        assert_eq!(resolve_config_source(None), ConfigSource::UserFile(path.clone()));

        let (config, source) = load_config(None).unwrap();
        assert_eq!(source, ConfigSource::UserFile(path.clone()));
        assert!(!config.yates_correction);
    });
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_missing_user_config_falls_through_to_defaults() {
    let temp_dir = TempDir::new().unwrap();

    with_user_config_dir(temp_dir.path(), || {
        let (config, source) = load_config(None).unwrap();
        assert_eq!(source, ConfigSource::CompiledDefaults);
        assert_eq!(config, AnalysisConfig::default());
    });
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_unreadable_user_config_reports_fallback() {
    let temp_dir = TempDir::new().unwrap();
    // A directory where the file should be: exists, but cannot be read
    let path = temp_dir.path().join("fgb").join("config.toml");
    fs::create_dir_all(&path).unwrap();

    with_user_config_dir(temp_dir.path(), || {
        let (config, source) = load_config(None).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert!(source.is_fallback());
        assert!(matches!(
            source,
            ConfigSource::UnreadableUserFile { path: ref p, .. } if p == &path
        ));
        assert!(source.to_string().starts_with("compiled defaults"));
    });
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_unparsable_user_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let fgb_dir = temp_dir.path().join("fgb");
    fs::create_dir_all(&fgb_dir).unwrap();
    fs::write(fgb_dir.join("config.toml"), "[stimuli\nanalysis = ").unwrap();

    with_user_config_dir(temp_dir.path(), || {
        assert!(matches!(load_config(None), Err(Error::Config(_))));
    });
}
