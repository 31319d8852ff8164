//! Integration tests for environment-driven configuration.

use serial_test::serial;
use thread_consolidator::config::{Config, ConfigError};
use thread_consolidator::thread::ClassifierPolicy;

const VARS: &[&str] = &[
    "THREAD_WINDOW_SECS",
    "THREAD_POLICY",
    "RAW_DATA_DIR",
    "PROCESSED_DATA_DIR",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults() {
    clear_env();
    let config = Config::from_env().unwrap();
    assert_eq!(config.window_seconds, 120);
    assert_eq!(config.policy, ClassifierPolicy::WindowOnly);
    assert_eq!(config.raw_data_dir, std::path::PathBuf::from("../data/raw"));
    assert_eq!(
        config.processed_data_dir,
        std::path::PathBuf::from("../data/processed")
    );
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_overrides() {
    clear_env();
    std::env::set_var("THREAD_WINDOW_SECS", "90");
    std::env::set_var("THREAD_POLICY", "heuristic");
    std::env::set_var("PROCESSED_DATA_DIR", "/tmp/processed");
    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.window_seconds, 90);
    assert_eq!(config.policy, ClassifierPolicy::HeuristicAugmented);
    assert_eq!(config.engine_options().window_seconds, 90);
    assert_eq!(
        config.processed_data_dir,
        std::path::PathBuf::from("/tmp/processed")
    );
}

#[test]
#[serial]
fn test_invalid_values() {
    clear_env();
    std::env::set_var("THREAD_WINDOW_SECS", "two minutes");
    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::ParseInt { .. }));

    std::env::set_var("THREAD_WINDOW_SECS", "0");
    let config = Config::from_env().unwrap();
    assert!(config.validate().is_err());

    std::env::set_var("THREAD_WINDOW_SECS", "120");
    std::env::set_var("THREAD_POLICY", "semantic");
    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    clear_env();
}
