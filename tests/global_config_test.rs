//! Integration tests for global configuration and directory resolution

use std::path::PathBuf;
use std::time::Duration;

use pkgcache::core::global_config::{GlobalConfig, GlobalConfigError};
use pkgcache::core::write_behind::WriteBehindConfig;
use pkgcache::infra::dirs::CacheDirs;
use proptest::prelude::*;
use tempfile::TempDir;

fn dirs_in(temp: &TempDir) -> CacheDirs {
    CacheDirs::with_paths(temp.path().join("cache"), temp.path().join("config"))
}

#[test]
fn test_missing_config_gives_defaults() {
    let temp = TempDir::new().unwrap();
    let dirs = dirs_in(&temp);

    let config = GlobalConfig::load(&dirs).unwrap();

    assert_eq!(config.storage_root(&dirs), temp.path().join("cache").join("dumps"));
    assert_eq!(config.write_behind_config(), WriteBehindConfig::default());
}

#[test]
fn test_partial_write_behind_overrides() {
    let temp = TempDir::new().unwrap();
    let dirs = dirs_in(&temp);
    std::fs::create_dir_all(dirs.config_dir()).unwrap();
    std::fs::write(
        dirs.global_config_path(),
        "[write_behind]\ndrain_interval_ms = 250\nstop_watchdog = 8\n",
    )
    .unwrap();

    let timing = GlobalConfig::load(&dirs).unwrap().write_behind_config();

    assert_eq!(timing.drain_period, Duration::from_millis(250));
    assert_eq!(timing.stop_watchdog, 8);
    assert_eq!(timing.poll_interval, WriteBehindConfig::default().poll_interval);
    assert_eq!(timing.sync_watchdog, WriteBehindConfig::default().sync_watchdog);
}

#[test]
fn test_save_then_load_keeps_settings() {
    let temp = TempDir::new().unwrap();
    let dirs = dirs_in(&temp);

    let mut config = GlobalConfig::default();
    config.storage.root = Some(PathBuf::from("/srv/pkgcache"));
    config.write_behind.poll_interval_ms = Some(20);
    config.save(&dirs).unwrap();

    let loaded = GlobalConfig::load(&dirs).unwrap();
    assert_eq!(loaded.storage_root(&dirs), PathBuf::from("/srv/pkgcache"));
    assert_eq!(
        loaded.write_behind_config().poll_interval,
        Duration::from_millis(20)
    );
}

#[test]
fn test_unknown_type_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[write_behind]\ndrain_interval_ms = \"soon\"\n").unwrap();

    assert!(matches!(
        GlobalConfig::load_from_path(&path),
        Err(GlobalConfigError::ParseError { .. })
    ));
}

#[test]
fn test_zero_intervals_are_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");

    for content in [
        "[write_behind]\ndrain_interval_ms = 0\n",
        "[write_behind]\npoll_interval_ms = 0\n",
        "[write_behind]\ndrain_interval_ms = 0\npoll_interval_ms = 0\n",
    ] {
        std::fs::write(&path, content).unwrap();
        let err = GlobalConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, GlobalConfigError::ParseError { .. }));
        assert!(err.to_string().contains("must be greater than zero"), "{err}");
    }
}

#[test]
fn test_zero_time_unit_is_clamped() {
    let timing = WriteBehindConfig::with_time_unit(Duration::ZERO);
    assert_eq!(timing.drain_period, Duration::from_millis(1));
    assert_eq!(timing.poll_interval, Duration::from_millis(1));
}

#[test]
fn test_dirs_with_paths() {
    let dirs = CacheDirs::with_paths(PathBuf::from("/c"), PathBuf::from("/cfg"));
    assert_eq!(dirs.cache_dir(), PathBuf::from("/c"));
    assert_eq!(dirs.dump_dir(), PathBuf::from("/c/dumps"));
    assert_eq!(dirs.global_config_path(), PathBuf::from("/cfg/config.toml"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_drain_interval_override_is_applied(ms in 1u64..100_000) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, format!("[write_behind]\ndrain_interval_ms = {ms}\n")).unwrap();

        let timing = GlobalConfig::load_from_path(&path).unwrap().write_behind_config();
        prop_assert_eq!(timing.drain_period, Duration::from_millis(ms));
    }
}
