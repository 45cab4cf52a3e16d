// tests/config.rs
use std::{env, fs};

use artist_timeline::config::{
    TimelineConfig, DEFAULT_BIND_ADDR, ENV_BIND_ADDR, ENV_CONCERTS_API_KEY,
    ENV_REFRESH_INTERVAL_SECS, ENV_STATE_DIR, ENV_TIMELINE_CONFIG_PATH,
};

fn clear_env() {
    for k in [
        ENV_TIMELINE_CONFIG_PATH,
        ENV_BIND_ADDR,
        ENV_STATE_DIR,
        ENV_CONCERTS_API_KEY,
        ENV_REFRESH_INTERVAL_SECS,
    ] {
        env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn missing_file_gives_defaults() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    env::set_var(ENV_TIMELINE_CONFIG_PATH, tmp.path().join("nope.toml"));

    let cfg = TimelineConfig::load().unwrap();
    assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
    assert_eq!(cfg.refresh.interval_secs, 300);
    assert_eq!(cfg.cache.max_timeline_size, 100);
    assert_eq!(cfg.concerts.endpoint, None);
    assert!(!cfg.artists.defaults.is_empty());
    clear_env();
}

#[serial_test::serial]
#[test]
fn file_then_env_overrides() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("timeline.toml");
    fs::write(
        &path,
        r#"
bind_addr = "127.0.0.1:9000"
state_dir = "/var/lib/timeline"

[refresh]
interval_secs = 60
staleness_secs = 600

[concerts]
endpoint = "https://tickets.example/search"
api_key = "from-file"

[[news.outlets]]
name = "Soompi"
url = "https://www.soompi.com/feed"
"#,
    )
    .unwrap();
    env::set_var(ENV_TIMELINE_CONFIG_PATH, &path);
    env::set_var(ENV_CONCERTS_API_KEY, "from-env");
    env::set_var(ENV_REFRESH_INTERVAL_SECS, "120");

    let cfg = TimelineConfig::load().unwrap();
    assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
    assert_eq!(cfg.refresh.interval_secs, 120);
    assert_eq!(cfg.refresh.staleness_secs, 600);
    assert_eq!(cfg.concerts.api_key.as_deref(), Some("from-env"));
    assert_eq!(cfg.news.outlets.len(), 1);
    assert_eq!(cfg.news.summary_max_chars, 200);
    clear_env();
}

#[serial_test::serial]
#[test]
fn invalid_toml_is_an_error() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("timeline.toml");
    fs::write(&path, "bind_addr = [not toml").unwrap();
    env::set_var(ENV_TIMELINE_CONFIG_PATH, &path);

    let err = TimelineConfig::load().unwrap_err();
    assert!(format!("{err:#}").contains("timeline config"));
    clear_env();
}
