//! Tests for the `parley-config` loader: defaults, file discovery, and
//! environment overrides.

use std::fs;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::TempDir;

use parley_config::{load, AppConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "PARLEY_CONFIG",
    "PARLEY__DATABASE__URL",
    "PARLEY__DATABASE__MAX_CONNECTIONS",
    "PARLEY__HUB__POLL_INTERVAL_SECONDS",
    "PARLEY__HUB__SNAPSHOT_LIMIT",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        let mut ctx = Self {
            vars: Vec::new(),
            original_dir: None,
        };
        for key in ENV_VARS_TO_RESET {
            ctx.remove_var(key);
        }
        ctx
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn change_dir(&mut self, dir: &std::path::Path) {
        self.original_dir = std::env::current_dir().ok();
        std::env::set_current_dir(dir).unwrap();
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(dir) = self.original_dir.take() {
            let _ = std::env::set_current_dir(dir);
        }
        for (key, previous) in self.vars.drain(..).rev() {
            match previous {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}

#[test]
#[serial]
fn defaults_apply_without_file_or_env() {
    let _ctx = TestContext::new();

    let config = load().unwrap();
    let defaults = AppConfig::default();

    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(config.database.max_connections, defaults.database.max_connections);
    assert_eq!(config.hub.poll_interval_seconds, defaults.hub.poll_interval_seconds);
    assert_eq!(config.hub.snapshot_limit, defaults.hub.snapshot_limit);
}

#[test]
#[serial]
fn environment_overrides_take_precedence() {
    let mut ctx = TestContext::new();
    ctx.set_var("PARLEY__DATABASE__URL", "sqlite://override.db");
    ctx.set_var("PARLEY__HUB__POLL_INTERVAL_SECONDS", "7");

    let config = load().unwrap();

    assert_eq!(config.database.url, "sqlite://override.db");
    assert_eq!(config.hub.poll_interval_seconds, 7);
}

#[test]
#[serial]
fn explicit_config_file_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("parley.toml");
    fs::write(
        &path,
        r#"
[database]
url = "sqlite://from-file.db"
max_connections = 3

[hub]
poll_interval_seconds = 9
snapshot_limit = 25
"#,
    )
    .unwrap();

    let mut ctx = TestContext::new();
    ctx.set_var("PARLEY_CONFIG", path.to_string_lossy());

    let config = load().unwrap();

    assert_eq!(config.database.url, "sqlite://from-file.db");
    assert_eq!(config.database.max_connections, 3);
    assert_eq!(config.hub.poll_interval_seconds, 9);
    assert_eq!(config.hub.snapshot_limit, 25);
}

#[test]
#[serial]
fn config_file_discovered_in_working_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("parley.toml"),
        r#"
[database]
url = "sqlite://discovered.db"
"#,
    )
    .unwrap();

    let mut ctx = TestContext::new();
    ctx.change_dir(temp_dir.path());

    let config = load().unwrap();

    assert_eq!(config.database.url, "sqlite://discovered.db");
    // Unspecified sections fall back to defaults.
    assert_eq!(config.hub.snapshot_limit, AppConfig::default().hub.snapshot_limit);
}
