//! Precedence tests for layered configuration loading.
//!
//! Command-line flags override `PLINTH_*` environment variables, which
//! override values read from a configuration file, which in turn override the
//! built-in defaults.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use plinth_config::{Config, DEFAULT_LOG_FILTER, LogFormat};
use tempfile::TempDir;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` under edition 2024; the override is
        // restored in `Drop` while the mutex is still held.
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
        drop(self.guard.take());
    }
}

fn program_args(extra: &[&str]) -> Vec<OsString> {
    std::iter::once(OsString::from("plinth"))
        .chain(extra.iter().map(OsString::from))
        .collect()
}

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("plinth.toml");
    fs::write(&path, contents).expect("write configuration file");
    path
}

#[test]
fn defaults_apply_without_overrides() {
    let _guard = ENV_MUTEX.lock().expect("env mutex poisoned");
    let config = Config::load_from_iter(program_args(&[])).expect("load defaults");
    assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[test]
fn environment_overrides_defaults() {
    let _env = EnvOverride::set_var("PLINTH_LOG_FILTER", OsStr::new("plinth=debug"));
    let config = Config::load_from_iter(program_args(&[])).expect("load with env");
    assert_eq!(config.log_filter(), "plinth=debug");
}

#[test]
fn cli_flags_override_environment() {
    let _env = EnvOverride::set_var("PLINTH_LOG_FILTER", OsStr::new("warn"));
    let config = Config::load_from_iter(program_args(&["--log-filter", "trace"]))
        .expect("load with cli override");
    assert_eq!(config.log_filter(), "trace");
}

#[test]
fn cli_flag_selects_compact_format() {
    let _guard = ENV_MUTEX.lock().expect("env mutex poisoned");
    let config = Config::load_from_iter(program_args(&["--log-format", "compact"]))
        .expect("load with format flag");
    assert_eq!(config.log_format(), LogFormat::Compact);
}

#[test]
fn configuration_file_overrides_defaults() {
    let _guard = ENV_MUTEX.lock().expect("env mutex poisoned");
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = write_config(
        temp_dir.path(),
        "log_filter = \"plinth=debug\"\nlog_format = \"compact\"\n",
    );

    let args = program_args(&[]).into_iter().chain([
        OsString::from("--config-path"),
        path.into_os_string(),
    ]);
    let config = Config::load_from_iter(args).expect("load with file");
    assert_eq!(config.log_filter(), "plinth=debug");
    assert_eq!(config.log_format(), LogFormat::Compact);
}

#[test]
fn environment_overrides_configuration_file() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = write_config(temp_dir.path(), "log_filter = \"plinth=debug\"\n");
    let _env = EnvOverride::set_var("PLINTH_LOG_FILTER", OsStr::new("warn"));

    let args = program_args(&[]).into_iter().chain([
        OsString::from("--config-path"),
        path.into_os_string(),
    ]);
    let config = Config::load_from_iter(args).expect("load with file and env");
    assert_eq!(config.log_filter(), "warn");
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[test]
fn configuration_path_can_come_from_the_environment() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = write_config(temp_dir.path(), "log_format = \"compact\"\n");
    let _env = EnvOverride::set_var("PLINTH_CONFIG_PATH", path.as_os_str());

    let config = Config::load_from_iter(program_args(&[])).expect("load with env path");
    assert_eq!(config.log_format(), LogFormat::Compact);
    assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
}

#[test]
fn malformed_configuration_file_is_reported() {
    let _guard = ENV_MUTEX.lock().expect("env mutex poisoned");
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = write_config(temp_dir.path(), "log_format = \"yaml\"\n");

    let args = program_args(&[]).into_iter().chain([
        OsString::from("--config-path"),
        path.into_os_string(),
    ]);
    let error = Config::load_from_iter(args).expect_err("loading must fail");
    assert!(!error.to_string().is_empty());
}
