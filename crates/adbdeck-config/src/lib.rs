//! Configuration for the adbdeck CLI.
//!
//! A TOML file under the platform config directory, overridable through
//! `ADBDECK_`-prefixed environment variables, translated into the runtime
//! settings `adbdeck_api::ExecutorConfig` and `adbdeck_core::SessionConfig`.
//! The core crates never read files themselves.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use adbdeck_api::{ExecutorConfig, PackageScope};
use adbdeck_core::{BatchConfig, CoordinatorConfig, SessionConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: Tools,

    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default)]
    pub polling: Polling,

    #[serde(default)]
    pub defaults: Defaults,
}

/// Explicit tool locations. Unset means discover next to the executable,
/// in the working directory, then on `$PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tools {
    pub adb: Option<PathBuf>,
    pub fastboot: Option<PathBuf>,
}

/// Deadlines, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Timeouts {
    #[serde(default = "default_command")]
    pub command: u64,

    #[serde(default = "default_install")]
    pub install: u64,

    #[serde(default = "default_transfer")]
    pub transfer: u64,

    /// One list enumeration.
    #[serde(default = "default_command")]
    pub enumerate: u64,

    /// A whole batch. `0` waits indefinitely.
    #[serde(default = "default_batch")]
    pub batch: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            command: default_command(),
            install: default_install(),
            transfer: default_transfer(),
            enumerate: default_command(),
            batch: default_batch(),
        }
    }
}

fn default_command() -> u64 {
    60
}
fn default_install() -> u64 {
    15 * 60
}
fn default_transfer() -> u64 {
    30 * 60
}
fn default_batch() -> u64 {
    30 * 60
}

/// Poll cadence per view, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Polling {
    #[serde(default = "default_devices")]
    pub devices: u64,

    #[serde(default = "default_fastboot")]
    pub fastboot: u64,

    #[serde(default = "default_packages")]
    pub packages: u64,

    #[serde(default = "default_files")]
    pub files: u64,

    /// Empty results needed in a row before a list is shown as empty.
    #[serde(default = "default_empty_confirmations")]
    pub empty_confirmations: u32,
}

impl Default for Polling {
    fn default() -> Self {
        Self {
            devices: default_devices(),
            fastboot: default_fastboot(),
            packages: default_packages(),
            files: default_files(),
            empty_confirmations: default_empty_confirmations(),
        }
    }
}

fn default_devices() -> u64 {
    3
}
fn default_fastboot() -> u64 {
    4
}
fn default_packages() -> u64 {
    30
}
fn default_files() -> u64 {
    10
}
fn default_empty_confirmations() -> u32 {
    adbdeck_core::config::DEFAULT_EMPTY_CONFIRMATIONS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default)]
    pub scope: PackageScope,

    /// Failures listed in a batch report before the rest are elided.
    #[serde(default = "default_failure_limit")]
    pub failure_limit: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            path: default_path(),
            scope: PackageScope::default(),
            failure_limit: default_failure_limit(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_path() -> String {
    "/sdcard/".into()
}
fn default_failure_limit() -> usize {
    adbdeck_core::config::DEFAULT_FAILURE_LIMIT
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Reject values the runtime cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let polls = [
            ("polling.devices", self.polling.devices),
            ("polling.fastboot", self.polling.fastboot),
            ("polling.packages", self.polling.packages),
            ("polling.files", self.polling.files),
            ("timeouts.command", self.timeouts.command),
            ("timeouts.install", self.timeouts.install),
            ("timeouts.transfer", self.timeouts.transfer),
            ("timeouts.enumerate", self.timeouts.enumerate),
        ];
        if let Some((field, _)) = polls.iter().find(|(_, secs)| *secs == 0) {
            return Err(ConfigError::invalid(field, "must be at least 1 second"));
        }
        if self.polling.empty_confirmations == 0 {
            return Err(ConfigError::invalid(
                "polling.empty_confirmations",
                "must be at least 1",
            ));
        }
        if !self.defaults.path.starts_with('/') {
            return Err(ConfigError::invalid(
                "defaults.path",
                format!("expected an absolute device path, got '{}'", self.defaults.path),
            ));
        }
        Ok(())
    }

    /// Process runner settings.
    pub fn to_executor(&self) -> ExecutorConfig {
        ExecutorConfig {
            adb_path: self.tools.adb.clone(),
            fastboot_path: self.tools.fastboot.clone(),
            command_timeout: Duration::from_secs(self.timeouts.command),
            install_timeout: Duration::from_secs(self.timeouts.install),
            transfer_timeout: Duration::from_secs(self.timeouts.transfer),
        }
    }

    /// Validated settings for every list view.
    pub fn to_core(&self) -> Result<SessionConfig, ConfigError> {
        self.validate()?;
        let coordinator = |secs: u64| CoordinatorConfig {
            interval: Duration::from_secs(secs),
            empty_confirmations: self.polling.empty_confirmations,
            call_timeout: Duration::from_secs(self.timeouts.enumerate),
        };
        Ok(SessionConfig {
            devices: coordinator(self.polling.devices),
            fastboot: coordinator(self.polling.fastboot),
            packages: coordinator(self.polling.packages),
            files: coordinator(self.polling.files),
            batch: BatchConfig {
                timeout: (self.timeouts.batch > 0).then(|| Duration::from_secs(self.timeouts.batch)),
                failure_limit: self.defaults.failure_limit,
            },
            default_path: self.defaults.path.clone(),
            default_scope: self.defaults.scope,
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "adbdeck", "adbdeck").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("adbdeck");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then `ADBDECK_*` variables.
///
/// Nested keys use a double underscore: `ADBDECK_POLLING__FILES=20`.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ADBDECK_").split("__"))
}

/// Load and validate the config at the canonical path.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load and validate the config at `path`. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    config.validate()?;
    Ok(config)
}

/// Write `config` to `path`, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, config.to_toml()?)?;
    Ok(())
}
