// ── Runtime tuning ──
//
// Built by the CLI from the on-disk configuration and handed in.
// Core never reads config files.

use std::time::Duration;

use adbdeck_api::PackageScope;

/// Consecutive empty results required before an empty snapshot replaces
/// a non-empty one.
pub const DEFAULT_EMPTY_CONFIRMATIONS: u32 = 2;
/// Failures listed in a batch report before the rest are elided.
pub const DEFAULT_FAILURE_LIMIT: usize = 5;

/// Refresh coordinator tuning for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Poll cadence once started.
    pub interval: Duration,
    /// Empty results needed in a row before an empty snapshot is applied.
    pub empty_confirmations: u32,
    /// Deadline for a single enumerate call.
    pub call_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            empty_confirmations: DEFAULT_EMPTY_CONFIRMATIONS,
            call_timeout: Duration::from_secs(60),
        }
    }
}

impl CoordinatorConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Batch orchestrator tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Deadline for the whole batch call. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Failures listed in the report.
    pub failure_limit: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30 * 60)),
            failure_limit: DEFAULT_FAILURE_LIMIT,
        }
    }
}

/// Everything a console session needs to build its views.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub devices: CoordinatorConfig,
    pub fastboot: CoordinatorConfig,
    pub packages: CoordinatorConfig,
    pub files: CoordinatorConfig,
    pub batch: BatchConfig,
    /// Directory the file view opens on.
    pub default_path: String,
    /// Package scope the package view opens on.
    pub default_scope: PackageScope,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            devices: CoordinatorConfig::default(),
            fastboot: CoordinatorConfig::default().with_interval(Duration::from_secs(4)),
            packages: CoordinatorConfig::default().with_interval(Duration::from_secs(30)),
            files: CoordinatorConfig::default().with_interval(Duration::from_secs(10)),
            batch: BatchConfig::default(),
            default_path: "/sdcard/".into(),
            default_scope: PackageScope::User,
        }
    }
}
