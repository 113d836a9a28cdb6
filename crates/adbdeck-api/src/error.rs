use thiserror::Error;

/// Top-level error type for the `adbdeck-api` crate.
///
/// Covers every failure mode of running the platform tools: locating the
/// binary, spawning it, timing out, and classifying what the tool printed
/// on failure. `adbdeck-core` maps these into user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Tool discovery ──────────────────────────────────────────────
    /// The binary could not be found in any candidate location.
    #[error("binary '{name}' not found. Please ensure 'bin/{platform}/{name}' exists or it is on PATH")]
    BinaryNotFound { name: String, platform: String },

    /// The process could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    // ── Execution ───────────────────────────────────────────────────
    /// The command did not finish within its deadline.
    #[error("command timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// adb reported the device as offline.
    #[error("device is offline. Try reconnecting USB")]
    DeviceOffline,

    /// adb reported the host key has not been accepted on the device.
    #[error("unauthorized. Check phone screen to allow USB debugging")]
    Unauthorized,

    /// The tool exited unsuccessfully or printed a failure marker.
    #[error("{message}")]
    CommandFailed { message: String },

    // ── Input validation ────────────────────────────────────────────
    /// Not a well-formed Java package name.
    #[error("invalid package name '{name}'")]
    InvalidPackageName { name: String },

    /// `pm path` returned nothing usable for a package.
    #[error("package {package} not found or no path returned")]
    PackagePathNotFound { package: String },
}

impl Error {
    /// Whether the failure means the device itself is unreachable, as
    /// opposed to a single operation being refused.
    pub fn is_device_unavailable(&self) -> bool {
        matches!(self, Self::DeviceOffline | Self::Unauthorized)
    }

    /// Classify the stderr of a failed command.
    pub(crate) fn from_stderr(stderr: &str) -> Self {
        if stderr.contains("device offline") {
            Self::DeviceOffline
        } else if stderr.contains("unauthorized") {
            Self::Unauthorized
        } else {
            Self::CommandFailed {
                message: stderr.to_owned(),
            }
        }
    }
}
