//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use adbdeck_config::ConfigError;
use adbdeck_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const PARTIAL: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const TOOL: i32 = 5;
    pub const BUSY: i32 = 6;
    pub const DEVICE: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Environment ──────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(adbdeck::tool_missing),
        help(
            "Install the Android platform tools and put adb on PATH,\n\
             or point at the binary with --adb / [tools] adb in config.toml."
        )
    )]
    ToolMissing { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(adbdeck::device_unavailable),
        help(
            "Check that a device is connected and authorized.\n\
             Try: adbdeck devices"
        )
    )]
    DeviceUnavailable { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(adbdeck::not_found),
        help("Run: adbdeck {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Operations ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(adbdeck::rejected))]
    Rejected { message: String },

    #[error("{headline}")]
    #[diagnostic(
        code(adbdeck::partial_failure),
        help("Failed items are listed above; successful ones were applied.")
    )]
    BatchFailed { headline: String },

    #[error("{message}")]
    #[diagnostic(code(adbdeck::busy))]
    Busy { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(adbdeck::timeout),
        help("Increase the limit with --timeout or [timeouts] in config.toml.")
    )]
    Timeout { message: String },

    #[error("{message}")]
    #[diagnostic(code(adbdeck::cancelled))]
    Cancelled { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(adbdeck::validation))]
    Validation { field: String, reason: String },

    #[error("'{action}' is destructive and needs confirmation")]
    #[diagnostic(
        code(adbdeck::confirmation_required),
        help("Re-run with --yes (-y) to proceed.")
    )]
    ConfirmationRequired { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {path}")]
    #[diagnostic(code(adbdeck::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(adbdeck::config),
        help("Check config.toml and ADBDECK_* environment variables.")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON output: {0}")]
    #[diagnostic(code(adbdeck::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ToolMissing { .. } => exit_code::TOOL,
            Self::DeviceUnavailable { .. } => exit_code::DEVICE,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::BatchFailed { .. } => exit_code::PARTIAL,
            Self::Busy { .. } => exit_code::BUSY,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::ConfirmationRequired { .. }
            | Self::ConfigExists { .. }
            | Self::Config(_) => exit_code::USAGE,
            Self::Rejected { .. } | Self::Cancelled { .. } | Self::Io(_) | Self::Json(_) => {
                exit_code::GENERAL
            }
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::NoSelection => Self::Validation {
                field: "selection".into(),
                reason: message,
            },
            CoreError::InvalidInput { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::BatchInProgress { .. } | CoreError::OperationInProgress { .. } => {
                Self::Busy { message }
            }
            CoreError::Rejected { .. } => Self::Rejected { message },
            CoreError::Timeout { .. } => Self::Timeout { message },
            CoreError::DeviceUnavailable { .. } => Self::DeviceUnavailable { message },
            CoreError::ToolUnavailable { .. } => Self::ToolMissing { message },
            CoreError::Cancelled { .. } => Self::Cancelled { message },
        }
    }
}
