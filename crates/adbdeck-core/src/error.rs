// ── Core error types ──
//
// Errors surfaced to presentation callers. Tool exit codes and raw stderr
// never leak past this point: the `From<adbdeck_api::Error>` impl
// translates transport failures into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Local rejections (no collaborator call) ─────────────────────
    #[error("No items selected")]
    NoSelection,

    #[error("A {kind} batch is already running")]
    BatchInProgress { kind: String },

    #[error("{operation} is already running")]
    OperationInProgress { operation: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    // ── Collaborator failures ───────────────────────────────────────
    #[error("{operation} failed: {message}")]
    Rejected { operation: String, message: String },

    #[error("{operation} timed out after {timeout_secs}s")]
    Timeout { operation: String, timeout_secs: u64 },

    #[error("Device unavailable: {message}")]
    DeviceUnavailable { message: String },

    #[error("Tool not available: {message}")]
    ToolUnavailable { message: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("{operation} cancelled")]
    Cancelled { operation: String },
}

impl CoreError {
    /// Attach an operation name to a generic collaborator failure.
    pub(crate) fn during(self, operation: &str) -> Self {
        match self {
            Self::Rejected { message, .. } => Self::Rejected {
                operation: operation.to_owned(),
                message,
            },
            Self::Timeout { timeout_secs, .. } => Self::Timeout {
                operation: operation.to_owned(),
                timeout_secs,
            },
            other => other,
        }
    }

    /// Whether the error came from a local check rather than the device.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::NoSelection
                | Self::BatchInProgress { .. }
                | Self::OperationInProgress { .. }
                | Self::InvalidInput { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<adbdeck_api::Error> for CoreError {
    fn from(err: adbdeck_api::Error) -> Self {
        use adbdeck_api::Error as Api;
        match err {
            Api::BinaryNotFound { .. } | Api::Spawn { .. } => CoreError::ToolUnavailable {
                message: err.to_string(),
            },
            Api::Timeout { timeout_secs } => CoreError::Timeout {
                operation: "command".into(),
                timeout_secs,
            },
            Api::DeviceOffline | Api::Unauthorized => CoreError::DeviceUnavailable {
                message: err.to_string(),
            },
            Api::InvalidPackageName { .. } => CoreError::InvalidInput {
                message: err.to_string(),
            },
            Api::CommandFailed { message } => CoreError::Rejected {
                operation: "command".into(),
                message,
            },
            Api::PackagePathNotFound { .. } => CoreError::Rejected {
                operation: "command".into(),
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_translate() {
        let e: CoreError = adbdeck_api::Error::Unauthorized.into();
        assert!(matches!(e, CoreError::DeviceUnavailable { .. }));

        let e: CoreError = adbdeck_api::Error::Timeout { timeout_secs: 60 }.into();
        assert_eq!(e.during("uninstall").to_string(), "uninstall timed out after 60s");

        let e: CoreError = adbdeck_api::Error::CommandFailed {
            message: "busy".into(),
        }
        .into();
        assert_eq!(e.during("delete").to_string(), "delete failed: busy");
    }

    #[test]
    fn local_errors() {
        assert!(CoreError::NoSelection.is_local());
        assert!(
            !CoreError::DeviceUnavailable {
                message: String::new()
            }
            .is_local()
        );
    }
}
