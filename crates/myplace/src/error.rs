//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use myplace_config::ConfigError;
use myplace_core::{CoreError, RejectReason};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const UNAVAILABLE: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach hub: {reason}")]
    #[diagnostic(
        code(myplace::connection_failed),
        help(
            "Check that the hub is powered on and reachable on the local network.\n\
             Try: myplace status --host <ip> --port 2025"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Hub did not answer {stage} within {millis}ms")]
    #[diagnostic(
        code(myplace::timeout),
        help("Increase the timeout with --timeout or check hub responsiveness.")
    )]
    Timeout { stage: String, millis: u64 },

    #[error("Hub state unavailable: {message}")]
    #[diagnostic(
        code(myplace::unavailable),
        help("No state could be read from the hub. Check --host, --port and the client secret.")
    )]
    Unavailable { message: String },

    // ── Credentials ──────────────────────────────────────────────────
    #[error("No client secret configured for profile '{profile}'")]
    #[diagnostic(
        code(myplace::no_credentials),
        help(
            "Pass --secret, set MYPLACE_SECRET, or store one with:\n\
             myplace config init --host <ip> --secret <secret> --keyring"
        )
    )]
    NoCredentials { profile: String },

    // ── Control ──────────────────────────────────────────────────────
    #[error("'{target}' is not an aircon or zone on this hub")]
    #[diagnostic(
        code(myplace::not_found),
        help("Run: myplace status to see available aircons and zones")
    )]
    NotFound { target: String },

    #[error("Request rejected: {reason}")]
    #[diagnostic(code(myplace::rejected))]
    Rejected { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(myplace::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(myplace::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: myplace config init --host <ip>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No hub configured")]
    #[diagnostic(
        code(myplace::no_config),
        help(
            "Pass --host, or create a profile with: myplace config init --host <ip>\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(myplace::config))]
    Config(ConfigError),

    #[error("Keyring error: {0}")]
    #[diagnostic(code(myplace::keyring))]
    Keyring(#[from] keyring::Error),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(myplace::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(myplace::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Unavailable { .. } => exit_code::UNAVAILABLE,
            Self::NoCredentials { .. } | Self::Keyring(_) => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<RejectReason> for CliError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::UnknownTarget(entity) => Self::NotFound {
                target: entity.to_string(),
            },
            other => Self::Rejected {
                reason: other.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => Self::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => Self::ConnectionFailed { reason },

            CoreError::Communication { attempts, reason } => Self::ConnectionFailed {
                reason: format!("{reason} (after {attempts} attempts)"),
            },

            CoreError::Timeout { stage, timeout_ms } => Self::Timeout {
                stage: stage.into(),
                millis: timeout_ms,
            },

            CoreError::Protocol { message }
            | CoreError::InvalidSnapshot { message }
            | CoreError::UpdateFailed { message } => Self::Unavailable { message },

            CoreError::NotFound { entity } => Self::NotFound { target: entity },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::ControllerStopped => Self::Internal("controller stopped".into()),

            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use myplace_core::EntityRef;

    #[test]
    fn exhausted_retries_exit_with_connection_code() {
        let err = CliError::from(CoreError::Communication {
            attempts: 3,
            reason: "connection refused".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn unknown_target_maps_to_not_found() {
        let err = CliError::from(RejectReason::UnknownTarget(EntityRef::zone("z09")));
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(err.to_string().contains("zone:z09"));
    }

    #[test]
    fn out_of_range_is_rejected() {
        let err = CliError::from(RejectReason::OutOfRange { value: 31 });
        assert_eq!(err.exit_code(), exit_code::REJECTED);
    }

    #[test]
    fn missing_secret_is_auth_error() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "home".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
