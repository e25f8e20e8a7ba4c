// ── Core error types ──
//
// User-facing errors from myplace-core. Consumers never see WebSocket
// frames or raw JSON failures directly; the `From<myplace_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach hub: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Hub did not answer {stage} within {timeout_ms}ms")]
    Timeout { stage: &'static str, timeout_ms: u64 },

    #[error("Hub protocol error: {message}")]
    Protocol { message: String },

    /// Every transport attempt failed.
    #[error("Hub unreachable after {attempts} attempts: {reason}")]
    Communication { attempts: u32, reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    /// The hub answered, but not with a usable full-data snapshot.
    #[error("Invalid hub snapshot: {message}")]
    InvalidSnapshot { message: String },

    /// A poll failed and there was no cached snapshot to fall back on.
    #[error("Update failed: {message}")]
    UpdateFailed { message: String },

    #[error("Entity not found: {entity}")]
    NotFound { entity: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Controller has been shut down")]
    ControllerStopped,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the hub could not be reached at all (as opposed to answering
    /// badly).
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::Communication { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<myplace_api::Error> for CoreError {
    fn from(err: myplace_api::Error) -> Self {
        match err {
            myplace_api::Error::Connect(reason) => CoreError::ConnectionFailed { reason },
            myplace_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid hub URL: {e}"),
            },
            myplace_api::Error::Timeout { stage, timeout_ms } => {
                CoreError::Timeout { stage, timeout_ms }
            }
            myplace_api::Error::MalformedMessage(message) => CoreError::Protocol { message },
            myplace_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidSnapshot {
                    message: format!("reply is not JSON: {message}"),
                }
            }
            myplace_api::Error::Encode(e) => {
                CoreError::Internal(format!("Failed to encode command: {e}"))
            }
            myplace_api::Error::Communication { attempts, source } => CoreError::Communication {
                attempts,
                reason: source.to_string(),
            },
        }
    }
}
