use thiserror::Error;

/// Top-level error type for the `myplace-api` crate.
///
/// Covers every failure mode of a single hub exchange: connecting,
/// framing, timing out, and decoding. `myplace-core` maps these into
/// poll failures and user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// WebSocket handshake or TCP connect failed.
    #[error("WebSocket connection failed: {0}")]
    Connect(String),

    /// Hub URL could not be built from host and port.
    #[error("Invalid hub URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A bounded stage (connect, reply) ran out of time.
    #[error("Timed out waiting for {stage} after {timeout_ms}ms")]
    Timeout { stage: &'static str, timeout_ms: u64 },

    // ── Framing ─────────────────────────────────────────────────────
    /// The hub sent something other than a single text reply
    /// (binary frame, close frame, stream ended early, write failure).
    #[error("Malformed WebSocket message: {0}")]
    MalformedMessage(String),

    // ── Data ────────────────────────────────────────────────────────
    /// The reply was a text frame but not valid JSON.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The outgoing command could not be encoded.
    #[error("Failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    // ── Retry budget ────────────────────────────────────────────────
    /// Every attempt failed; carries the last underlying cause.
    #[error("Failed to reach hub after {attempts} attempts: {source}")]
    Communication {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Data errors (bad JSON, encode failures) are never retried: the hub
    /// answered, it just answered badly.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connect(_) | Self::Timeout { .. } | Self::MalformedMessage(_)
        )
    }

    /// Returns `true` if this error came out of an exhausted retry budget.
    pub fn is_communication(&self) -> bool {
        matches!(self, Self::Communication { .. })
    }

    /// The innermost cause, unwrapping a [`Communication`](Self::Communication) layer.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Communication { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
