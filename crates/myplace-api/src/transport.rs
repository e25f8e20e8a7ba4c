// Shared transport configuration and the transport seam used by the core.
//
// `HubClient` is the production implementation; the core only ever sees
// `dyn CommandTransport`, so it can be driven by an in-memory hub in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::command::CommandBatch;
use crate::error::Error;
use crate::message::Reply;

/// Timeouts and retry budget for hub exchanges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Bound on TCP connect + WebSocket handshake. Default: 5s.
    pub connect_timeout: Duration,
    /// Bound on waiting for the single reply frame. Default: 10s.
    pub reply_timeout: Duration,
    /// Total attempts per call, including the first. Default: 3.
    pub max_attempts: u32,
    /// Fixed pause between attempts. Default: 1s.
    pub retry_delay: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            reply_timeout: Duration::from_secs(10),
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl TransportConfig {
    /// Scale both timeouts from a single "request timeout" knob, keeping
    /// the connect bound at half the reply bound.
    pub fn with_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self.connect_timeout = (reply_timeout / 2).max(Duration::from_millis(1));
        self
    }
}

/// Anything that can deliver a command batch to a hub.
///
/// Implementations must release every connection they open before
/// returning, on success and failure alike.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Deliver `batch`. With `await_reply` the first reply frame is
    /// returned as [`Reply::Message`]; otherwise [`Reply::Sent`].
    async fn send(&self, batch: &CommandBatch, await_reply: bool) -> Result<Reply, Error>;
}
