// Hub command client
//
// Owns the hub endpoint and credentials, wraps each command batch in a
// fresh envelope, and drives the bounded retry loop around single
// WebSocket exchanges.

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{debug, error, warn};
use url::Url;

use crate::command::CommandBatch;
use crate::error::Error;
use crate::message::{Envelope, Reply};
use crate::transport::{CommandTransport, TransportConfig};
use crate::websocket::{self, Handshake};

/// WebSocket client for one MyPlace hub.
///
/// Stateless between calls: every [`send`](Self::send) opens its own
/// connection, so a `HubClient` can be shared freely behind an `Arc`.
#[derive(Debug, Clone)]
pub struct HubClient {
    url: Url,
    client_id: String,
    secret: SecretString,
    config: TransportConfig,
}

impl HubClient {
    /// Build a client for the hub at `ws://{host}:{port}/ws`.
    pub fn new(
        host: &str,
        port: u16,
        client_id: impl Into<String>,
        secret: SecretString,
        config: TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            url: Self::endpoint(host, port)?,
            client_id: client_id.into(),
            secret,
            config,
        })
    }

    /// The hub's WebSocket endpoint for a host/port pair.
    pub fn endpoint(host: &str, port: u16) -> Result<Url, Error> {
        Ok(Url::parse(&format!("ws://{host}:{port}/ws"))?)
    }

    /// Deliver `batch` to the hub.
    ///
    /// Connection failures, timeouts and framing problems are retried up to
    /// `max_attempts` times in total with a fixed delay; once the budget is
    /// spent the last cause is returned inside [`Error::Communication`].
    /// A reply that is not JSON fails immediately.
    pub async fn send(&self, batch: &CommandBatch, await_reply: bool) -> Result<Reply, Error> {
        let envelope = Envelope::wrap(batch)?;
        let text = envelope.to_text()?;
        let handshake = Handshake {
            url: &self.url,
            client_id: &self.client_id,
            secret: &self.secret,
        };
        let max_attempts = self.config.max_attempts.max(1);

        debug!(
            uuid = %envelope.uuid,
            commands = ?batch.names(),
            await_reply,
            "sending hub command"
        );

        let mut attempt = 1;
        loop {
            match websocket::exchange(&handshake, &text, await_reply, &self.config).await {
                Ok(reply) => {
                    debug!(uuid = %envelope.uuid, attempt, "hub exchange complete");
                    return Ok(reply);
                }
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) if attempt >= max_attempts => {
                    error!(error = %e, attempts = attempt, "giving up on hub exchange");
                    return Err(Error::Communication {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    let delay_ms =
                        u64::try_from(self.config.retry_delay.as_millis()).unwrap_or(u64::MAX);
                    warn!(
                        error = %e,
                        attempt,
                        max_attempts,
                        delay_ms,
                        "hub exchange failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl CommandTransport for HubClient {
    async fn send(&self, batch: &CommandBatch, await_reply: bool) -> Result<Reply, Error> {
        HubClient::send(self, batch, await_reply).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_shape() {
        let url = HubClient::endpoint("192.168.1.20", 2025).unwrap();
        assert_eq!(url.as_str(), "ws://192.168.1.20:2025/ws");
    }

    #[test]
    fn invalid_host_is_rejected() {
        let err = HubClient::endpoint("bad host", 2025).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let client = HubClient::new(
            "hub.local",
            2025,
            "ha-client",
            SecretString::from("hunter2".to_owned()),
            TransportConfig::default(),
        )
        .unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("ha-client"));
    }
}
