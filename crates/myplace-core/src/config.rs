// ── Runtime hub configuration ──
//
// Describes *how* to reach a hub and how often to poll it. Carries
// credentials and tuning but never touches disk; the CLI builds a
// `HubConfig` from a profile and hands it in.

use std::time::Duration;

use secrecy::SecretString;

use myplace_api::TransportConfig;

/// Default poll cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Wait between sending a control command and requesting a reconciling poll.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Inclusive setpoint range the hub accepts.
pub const MIN_SETPOINT: i64 = 16;
pub const MAX_SETPOINT: i64 = 30;

/// Configuration for one MyPlace hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Hub host name or IP address.
    pub host: String,
    /// Hub WebSocket port.
    pub port: u16,
    /// Sent as the `client_id` header.
    pub client_id: String,
    /// Sent as the `password` header.
    pub client_secret: SecretString,
    /// How often the background task polls. Zero disables it.
    pub poll_interval: Duration,
    /// Delay between a control command and the reconciling poll.
    pub settle_delay: Duration,
    /// Timeouts and retry budget for each exchange.
    pub transport: TransportConfig,
}

impl HubConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: client_id.into(),
            client_secret,
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
            transport: TransportConfig::default(),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}
