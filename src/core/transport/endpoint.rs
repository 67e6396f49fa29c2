//! Device endpoint configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default eISCP control port
pub const EISCP_PORT: u16 = 60128;

/// Connection target plus the timing contract for one device.
///
/// Fixed for the lifetime of a connection; build a new client to change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceEndpoint {
    /// Host name or address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Pause between repeated sends of one command
    pub send_delay_ms: u64,
    /// Settle delay before the first response read
    pub receive_wait_ms: u64,
    /// Read inactivity timeout; 0 waits indefinitely
    pub receive_timeout_ms: u64,
    /// Upper bound on opening the TCP stream
    pub connect_timeout_ms: u64,
}

impl DeviceEndpoint {
    /// Create an endpoint with default timings
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            send_delay_ms: 100,
            receive_wait_ms: 100,
            receive_timeout_ms: 500,
            connect_timeout_ms: 10_000,
        }
    }

    /// Set the inter-send delay
    #[must_use]
    pub fn send_delay_ms(mut self, ms: u64) -> Self {
        self.send_delay_ms = ms;
        self
    }

    /// Set the pre-read settle delay
    #[must_use]
    pub fn receive_wait_ms(mut self, ms: u64) -> Self {
        self.receive_wait_ms = ms;
        self
    }

    /// Set the read inactivity timeout
    #[must_use]
    pub fn receive_timeout_ms(mut self, ms: u64) -> Self {
        self.receive_timeout_ms = ms;
        self
    }

    /// Set the connect timeout
    #[must_use]
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pause between repeated writes
    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    /// Settle delay before the first read
    pub fn receive_wait(&self) -> Duration {
        Duration::from_millis(self.receive_wait_ms)
    }

    /// `None` when reads may block indefinitely
    pub fn receive_timeout(&self) -> Option<Duration> {
        (self.receive_timeout_ms > 0).then(|| Duration::from_millis(self.receive_timeout_ms))
    }

    /// Upper bound on a single dial
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for DeviceEndpoint {
    fn default() -> Self {
        Self::new("localhost", EISCP_PORT)
    }
}
