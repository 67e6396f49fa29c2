//! Transport layer: one TCP link to one device
//!
//! Provides:
//! - [`DeviceEndpoint`], the immutable connection target and timing
//! - [`Dialer`], the seam that opens a byte stream (TCP in production)
//! - [`ConnectionManager`], owning the link lifecycle and raw read/write

mod connection;
mod endpoint;
mod tcp;

pub use connection::ConnectionManager;
pub use endpoint::{DeviceEndpoint, EISCP_PORT};
pub use tcp::TcpDialer;

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// Read buffer size used by the response loop
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Link state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No live stream
    #[default]
    Disconnected,
    /// Stream open and usable
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

/// Result of a single bounded read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes arrived before the inactivity deadline
    Data(Bytes),
    /// Nothing arrived within the receive timeout
    TimedOut,
    /// The peer closed its side of the stream
    Closed,
}

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    /// Opening the stream failed (refused, unreachable, DNS, connect timeout)
    #[error("Connection to {target} failed: {source}")]
    ConnectionFailed {
        /// `host:port` that was dialed
        target: String,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Operation needs a live stream
    #[error("Not connected")]
    NotConnected,

    /// I/O error on an open stream
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Link statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Dial attempts, successful or not
    pub connect_attempts: u64,
    /// Successful dials
    pub connects: u64,
    /// Completed writes
    pub writes: u64,
    /// Read attempts, including ones that timed out
    pub reads: u64,
    /// Bytes sent
    pub bytes_sent: u64,
    /// Bytes received
    pub bytes_received: u64,
    /// Age of the current link
    pub uptime: Duration,
}

/// Opens byte streams to a device.
///
/// Production code uses [`TcpDialer`]; anything that can produce an
/// `AsyncRead + AsyncWrite` stream can stand in for it.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Stream type produced by a successful dial
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Open a new stream to the endpoint
    async fn dial(&self, endpoint: &DeviceEndpoint) -> io::Result<Self::Stream>;
}
