//! Connection lifecycle and raw byte I/O

use super::{
    ConnectionState, ConnectionStats, DeviceEndpoint, Dialer, ReadOutcome, TcpDialer,
    TransportError,
};
use bytes::Bytes;
use std::io;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Owns at most one live stream to a device.
///
/// `Connected` always means a stream is held. Every write error, non-timeout
/// read error and end-of-stream drops the stream, so a broken link never
/// lingers as `Connected`; the next [`ensure_connected`] dials afresh.
///
/// [`ensure_connected`]: ConnectionManager::ensure_connected
pub struct ConnectionManager<D: Dialer = TcpDialer> {
    endpoint: DeviceEndpoint,
    dialer: D,
    stream: Option<D::Stream>,
    stats: ConnectionStats,
    connected_at: Option<Instant>,
}

impl ConnectionManager<TcpDialer> {
    /// Create a TCP connection manager; nothing is dialed yet
    pub fn new(endpoint: DeviceEndpoint) -> Self {
        Self::with_dialer(endpoint, TcpDialer)
    }
}

impl<D: Dialer> ConnectionManager<D> {
    /// Create a connection manager using a custom dialer
    pub fn with_dialer(endpoint: DeviceEndpoint, dialer: D) -> Self {
        Self {
            endpoint,
            dialer,
            stream: None,
            stats: ConnectionStats::default(),
            connected_at: None,
        }
    }

    /// Device this manager dials
    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    /// Current link state
    pub fn state(&self) -> ConnectionState {
        if self.stream.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// A stream is currently held
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// `host:port` of the device
    pub fn connection_info(&self) -> String {
        self.endpoint.address()
    }

    /// Get statistics
    pub fn stats(&self) -> ConnectionStats {
        let mut stats = self.stats.clone();
        if let Some(connected_at) = self.connected_at {
            stats.uptime = connected_at.elapsed();
        }
        stats
    }

    /// Open the stream unless one is already live.
    ///
    /// A no-op when connected. On failure the state stays `Disconnected`
    /// and the caller may simply try again.
    pub async fn ensure_connected(&mut self) -> Result<(), TransportError> {
        if self.stream.is_some() {
            return Ok(());
        }

        self.stats.connect_attempts += 1;
        let addr = self.endpoint.address();

        let stream = self.dialer.dial(&self.endpoint).await.map_err(|source| {
            warn!(device = %addr, error = %source, "connect failed");
            TransportError::ConnectionFailed {
                target: addr.clone(),
                source,
            }
        })?;

        match self.endpoint.receive_timeout() {
            Some(timeout) => debug!(device = %addr, ?timeout, "read inactivity timeout armed"),
            None => warn!(device = %addr, "receive timeout is 0, reads may block indefinitely"),
        }

        self.stream = Some(stream);
        self.connected_at = Some(Instant::now());
        self.stats.connects += 1;
        info!(device = %addr, "connected");

        Ok(())
    }

    /// Check the device is reachable.
    ///
    /// Leaves an existing link alone; a link opened only for the probe is
    /// closed again before returning.
    pub async fn probe(&mut self) -> bool {
        if self.is_connected() {
            return true;
        }
        if self.ensure_connected().await.is_err() {
            return false;
        }
        self.disconnect().await;
        true
    }

    /// Close the link: output side first, then the stream itself.
    ///
    /// Errors from an already half-closed stream are ignored. Returns
    /// `true` iff there was something to release.
    pub async fn disconnect(&mut self) -> bool {
        let Some(mut stream) = self.stream.take() else {
            return false;
        };

        if let Err(e) = stream.shutdown().await {
            debug!(error = %e, "output side already closed");
        }
        drop(stream);
        self.connected_at = None;
        info!(device = %self.endpoint.address(), "disconnected");

        true
    }

    /// Write all bytes and flush. Failures drop the link.
    pub async fn write_raw(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        let result = async {
            stream.write_all(data).await?;
            stream.flush().await
        }
        .await;

        if let Err(e) = result {
            self.force_disconnect("write failed", &e);
            return Err(TransportError::IoError(e));
        }

        self.stats.writes += 1;
        self.stats.bytes_sent += data.len() as u64;
        Ok(())
    }

    /// Read up to `max` bytes, waiting at most the endpoint's receive timeout.
    ///
    /// A timeout is an ordinary outcome. End-of-stream and I/O errors drop
    /// the link.
    pub async fn read_chunk(&mut self, max: usize) -> Result<ReadOutcome, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        let mut buffer = vec![0u8; max.max(1)];

        self.stats.reads += 1;
        let read = match self.endpoint.receive_timeout() {
            Some(timeout) => {
                match tokio::time::timeout(timeout, stream.read(&mut buffer)).await {
                    Ok(read) => read,
                    Err(_) => return Ok(ReadOutcome::TimedOut),
                }
            }
            None => stream.read(&mut buffer).await,
        };

        match read {
            Ok(0) => {
                self.force_disconnect("peer closed", &io::ErrorKind::UnexpectedEof.into());
                Ok(ReadOutcome::Closed)
            }
            Ok(n) => {
                buffer.truncate(n);
                self.stats.bytes_received += n as u64;
                Ok(ReadOutcome::Data(Bytes::from(buffer)))
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(ReadOutcome::TimedOut)
            }
            Err(e) => {
                self.force_disconnect("read failed", &e);
                Err(TransportError::IoError(e))
            }
        }
    }

    fn force_disconnect(&mut self, reason: &str, error: &io::Error) {
        if self.stream.take().is_some() {
            warn!(device = %self.endpoint.address(), %error, "{reason}, link dropped");
        }
        self.connected_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::testing::ScriptedDialer;
    use std::time::Duration;
    use tokio_test::io::{Builder, Mock};

    fn manager(streams: Vec<Mock>) -> ConnectionManager<ScriptedDialer<Mock>> {
        let endpoint = DeviceEndpoint::new("device.test", 60128).receive_timeout_ms(100);
        ConnectionManager::with_dialer(endpoint, ScriptedDialer::new(streams))
    }

    #[tokio::test]
    async fn test_ensure_connected_is_idempotent() {
        let mut conn = manager(vec![Builder::new().build()]);

        conn.ensure_connected().await.unwrap();
        conn.ensure_connected().await.unwrap();

        assert_eq!(conn.state(), ConnectionState::Connected);
        assert_eq!(conn.stats().connect_attempts, 1);
        assert_eq!(conn.stats().connects, 1);
    }

    #[tokio::test]
    async fn test_failed_connect_stays_disconnected() {
        let mut conn = manager(vec![]);

        let err = conn.ensure_connected().await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionFailed { .. }));
        assert!(err.to_string().contains("device.test:60128"));
        assert_eq!(conn.state(), ConnectionState::Disconnected);

        assert!(conn.ensure_connected().await.is_err());
        assert_eq!(conn.stats().connect_attempts, 2);
    }

    #[tokio::test]
    async fn test_disconnect_reports_whether_it_acted() {
        let mut conn = manager(vec![Builder::new().build()]);
        assert!(!conn.disconnect().await);

        conn.ensure_connected().await.unwrap();
        assert!(conn.disconnect().await);
        assert!(!conn.is_connected());
        assert!(!conn.disconnect().await);
    }

    #[tokio::test]
    async fn test_probe_closes_link_it_opened() {
        let mut conn = manager(vec![Builder::new().build(), Builder::new().build()]);
        assert!(conn.probe().await);
        assert!(!conn.is_connected());

        conn.ensure_connected().await.unwrap();
        assert!(conn.probe().await);
        assert!(conn.is_connected());

        conn.disconnect().await;
        assert!(!conn.probe().await);
    }

    #[tokio::test]
    async fn test_io_requires_connection() {
        let mut conn = manager(vec![]);
        assert!(matches!(
            conn.write_raw(b"PWRQSTN").await,
            Err(TransportError::NotConnected)
        ));
        assert!(matches!(
            conn.read_chunk(16).await,
            Err(TransportError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let mock = Builder::new().write(b"PWRQSTN").read(b"PWR01").build();
        let mut conn = manager(vec![mock]);
        conn.ensure_connected().await.unwrap();

        conn.write_raw(b"PWRQSTN").await.unwrap();
        let outcome = conn.read_chunk(1024).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Data(Bytes::from_static(b"PWR01")));

        let stats = conn.stats();
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.bytes_sent, 7);
        assert_eq!(stats.reads, 1);
        assert_eq!(stats.bytes_received, 5);
    }

    #[tokio::test]
    async fn test_read_respects_max() {
        let mock = Builder::new().read(b"ABCDEF").build();
        let mut conn = manager(vec![mock]);
        conn.ensure_connected().await.unwrap();

        assert_eq!(
            conn.read_chunk(4).await.unwrap(),
            ReadOutcome::Data(Bytes::from_static(b"ABCD"))
        );
        assert_eq!(
            conn.read_chunk(4).await.unwrap(),
            ReadOutcome::Data(Bytes::from_static(b"EF"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_timeout_is_not_an_error() {
        let mock = Builder::new().wait(Duration::from_secs(5)).build();
        let mut conn = manager(vec![mock]);
        conn.ensure_connected().await.unwrap();

        assert_eq!(conn.read_chunk(1024).await.unwrap(), ReadOutcome::TimedOut);
        assert!(conn.is_connected());
    }

    #[tokio::test]
    async fn test_write_failure_drops_link() {
        let mock = Builder::new()
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"))
            .build();
        let mut conn = manager(vec![mock]);
        conn.ensure_connected().await.unwrap();

        assert!(matches!(
            conn.write_raw(b"PWR01").await,
            Err(TransportError::IoError(_))
        ));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_read_failure_drops_link() {
        let mock = Builder::new()
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut conn = manager(vec![mock]);
        conn.ensure_connected().await.unwrap();

        assert!(conn.read_chunk(1024).await.is_err());
        assert!(!conn.is_connected());
    }

    #[tokio::test]
    async fn test_end_of_stream_drops_link() {
        let mut conn = manager(vec![Builder::new().build()]);
        conn.ensure_connected().await.unwrap();

        assert_eq!(conn.read_chunk(1024).await.unwrap(), ReadOutcome::Closed);
        assert!(!conn.is_connected());
    }
}
