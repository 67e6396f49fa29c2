//! TCP dialer

use super::{DeviceEndpoint, Dialer};
use async_trait::async_trait;
use std::io;
use tokio::net::TcpStream;

/// Opens plain TCP streams
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

#[async_trait]
impl Dialer for TcpDialer {
    type Stream = TcpStream;

    async fn dial(&self, endpoint: &DeviceEndpoint) -> io::Result<TcpStream> {
        let addr = endpoint.address();

        let stream = tokio::time::timeout(endpoint.connect_timeout(), TcpStream::connect(&addr))
            .await
            .map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no answer within {} ms", endpoint.connect_timeout_ms),
                )
            })??;

        // Commands are tiny; don't let Nagle hold them back
        stream.set_nodelay(true)?;

        Ok(stream)
    }
}
