//! Send/receive cycle over a managed connection

use super::{LinkError, OutgoingCommand, Response, Termination, TraceFlags};
use crate::core::codec::{bytes_to_text, debug_dump, to_ascii_mnemonics};
use crate::core::transport::{
    ConnectionManager, DeviceEndpoint, Dialer, ReadOutcome, TcpDialer, TransportError,
    DEFAULT_CHUNK_SIZE,
};
use bytes::BytesMut;
use tracing::{debug, info, warn};

/// Command/response client for one device.
///
/// Every operation takes `&mut self`: one command is in flight at a time and
/// concurrent callers must share the client behind a lock.
pub struct CommandClient<D: Dialer = TcpDialer> {
    conn: ConnectionManager<D>,
    trace: TraceFlags,
    chunk_size: usize,
}

impl CommandClient<TcpDialer> {
    /// Create a TCP client; the link opens lazily on the first send
    pub fn new(endpoint: DeviceEndpoint) -> Self {
        Self::with_dialer(endpoint, TcpDialer)
    }
}

impl<D: Dialer> CommandClient<D> {
    /// Create a client using a custom dialer
    pub fn with_dialer(endpoint: DeviceEndpoint, dialer: D) -> Self {
        Self {
            conn: ConnectionManager::with_dialer(endpoint, dialer),
            trace: TraceFlags::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set trace switches
    #[must_use]
    pub fn with_trace(mut self, trace: TraceFlags) -> Self {
        self.trace = trace;
        self
    }

    /// Set the read buffer size. A chunk that fills it means more is coming.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Active trace switches
    pub fn trace(&self) -> TraceFlags {
        self.trace
    }

    /// Underlying connection manager
    pub fn connection(&self) -> &ConnectionManager<D> {
        &self.conn
    }

    /// Mutable access for connect/probe outside a send
    pub fn connection_mut(&mut self) -> &mut ConnectionManager<D> {
        &mut self.conn
    }

    /// Close the link; see [`ConnectionManager::disconnect`]
    pub async fn disconnect(&mut self) -> bool {
        self.conn.disconnect().await
    }

    /// Send single-byte text once and collect the response
    pub async fn send_text(&mut self, text: &str) -> Response {
        self.send(&OutgoingCommand::from_text(text)).await
    }

    /// Send a command and collect the response.
    ///
    /// Connects first if needed. A failed connect or a broken write skips the
    /// remaining writes but still runs [`receive`](Self::receive), which then
    /// comes back empty; the failure is reported in [`Response::error`].
    pub async fn send(&mut self, command: &OutgoingCommand) -> Response {
        let failure = match self.conn.ensure_connected().await {
            Ok(()) => self.transmit(command).await.err().map(LinkError::WriteFailed),
            Err(e) => Some(LinkError::ConnectFailed(e)),
        };

        let mut response = self.receive().await;
        if failure.is_some() {
            response.error = failure;
        }
        response
    }

    async fn transmit(&mut self, command: &OutgoingCommand) -> Result<(), TransportError> {
        let label = command.display_label();
        let repeat = command.repeat_count();
        let delay = command
            .delay()
            .unwrap_or_else(|| self.conn.endpoint().send_delay());

        if self.trace.debug {
            let text = bytes_to_text(command.payload());
            debug!(
                %label,
                payload = ?text,
                repeat,
                "sending\n{}",
                debug_dump(&text)
            );
        } else if self.trace.info {
            info!(%label, repeat, "sending");
        }

        for i in 0..repeat {
            if i > 0 {
                // some devices drop commands that arrive back to back
                tokio::time::sleep(delay).await;
            }

            self.conn.write_raw(command.payload()).await?;

            if self.trace.progress() {
                info!(
                    send = i + 1,
                    at = %chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    "sent"
                );
            }
        }

        Ok(())
    }

    /// Collect one response.
    ///
    /// Waits the endpoint's settle delay, then reads chunk by chunk. The loop
    /// ends on a chunk shorter than the buffer, on read inactivity, on end of
    /// stream, or on an I/O error. The short-read rule assumes each device
    /// packet lands in one read; unusual TCP segmentation can split or merge
    /// responses.
    pub async fn receive(&mut self) -> Response {
        tokio::time::sleep(self.conn.endpoint().receive_wait()).await;

        if !self.conn.is_connected() {
            warn!(device = %self.conn.connection_info(), "not connected, nothing to receive");
            return Response::not_connected();
        }

        if self.trace.debug {
            debug!("reading response");
        }

        let mut data = BytesMut::new();
        let mut packets = 0usize;
        let mut error = None;

        let termination = loop {
            match self.conn.read_chunk(self.chunk_size).await {
                Ok(ReadOutcome::Data(chunk)) => {
                    packets += 1;
                    if self.trace.debug {
                        debug!(
                            packet = packets,
                            len = chunk.len(),
                            "{}",
                            to_ascii_mnemonics(&bytes_to_text(&chunk), true)
                        );
                    }
                    data.extend_from_slice(&chunk);
                    if chunk.len() < self.chunk_size {
                        break Termination::ShortRead;
                    }
                }
                Ok(ReadOutcome::TimedOut) => break Termination::TimedOut,
                Ok(ReadOutcome::Closed) => break Termination::EndOfStream,
                Err(e) => {
                    error = Some(LinkError::ReadFailed(e));
                    break Termination::ReadFailed;
                }
            }
        };

        if self.trace.debug {
            debug!(bytes = data.len(), %termination, "done reading response");
        }

        Response {
            data: data.freeze(),
            packets,
            termination,
            error,
        }
    }
}
