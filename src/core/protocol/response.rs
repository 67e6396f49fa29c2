//! Accumulated device response

use super::LinkError;
use crate::core::codec::bytes_to_text;
use bytes::Bytes;
use std::fmt;

/// How the read loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A chunk smaller than the read buffer arrived
    ShortRead,
    /// The link went quiet for the receive timeout
    TimedOut,
    /// The device closed the stream
    EndOfStream,
    /// There was no link to read from
    NotConnected,
    /// An I/O error broke the link
    ReadFailed,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortRead => write!(f, "short read"),
            Self::TimedOut => write!(f, "timed out"),
            Self::EndOfStream => write!(f, "end of stream"),
            Self::NotConnected => write!(f, "not connected"),
            Self::ReadFailed => write!(f, "read failed"),
        }
    }
}

/// Raw bytes a device sent back for one command.
///
/// Always carries whatever arrived, even when `error` is set, so callers
/// can tell a silent device (empty, no error) from a broken link.
#[derive(Debug)]
pub struct Response {
    pub(super) data: Bytes,
    pub(super) packets: usize,
    pub(super) termination: Termination,
    pub(super) error: Option<LinkError>,
}

impl Response {
    pub(super) fn not_connected() -> Self {
        Self {
            data: Bytes::new(),
            packets: 0,
            termination: Termination::NotConnected,
            error: Some(LinkError::NotConnected),
        }
    }

    /// Raw response bytes
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Response decoded as single-byte text
    pub fn text(&self) -> String {
        bytes_to_text(&self.data)
    }

    /// Number of bytes received
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Nothing was received
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of chunks read
    pub fn packets(&self) -> usize {
        self.packets
    }

    /// Why the read loop stopped
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// The first failure of the cycle, if any
    pub fn error(&self) -> Option<&LinkError> {
        self.error.as_ref()
    }

    /// No link failure occurred (the device may still have said nothing)
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Bytes on success, the link failure otherwise
    pub fn into_result(self) -> Result<Bytes, LinkError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }
}
