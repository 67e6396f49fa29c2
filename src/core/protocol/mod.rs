//! Command/response protocol engine
//!
//! One command at a time: write the payload (optionally repeated with a
//! pause in between), then collect whatever the device sends back until the
//! link goes quiet. There is no framing; read inactivity ends a response.

mod client;
mod command;
mod response;

pub use client::CommandClient;
pub use command::OutgoingCommand;
pub use response::{Response, Termination};

use crate::core::transport::TransportError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trace switches read from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFlags {
    /// Per-byte dumps of every payload and packet
    pub debug: bool,
    /// Coarse progress lines
    pub info: bool,
}

impl TraceFlags {
    /// Whether progress lines are wanted
    pub fn progress(&self) -> bool {
        self.debug || self.info
    }
}

/// Why a command/response cycle could not complete normally
#[derive(Error, Debug)]
pub enum LinkError {
    /// The device could not be reached
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] TransportError),

    /// The link broke while sending
    #[error("write failed: {0}")]
    WriteFailed(#[source] TransportError),

    /// The link broke while receiving
    #[error("read failed: {0}")]
    ReadFailed(#[source] TransportError),

    /// Receive was attempted without a live link
    #[error("not connected")]
    NotConnected,
}
