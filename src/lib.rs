//! # Avlink Core Library
//!
//! Command/response client for AV devices controlled by short ASCII
//! commands over a raw TCP socket (eISCP and similar protocols):
//! - Lazy connect, explicit disconnect, broken links never linger
//! - Repeated sends paced by a fixed delay
//! - Responses framed by read inactivity, not length or terminator
//! - Trace codec rendering wire bytes as hex, decimal and ASCII mnemonics
//!
//! ## Example
//!
//! ```rust,no_run
//! use avlink_core::{CommandClient, DeviceEndpoint, OutgoingCommand};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let endpoint = DeviceEndpoint::new("192.168.1.40", 60128).receive_timeout_ms(300);
//!     let mut client = CommandClient::new(endpoint);
//!
//!     let response = client
//!         .send(&OutgoingCommand::from_text("!1MVLUP\r").repeat(3))
//!         .await;
//!     println!("{}", response.text());
//!
//!     let bytes = client.send_text("!1PWRQSTN\r").await.into_result()?;
//!     println!("{} bytes", bytes.len());
//!
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::cli::{CliResult, ExitCodes, OutputFormat};
pub use crate::config::{AppConfig, ConfigError, ConfigSource};
pub use crate::core::codec::{Codec, CodecError, CodecType};
pub use crate::core::protocol::{
    CommandClient, LinkError, OutgoingCommand, Response, Termination, TraceFlags,
};
pub use crate::core::transport::{
    ConnectionManager, ConnectionState, ConnectionStats, DeviceEndpoint, Dialer, ReadOutcome,
    TcpDialer, TransportError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
