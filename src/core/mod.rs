//! Core module containing the protocol engine
//!
//! This module provides:
//! - Transport layer owning the TCP link to a device
//! - Command/response protocol with repeat pacing and inactivity framing
//! - Trace codec for human-readable wire dumps

pub mod codec;
pub mod protocol;
pub mod transport;
