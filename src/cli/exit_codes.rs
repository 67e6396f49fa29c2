//! CLI Exit Codes
//!
//! Standard exit codes for CLI operations and automation.

use crate::core::protocol::{LinkError, Response};
use std::process::ExitCode;

/// Exit code constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes;

impl ExitCodes {
    /// Success
    pub const SUCCESS: u8 = 0;

    /// General error
    pub const ERROR: u8 = 1;

    /// Invalid arguments
    pub const INVALID_ARGS: u8 = 2;

    /// Connection failed
    pub const CONNECTION_FAILED: u8 = 3;

    /// Device stayed silent
    pub const NO_RESPONSE: u8 = 4;

    /// Configuration error
    pub const CONFIG_ERROR: u8 = 8;

    /// Link broke mid-exchange
    pub const PROTOCOL_ERROR: u8 = 9;

    /// Internal error
    pub const INTERNAL_ERROR: u8 = 127;
}

/// CLI operation result
#[derive(Debug)]
pub enum CliResult {
    /// Success with optional message
    Success(Option<String>),

    /// Error with code and message
    Error(u8, String),
}

impl CliResult {
    /// Plain success
    pub fn success() -> Self {
        Self::Success(None)
    }

    /// Success with a status line for stderr
    pub fn success_with_message(msg: impl Into<String>) -> Self {
        Self::Success(Some(msg.into()))
    }

    /// Failure with an explicit code
    pub fn error(code: u8, msg: impl Into<String>) -> Self {
        Self::Error(code, msg.into())
    }

    /// Device could not be reached
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::Error(ExitCodes::CONNECTION_FAILED, msg.into())
    }

    /// Bad command-line input
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::Error(ExitCodes::INVALID_ARGS, msg.into())
    }

    /// Config could not be loaded or used
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Error(ExitCodes::CONFIG_ERROR, msg.into())
    }

    /// Classify a finished exchange.
    ///
    /// An empty answer is only an error when `require_response` is set.
    pub fn from_response(response: &Response, require_response: bool) -> Self {
        match response.error() {
            Some(LinkError::ConnectFailed(e)) => Self::connection_failed(e.to_string()),
            Some(err @ (LinkError::WriteFailed(_) | LinkError::ReadFailed(_))) => {
                Self::Error(ExitCodes::PROTOCOL_ERROR, err.to_string())
            }
            Some(LinkError::NotConnected) => {
                Self::connection_failed(LinkError::NotConnected.to_string())
            }
            None if require_response && response.is_empty() => Self::Error(
                ExitCodes::NO_RESPONSE,
                format!("no response ({})", response.termination()),
            ),
            None => Self::success(),
        }
    }

    /// Get exit code
    pub fn code(&self) -> u8 {
        match self {
            Self::Success(_) => ExitCodes::SUCCESS,
            Self::Error(code, _) => *code,
        }
    }

    /// Get message
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(Some(msg)) | Self::Error(_, msg) => Some(msg),
            Self::Success(None) => None,
        }
    }

    /// Convert to ExitCode
    pub fn to_exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    /// Is success?
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Exit code description
pub fn exit_code_description(code: u8) -> &'static str {
    match code {
        0 => "Success",
        1 => "General error",
        2 => "Invalid arguments",
        3 => "Connection failed",
        4 => "No response from device",
        8 => "Configuration error",
        9 => "Link failed during exchange",
        127 => "Internal error",
        _ => "Unknown error",
    }
}

/// Exit code table, one line per code
pub fn exit_code_table() -> String {
    let mut table = String::from("Exit Codes:");
    for code in [0, 1, 2, 3, 4, 8, 9, 127] {
        table.push_str(&format!("\n  {:>3}  {}", code, exit_code_description(code)));
    }
    table
}
