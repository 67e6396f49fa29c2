//! CLI Module
//!
//! Provides command-line interface functionality including:
//! - Exit codes for automation
//! - Stdin batch input and response formatting

pub mod exit_codes;
pub mod pipe;

pub use exit_codes::{exit_code_description, exit_code_table, CliResult, ExitCodes};
pub use pipe::{format_output, format_response, CommandLines, LineError, OutputFormat};
