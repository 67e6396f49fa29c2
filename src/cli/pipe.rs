//! CLI Pipe Support
//!
//! Batch command input from stdin and response formatting for stdout.

use crate::core::codec::{create_codec, CodecType};
use crate::core::protocol::Response;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

/// Output format for responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Text with escape sequences shown
    #[default]
    Text,
    /// Compact hex
    Hex,
    /// Semicolon-joined decimal codes
    Decimal,
    /// ASCII mnemonics, non-printables bracketed
    Mnemonic,
    /// JSON object with every rendering and the exchange outcome
    Json,
}

impl OutputFormat {
    fn codec_type(self) -> Option<CodecType> {
        match self {
            Self::Text => Some(CodecType::Text),
            Self::Hex => Some(CodecType::Hex),
            Self::Decimal => Some(CodecType::Decimal),
            Self::Mnemonic => Some(CodecType::Mnemonic),
            Self::Json => None,
        }
    }
}

/// Render raw bytes in a display format
pub fn format_output(data: &[u8], format: OutputFormat) -> String {
    match format.codec_type() {
        Some(codec_type) => create_codec(codec_type).encode(data),
        None => json_value(data).to_string(),
    }
}

/// Render a response, including its outcome when JSON is requested
pub fn format_response(response: &Response, format: OutputFormat) -> String {
    if format != OutputFormat::Json {
        return format_output(response.data(), format);
    }

    let mut value = json_value(response.data());
    value["packets"] = response.packets().into();
    value["termination"] = response.termination().to_string().into();
    value["error"] = response
        .error()
        .map_or(serde_json::Value::Null, |e| e.to_string().into());
    value.to_string()
}

fn json_value(data: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "data": create_codec(CodecType::Text).encode(data),
        "hex": create_codec(CodecType::Hex).encode(data),
        "mnemonic": create_codec(CodecType::Mnemonic).encode(data),
        "length": data.len()
    })
}

/// Failure reading one batch line
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    /// The line is not UTF-8; reading can continue with the next one
    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 {
        /// 1-based line number
        line: usize,
    },
    /// The input itself failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Batch commands streamed one line at a time.
///
/// Blank lines and `#` comments are skipped. Each command is yielded as soon
/// as its line is complete, so live input is sent while it is typed.
pub struct CommandLines<R> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
}

impl CommandLines<BufReader<Stdin>> {
    /// Read commands from stdin
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> CommandLines<R> {
    /// Wrap a buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
        }
    }

    /// Next command, `Ok(None)` at end of input.
    ///
    /// An undecodable line is consumed and reported; the following call
    /// resumes on the next line.
    pub async fn next_command(&mut self) -> Result<Option<String>, LineError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let line = self.line;
            let text =
                std::str::from_utf8(&self.buf).map_err(|_| LineError::InvalidUtf8 { line })?;
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some(trimmed.to_string()));
        }
    }
}
