//! Trace codec: human-readable renderings of wire traffic
//!
//! Supports different display formats:
//! - Text (single byte per character)
//! - Hexadecimal
//! - Decimal codes
//! - ASCII mnemonics (`LF`, `ESC`, ...)
//!
//! All conversions are pure; the only shared state is the read-only
//! mnemonic table in [`ascii`].

pub mod ascii;
pub mod hex;
pub mod text;

pub use self::ascii::{is_printable, mnemonic, to_ascii_mnemonics, MnemonicCodec};
pub use self::hex::{big_endian_value, hex_to_text, to_hex, HexCodec};
pub use self::text::{
    bytes_to_text, parse_escapes, text_to_bytes, to_decimal_codes, DecimalCodec, TextCodec,
};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Codec type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecType {
    /// Plain single-byte text
    #[default]
    Text,
    /// Hexadecimal display
    Hex,
    /// Semicolon-joined decimal codes
    Decimal,
    /// ASCII mnemonics
    Mnemonic,
}

impl fmt::Display for CodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Hex => write!(f, "hex"),
            Self::Decimal => write!(f, "decimal"),
            Self::Mnemonic => write!(f, "mnemonic"),
        }
    }
}

/// Codec trait for data transformation
pub trait Codec: Send + Sync {
    /// Encode bytes to display string
    fn encode(&self, data: &[u8]) -> String;

    /// Decode display string to bytes
    fn decode(&self, text: &str) -> Result<Bytes, CodecError>;

    /// Get codec type
    fn codec_type(&self) -> CodecType;
}

/// Codec errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Invalid input format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Invalid character
    #[error("Invalid character at position {0}: {1:?}")]
    InvalidCharacter(usize, char),

    /// Codec is display-only
    #[error("{0} codec cannot decode")]
    Unsupported(CodecType),
}

/// Create a codec from type
pub fn create_codec(codec_type: CodecType) -> Box<dyn Codec> {
    match codec_type {
        CodecType::Text => Box::new(TextCodec::new().show_escape_sequences(true)),
        CodecType::Hex => Box::new(HexCodec),
        CodecType::Decimal => Box::new(DecimalCodec),
        CodecType::Mnemonic => Box::new(MnemonicCodec::new()),
    }
}

/// Column table of `text`: character index, hex, decimal and mnemonic rows,
/// every cell right-aligned to five columns.
pub fn debug_dump(text: &str) -> String {
    const WIDTH: usize = 5;

    let mut index_row = String::from("  CHAR#:");
    let mut hex_row = String::from("    Hex:");
    let mut dec_row = String::from(" Base10:");
    let mut ascii_row = String::from("  ASCII:");

    for (i, c) in text.chars().enumerate() {
        let code = u32::from(c);
        index_row.push_str(&format!("{i:>WIDTH$}"));
        hex_row.push_str(&format!("{:>WIDTH$}", format!("0x{code:02x}")));
        dec_row.push_str(&format!("{:>WIDTH$}", format!("{code:02}")));
        ascii_row.push_str(&format!("{:>WIDTH$}", mnemonic(code, false)));
    }

    [index_row, hex_row, dec_row, ascii_row].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_dump() {
        let dump = debug_dump("!\r");
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "  CHAR#:    0    1");
        assert_eq!(lines[1], "    Hex: 0x21 0x0d");
        assert_eq!(lines[2], " Base10:   33   13");
        assert_eq!(lines[3], "  ASCII:    !   CR");
    }

    #[test]
    fn test_create_codec() {
        for codec_type in [
            CodecType::Text,
            CodecType::Hex,
            CodecType::Decimal,
            CodecType::Mnemonic,
        ] {
            assert_eq!(create_codec(codec_type).codec_type(), codec_type);
        }
        assert_eq!(create_codec(CodecType::Hex).encode(b"\r\n"), "0d0a");
    }
}
