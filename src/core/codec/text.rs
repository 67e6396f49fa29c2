//! Single-byte text conversions
//!
//! Wire payloads are treated as one byte per character: byte `b` maps to
//! code point `U+00bb` and back.

use super::{Codec, CodecError, CodecType};
use bytes::Bytes;

/// Decode wire bytes as single-byte text.
pub fn bytes_to_text(data: &[u8]) -> String {
    data.iter().map(|&b| char::from(b)).collect()
}

/// Encode text as wire bytes, one byte per character.
///
/// Characters above U+00FF keep only their low byte.
pub fn text_to_bytes(text: &str) -> Vec<u8> {
    text.chars().map(char_to_byte).collect()
}

#[allow(clippy::cast_possible_truncation)]
fn char_to_byte(c: char) -> u8 {
    u32::from(c) as u8
}

/// Semicolon-joined decimal code point of each character.
pub fn to_decimal_codes(text: &str) -> String {
    text.chars()
        .map(|c| u32::from(c).to_string())
        .collect::<Vec<_>>()
        .join(";")
}

/// Parse backslash escapes (`\r`, `\n`, `\t`, `\0`, `\e`, `\xHH`, `\\`)
/// in a command typed by a human into wire bytes.
///
/// Unknown escapes are kept verbatim, backslash included.
pub fn parse_escapes(text: &str) -> Result<Bytes, CodecError> {
    let mut output = Vec::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(char_to_byte(c));
            continue;
        }
        match chars.next() {
            Some('r') => output.push(b'\r'),
            Some('n') => output.push(b'\n'),
            Some('t') => output.push(b'\t'),
            Some('0') => output.push(0),
            Some('e') => output.push(0x1b),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() != 2 {
                    return Err(CodecError::InvalidFormat(
                        "Incomplete hex sequence".to_string(),
                    ));
                }
                let byte = u8::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.chars().all(|c| c.is_ascii_hexdigit()))
                    .ok_or_else(|| {
                        CodecError::InvalidFormat(format!("Invalid hex sequence: \\x{hex}"))
                    })?;
                output.push(byte);
            }
            Some('\\') => output.push(b'\\'),
            Some(other) => {
                output.push(b'\\');
                output.push(char_to_byte(other));
            }
            None => output.push(b'\\'),
        }
    }

    Ok(Bytes::from(output))
}

/// Text codec for plain text display
pub struct TextCodec {
    show_escape_sequences: bool,
}

impl TextCodec {
    /// Create a new text codec printing bytes as-is
    pub fn new() -> Self {
        Self {
            show_escape_sequences: false,
        }
    }

    /// Enable escape sequence display
    #[must_use]
    pub fn show_escape_sequences(mut self, show: bool) -> Self {
        self.show_escape_sequences = show;
        self
    }
}

impl Default for TextCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for TextCodec {
    fn encode(&self, data: &[u8]) -> String {
        if !self.show_escape_sequences {
            return bytes_to_text(data);
        }

        let mut output = String::with_capacity(data.len() * 2);
        for &byte in data {
            match byte {
                b'\r' => output.push_str("\\r"),
                b'\n' => output.push_str("\\n"),
                b'\t' => output.push_str("\\t"),
                b'\0' => output.push_str("\\0"),
                b'\\' => output.push_str("\\\\"),
                0x1b => output.push_str("\\e"),
                b if b.is_ascii_graphic() || b == b' ' => output.push(char::from(b)),
                b => output.push_str(&format!("\\x{b:02x}")),
            }
        }
        output
    }

    fn decode(&self, text: &str) -> Result<Bytes, CodecError> {
        parse_escapes(text)
    }

    fn codec_type(&self) -> CodecType {
        CodecType::Text
    }
}

/// Codec rendering bytes as semicolon-joined decimal codes
pub struct DecimalCodec;

impl Codec for DecimalCodec {
    fn encode(&self, data: &[u8]) -> String {
        to_decimal_codes(&bytes_to_text(data))
    }

    fn decode(&self, text: &str) -> Result<Bytes, CodecError> {
        if text.is_empty() {
            return Ok(Bytes::new());
        }
        text.split(';')
            .map(|code| {
                code.trim()
                    .parse::<u8>()
                    .map_err(|e| CodecError::InvalidFormat(format!("{code}: {e}")))
            })
            .collect::<Result<Vec<u8>, _>>()
            .map(Bytes::from)
    }

    fn codec_type(&self) -> CodecType {
        CodecType::Decimal
    }
}
