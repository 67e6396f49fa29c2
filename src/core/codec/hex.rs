//! Hexadecimal conversions for wire traces

use super::text::text_to_bytes;
use super::{Codec, CodecError, CodecType};
use bytes::Bytes;

/// Two lowercase hex digits per character, zero-padded, no separator.
///
/// Characters above U+00FF render with as many digits as their code point
/// needs; wire text never contains them.
pub fn to_hex(text: &str) -> String {
    text.chars()
        .map(|c| format!("{:02x}", u32::from(c)))
        .collect()
}

/// Inverse of [`to_hex`], consuming the input two digits at a time.
///
/// A trailing unpaired digit on odd-length input is dropped.
pub fn hex_to_text(hex: &str) -> Result<String, CodecError> {
    let digits: Vec<char> = hex.chars().collect();
    let mut output = String::with_capacity(digits.len() / 2);

    for (pair_idx, pair) in digits.chunks_exact(2).enumerate() {
        let value = pair
            .iter()
            .enumerate()
            .try_fold(0u32, |acc, (offset, &digit)| {
                digit
                    .to_digit(16)
                    .map(|nibble| (acc << 4) | nibble)
                    .ok_or(CodecError::InvalidCharacter(pair_idx * 2 + offset, digit))
            })?;
        output.extend(char::from_u32(value));
    }

    Ok(output)
}

/// Read the characters of `text` as the bytes of a big-endian unsigned integer.
///
/// Used to decode binary length/size header fields seen in traces, e.g.
/// `"\0\0\0\x10"` is 16.
pub fn big_endian_value(text: &str) -> Result<u64, CodecError> {
    let bytes = text_to_bytes(text);
    if bytes.len() > 8 {
        return Err(CodecError::InvalidFormat(format!(
            "{} bytes do not fit in a 64-bit integer",
            bytes.len()
        )));
    }

    Ok(bytes
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Compact lowercase hex codec, the same rendering as [`to_hex`]
#[derive(Debug, Clone, Copy, Default)]
pub struct HexCodec;

impl Codec for HexCodec {
    fn encode(&self, data: &[u8]) -> String {
        ::hex::encode(data)
    }

    /// Same rules as [`hex_to_text`]; surrounding whitespace is ignored
    fn decode(&self, text: &str) -> Result<Bytes, CodecError> {
        hex_to_text(text.trim()).map(|decoded| Bytes::from(text_to_bytes(&decoded)))
    }

    fn codec_type(&self) -> CodecType {
        CodecType::Hex
    }
}
