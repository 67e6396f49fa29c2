//! ASCII mnemonic table and printability rules

use super::{Codec, CodecError, CodecType};
use bytes::Bytes;

/// Marker rendered for codes outside the 0-127 table
pub const NOT_FOUND: &str = "[NOTFOUND]";

/// Symbolic names for every 7-bit ASCII code, indexed by code value
pub static ASCII_MNEMONICS: [&str; 128] = [
    "NUL", "SOH", "STX", "ETX", "EOT", "ENQ", "ACK", "BEL", // 0-7
    "BS", "TAB", "LF", "VT", "FF", "CR", "SO", "SI", // 8-15
    "DLE", "DC1", "DC2", "DC3", "DC4", "NAK", "SYN", "ETB", // 16-23
    "CAN", "EM", "EOF", "ESC", "FS", "GS", "RS", "US", // 24-31
    "SPC", "!", "\"", "#", "$", "%", "&", "'", // 32-39
    "(", ")", "*", "+", ",", "-", ".", "/", // 40-47
    "0", "1", "2", "3", "4", "5", "6", "7", // 48-55
    "8", "9", ":", ";", "<", "=", ">", "?", // 56-63
    "@", "A", "B", "C", "D", "E", "F", "G", // 64-71
    "H", "I", "J", "K", "L", "M", "N", "O", // 72-79
    "P", "Q", "R", "S", "T", "U", "V", "W", // 80-87
    "X", "Y", "Z", "[", "\\", "]", "^", "_", // 88-95
    "`", "a", "b", "c", "d", "e", "f", "g", // 96-103
    "h", "i", "j", "k", "l", "m", "n", "o", // 104-111
    "p", "q", "r", "s", "t", "u", "v", "w", // 112-119
    "x", "y", "z", "{", "|", "}", "~", "DEL", // 120-127
];

/// A code is non-printable iff it is 32 or below, or exactly 127.
pub fn is_printable(code: u32) -> bool {
    !(code <= 32 || code == 127)
}

/// Mnemonic for a single code.
///
/// Codes outside 0-127 always yield [`NOT_FOUND`], unbracketed. With
/// `bracket_non_printable` set, control codes, space and DEL come back
/// wrapped in square brackets, e.g. `[LF]`.
pub fn mnemonic(code: u32, bracket_non_printable: bool) -> String {
    let Some(name) = usize::try_from(code)
        .ok()
        .and_then(|idx| ASCII_MNEMONICS.get(idx))
    else {
        return NOT_FOUND.to_string();
    };

    if bracket_non_printable && !is_printable(code) {
        format!("[{name}]")
    } else {
        (*name).to_string()
    }
}

/// Render every character of `text` as its mnemonic, concatenated.
pub fn to_ascii_mnemonics(text: &str, bracket_non_printable: bool) -> String {
    text.chars()
        .map(|c| mnemonic(u32::from(c), bracket_non_printable))
        .collect()
}

/// Codec rendering raw bytes as bracketed mnemonics
pub struct MnemonicCodec {
    bracket_non_printable: bool,
}

impl MnemonicCodec {
    /// Create a mnemonic codec that brackets non-printable codes
    pub fn new() -> Self {
        Self {
            bracket_non_printable: true,
        }
    }

    /// Toggle bracketing of non-printable codes
    #[must_use]
    pub fn bracket_non_printable(mut self, bracket: bool) -> Self {
        self.bracket_non_printable = bracket;
        self
    }
}

impl Default for MnemonicCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for MnemonicCodec {
    fn encode(&self, data: &[u8]) -> String {
        data.iter()
            .map(|&b| mnemonic(u32::from(b), self.bracket_non_printable))
            .collect()
    }

    fn decode(&self, _text: &str) -> Result<Bytes, CodecError> {
        Err(CodecError::Unsupported(CodecType::Mnemonic))
    }

    fn codec_type(&self) -> CodecType {
        CodecType::Mnemonic
    }
}
