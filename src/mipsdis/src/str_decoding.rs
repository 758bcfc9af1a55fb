/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::{string::String, vec::Vec};
use core::{error, fmt};

/// Character encodings a `CString` symbol may be decoded with.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Encoding {
    /// The encoding most N64-era japanese games use.
    EucJp,
    ShiftJis,
    Ascii,
}

impl Encoding {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "EUC-JP" => Some(Encoding::EucJp),
            "SHIFT-JIS" => Some(Encoding::ShiftJis),
            "ASCII" => Some(Encoding::Ascii),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Encoding::EucJp => "EUC-JP",
            Encoding::ShiftJis => "SHIFT-JIS",
            Encoding::Ascii => "ASCII",
        }
    }

    /// Strict decode: any malformed sequence rejects the whole buffer.
    fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Encoding::EucJp => encoding_rs::EUC_JP
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|cow| cow.into_owned()),
            Encoding::ShiftJis => encoding_rs::SHIFT_JIS
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|cow| cow.into_owned()),
            Encoding::Ascii => {
                if bytes.iter().all(|b| *b < 0x80) {
                    core::str::from_utf8(bytes).ok().map(String::from)
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum StringDecodingError {
    MissingTerminator,
    InvalidBytes,
}

impl fmt::Display for StringDecodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringDecodingError::MissingTerminator => {
                write!(f, "The buffer does not contain a NUL terminator")
            }
            StringDecodingError::InvalidBytes => {
                write!(f, "The bytes are not valid for the requested encoding")
            }
        }
    }
}
impl error::Error for StringDecodingError {}

/// Decodes a NUL-terminated string starting at `offset`.
///
/// Returns the escaped string split into per-line chunks (one chunk per
/// embedded newline) together with the raw byte length of the string, NUL
/// terminator not included.
pub(crate) fn decode_string(
    bytes: &[u8],
    offset: usize,
    encoding: Encoding,
) -> Result<(Vec<String>, usize), StringDecodingError> {
    let tail = &bytes[offset..];
    let terminator = tail
        .iter()
        .position(|b| *b == 0)
        .ok_or(StringDecodingError::MissingTerminator)?;

    let decoded = encoding
        .decode(&tail[..terminator])
        .ok_or(StringDecodingError::InvalidBytes)?;

    let escaped = escape_string(&decoded);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut chars = escaped.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if c == '\\' {
            if let Some(next) = chars.next() {
                current.push(next);
                if next == 'n' && chars.peek().is_some() {
                    chunks.push(core::mem::take(&mut current));
                }
            }
        }
    }
    chunks.push(current);

    Ok((chunks, terminator))
}

pub(crate) fn escape_string(val: &str) -> String {
    let mut escaped_buf = Vec::with_capacity(val.len());
    let bytes = val.as_bytes();

    for b in bytes {
        // The cases of this switch are sorted by ASCII order
        match b {
            0x07 => {
                // \a
                escaped_buf.push(b'\\');
                escaped_buf.push(b'a');
            }
            b'\t' => {
                escaped_buf.push(b'\\');
                escaped_buf.push(b't');
            }
            b'\n' => {
                escaped_buf.push(b'\\');
                escaped_buf.push(b'n');
            }
            0x0C => {
                // \f
                escaped_buf.push(b'\\');
                escaped_buf.push(b'f');
            }
            b'\r' => {
                escaped_buf.push(b'\\');
                escaped_buf.push(b'r');
            }
            b'\"' => {
                escaped_buf.push(b'\\');
                escaped_buf.push(b'"');
            }
            b'\\' => {
                escaped_buf.push(b'\\');
                escaped_buf.push(b'\\');
            }
            x => escaped_buf.push(*x),
        }
    }

    String::from_utf8(escaped_buf).expect("Escaping can't break utf8 sequences")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_simple_ascii() {
        let bytes = b"hello\0\0\0";
        let (chunks, size) = decode_string(bytes, 0, Encoding::EucJp).unwrap();

        assert_eq!(chunks, vec!["hello".to_string()]);
        assert_eq!(size, 5);
    }

    #[test]
    fn decode_splits_on_newlines() {
        let bytes = b"two\nlines\0\0\0";
        let (chunks, size) = decode_string(bytes, 0, Encoding::EucJp).unwrap();

        assert_eq!(chunks, vec!["two\\n".to_string(), "lines".to_string()]);
        assert_eq!(size, 9);
    }

    #[test]
    fn decode_requires_terminator() {
        let bytes = b"oops";
        assert_eq!(
            decode_string(bytes, 0, Encoding::EucJp),
            Err(StringDecodingError::MissingTerminator)
        );
    }

    #[test]
    fn decode_rejects_invalid_bytes() {
        // A lone 0x80 is not valid EUC-JP.
        let bytes = b"\x80\x00\x00\x00";
        assert_eq!(
            decode_string(bytes, 0, Encoding::EucJp),
            Err(StringDecodingError::InvalidBytes)
        );
    }

    #[test]
    fn escape_quotes_and_backslashes() {
        assert_eq!(escape_string("a\"b\\c\n"), "a\\\"b\\\\c\\n");
    }
}
