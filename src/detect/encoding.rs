//! Ordered text decoding

use std::borrow::Cow;
use std::str;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text encodings tried, in order, when decoding delimited input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 without a byte-order mark
    Utf8,
    /// UTF-8 with an optional leading byte-order mark
    Utf8Sig,
    /// Latin-1 (decoded as its WHATWG superset windows-1252); never fails
    Latin1,
}

impl TextEncoding {
    /// Order used by the strict tab reader and the generic delimited reader
    pub const FILE_ORDER: [TextEncoding; 3] =
        [TextEncoding::Utf8, TextEncoding::Utf8Sig, TextEncoding::Latin1];

    /// Order used when sampling text for delimiter sniffing
    pub const SAMPLE_ORDER: [TextEncoding; 2] = [TextEncoding::Utf8, TextEncoding::Latin1];

    /// Decode a complete buffer
    pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            TextEncoding::Utf8 => {
                if bytes.starts_with(UTF8_BOM) {
                    return None;
                }
                str::from_utf8(bytes).ok().map(Cow::Borrowed)
            }
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                str::from_utf8(body).ok().map(Cow::Borrowed)
            }
            TextEncoding::Latin1 => {
                let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
                Some(text)
            }
        }
    }

    /// Decode the head of a file, tolerating a multi-byte character cut off
    /// at the end of the buffer
    pub fn decode_prefix(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            TextEncoding::Utf8 | TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                match str::from_utf8(body) {
                    Ok(text) => Some(Cow::Borrowed(text)),
                    Err(e) if e.error_len().is_none() => {
                        str::from_utf8(&body[..e.valid_up_to()]).ok().map(Cow::Borrowed)
                    }
                    Err(_) => None,
                }
            }
            TextEncoding::Latin1 => self.decode(bytes),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
        }
    }
}
