//! Byte/text conversion in the configured encoding.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::{DecodePolicy, LineEnding};

/// Decode file contents, dropping a byte order mark for `encoding`.
/// `\r\n` and lone `\r` line endings come back as `\n`.
/// Returns `None` for malformed input under [`DecodePolicy::Strict`].
pub fn decode<'a>(
    bytes: &'a [u8],
    encoding: &'static Encoding,
    policy: DecodePolicy,
) -> Option<Cow<'a, str>> {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors && policy == DecodePolicy::Strict {
        return None;
    }
    Some(normalize_newlines(text))
}

fn normalize_newlines(text: Cow<'_, str>) -> Cow<'_, str> {
    if !text.contains('\r') {
        return text;
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Encode printed text, converting `\n` to the requested line ending.
/// Returns `None` when a character has no representation in `encoding`.
pub fn encode(text: &str, encoding: &'static Encoding, line_ending: LineEnding) -> Option<Vec<u8>> {
    let text = match line_ending {
        LineEnding::Lf => Cow::Borrowed(text),
        LineEnding::CrLf => Cow::Owned(text.replace('\n', "\r\n")),
    };
    let (bytes, _, unmappable) = encoding.encode(&text);
    if unmappable {
        return None;
    }
    Some(bytes.into_owned())
}
