//! Diagram source to URL token encoding.
//!
//! A token is the zlib-compressed source (maximum compression level) written
//! in the URL-safe base64 alphabet (`-` and `_` instead of `+` and `/`) with
//! padding stripped. This is the one canonical variant used for every dialect
//! and every service.
//!
//! The only hard invariant: `decode(encode(s, d)) == wrap_markers(s, d)`.

use std::borrow::Cow;
use std::fmt;
use std::io::{Read, Write};

use base64::Engine;
use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD, URL_SAFE_NO_PAD};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::language::Dialect;

/// Decoder that tolerates tokens produced with or without trailing `=`.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// URL-safe encoded, compressed diagram source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Token decoding error.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64 in token: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("corrupt compressed stream: {0}")]
    Inflate(#[from] std::io::Error),
    #[error("decoded source is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Surround `source` with the dialect's begin/end markers when it lacks them.
///
/// Wrapping is idempotent: text that already contains the begin marker is
/// returned unchanged.
#[must_use]
pub fn wrap_markers(source: &str, dialect: Dialect) -> Cow<'_, str> {
    match dialect.markers() {
        Some((begin, end)) if !source.contains(begin) => {
            Cow::Owned(format!("{begin}\n{source}\n{end}"))
        }
        _ => Cow::Borrowed(source),
    }
}

/// Encode diagram source into a URL token.
///
/// Empty input is accepted and yields a valid (if meaningless) token.
///
/// # Panics
///
/// Compression writes into an in-memory buffer and cannot fail; a failure here
/// is a broken invariant and aborts.
#[must_use]
pub fn encode(source: &str, dialect: Dialect) -> Token {
    let text = wrap_markers(source, dialect);

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(text.as_bytes())
        .expect("compressing into a Vec cannot fail");
    let compressed = encoder
        .finish()
        .expect("compressing into a Vec cannot fail");

    Token(URL_SAFE_NO_PAD.encode(compressed))
}

/// Decode a token back into the (marker-wrapped) source it was made from.
pub fn decode(token: &str) -> Result<String, DecodeError> {
    let compressed = LENIENT_URL_SAFE.decode(token.trim())?;

    let mut bytes = Vec::new();
    ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut bytes)?;

    Ok(String::from_utf8(bytes)?)
}
