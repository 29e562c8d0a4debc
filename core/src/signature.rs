//! Request signature computation.
//!
//! # Design
//! The remote API authenticates a call with a SHA-1 digest over a
//! `+`-separated string of the application secret, consumer key, method,
//! full URL, body and timestamp. The digest is taken over the ISO-8859-1
//! encoding of that string; a UTF-8 digest differs for any non-ASCII body
//! and is rejected by the server.

use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};

/// Prefix identifying the signature scheme version.
pub const SIGNATURE_PREFIX: &str = "$1$";

/// Build the string whose digest becomes the signature.
///
/// An empty body still contributes an empty segment, so the result always
/// holds exactly five `+` separators plus any the fields contain.
pub fn signing_string(
    application_secret: &str,
    consumer_key: &str,
    method: &str,
    url: &str,
    body: &str,
    timestamp: i64,
) -> String {
    format!("{application_secret}+{consumer_key}+{method}+{url}+{body}+{timestamp}")
}

/// Encode `text` as ISO-8859-1. Characters above U+00FF become `?`.
pub fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Lower-case hex SHA-1 of `data`.
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(digest(&SHA1_FOR_LEGACY_USE_ONLY, data))
}

/// Compute the `X-Ovh-Signature` header value.
pub fn sign(
    application_secret: &str,
    consumer_key: &str,
    method: &str,
    url: &str,
    body: &str,
    timestamp: i64,
) -> String {
    let to_sign = signing_string(application_secret, consumer_key, method, url, body, timestamp);
    format!("{SIGNATURE_PREFIX}{}", sha1_hex(&to_latin1(&to_sign)))
}
