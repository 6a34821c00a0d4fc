//! Character encoding detection and transcoding.
//!
//! Repository pages arrive as bytes. The charset is taken from the
//! `Content-Type` header when the transport supplies one, then from an XML
//! declaration (full-text records), then from HTML meta tags, and finally
//! defaults to UTF-8.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// Match `charset=...` inside a `Content-Type` header value
#[allow(clippy::expect_used)]
static HEADER_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([^"';\s]+)"#).expect("valid regex")
});

/// Match `<?xml version="1.0" encoding="..."?>`
#[allow(clippy::expect_used)]
static XML_DECL_ENCODING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*<\?xml[^>]+encoding\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>]+)"#).expect("valid regex")
});

/// Detect character encoding of a fetched document.
///
/// Only the first 1024 bytes are examined for in-document declarations.
#[must_use]
pub fn detect_encoding(bytes: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some(encoding) = content_type.and_then(|ct| label_from(&HEADER_CHARSET_RE, ct)) {
        return encoding;
    }

    let head = &bytes[..bytes.len().min(1024)];
    let head_str = String::from_utf8_lossy(head);

    if let Some(encoding) = label_from(&XML_DECL_ENCODING_RE, &head_str) {
        return encoding;
    }

    // Covers both `<meta charset>` and the `http-equiv` content form
    if let Some(encoding) = label_from(&CHARSET_META_RE, &head_str) {
        return encoding;
    }

    UTF_8
}

fn label_from(re: &Regex, haystack: &str) -> Option<&'static Encoding> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
}

/// Transcode document bytes to a UTF-8 string.
///
/// Invalid sequences are replaced with U+FFFD rather than failing the
/// document.
#[must_use]
pub fn decode_document(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(bytes, content_type);

    if encoding == UTF_8 {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    let (decoded, _encoding_used, _had_errors) = encoding.decode(bytes);
    decoded.into_owned()
}
