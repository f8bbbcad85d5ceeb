//! Decoding of raw HTML bytes into UTF-8 text.
//!
//! Pages are usually handed over as strings, but fetched bodies arrive as
//! bytes. The charset is taken from a byte order mark or from the first
//! `<meta>` declaration in the head; anything else is read as UTF-8.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// Number of leading bytes searched for a charset declaration.
const SNIFF_LIMIT: usize = 1024;

/// Matches both `<meta charset="...">` and the `http-equiv` content form.
#[allow(clippy::expect_used)]
static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?([A-Za-z0-9_:.\-]+)"#).expect("valid regex")
});

/// Determine the encoding of an HTML byte stream.
///
/// A byte order mark wins over any declaration. Unknown labels fall back
/// to UTF-8.
#[must_use]
pub fn sniff_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(html) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(SNIFF_LIMIT)]);
    META_CHARSET_RE
        .captures(&head)
        .and_then(|c| c.get(1))
        .and_then(|label| Encoding::for_label(label.as_str().as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode HTML bytes to a UTF-8 string.
///
/// Malformed sequences are replaced with U+FFFD instead of failing.
///
/// # Examples
///
/// ```
/// use rs_mlscraper::encoding::decode_html;
///
/// let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xE9</body></html>";
/// assert!(decode_html(html).contains("Café"));
/// ```
#[must_use]
pub fn decode_html(html: &[u8]) -> String {
    let (decoded, _, _) = sniff_encoding(html).decode(html);
    decoded.into_owned()
}
