//! RFC 5849 §3.6 percent-encoding.
//!
//! Only the RFC 3986 unreserved set (`ALPHA`, `DIGIT`, `-`, `.`, `_`, `~`) is left as-is; every
//! other byte of the UTF-8 encoding becomes `%XX` with uppercase hex digits.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Encodes a value for use in base strings and `Authorization` headers.
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Decodes a percent-encoded value; `None` when the result is not valid UTF-8.
///
/// Unlike form decoding, `+` is kept literally.
pub fn percent_decode(value: &str) -> Option<String> {
	percent_decode_str(value).decode_utf8().ok().map(|decoded| decoded.into_owned())
}

/// Returns true if every byte belongs to the unreserved set.
pub fn is_unreserved(value: &str) -> bool {
	value.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn encodes_reserved_characters() {
		assert_eq!(percent_encode("abcABC123-._~"), "abcABC123-._~");
		assert_eq!(percent_encode("a b+c"), "a%20b%2Bc");
		assert_eq!(percent_encode("=%3D"), "%3D%253D");
		assert_eq!(percent_encode("*!"), "%2A%21");
		assert_eq!(percent_encode("é"), "%C3%A9");
	}

	#[test]
	fn decodes_without_plus_translation() {
		assert_eq!(percent_decode("a%20b+c").as_deref(), Some("a b+c"));
		assert_eq!(percent_decode("%C3%A9").as_deref(), Some("é"));
		assert_eq!(percent_decode("%FF"), None);
	}

	#[test]
	fn unreserved_detection() {
		assert!(is_unreserved("Abc-123._~"));
		assert!(!is_unreserved("abc def"));
		assert!(!is_unreserved("abc/def"));
	}
}
