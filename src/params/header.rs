//! `Authorization: OAuth` header parsing (RFC 5849 §3.5.1).

// self
use crate::{encoding::percent_decode, error::MalformedRequestError};

const SCHEME: &str = "OAuth";

/// Parses an `Authorization` header value.
///
/// Returns `Ok(None)` for other authentication schemes. Only `realm` and `oauth_*` pairs are
/// kept; names and values are percent-decoded.
pub fn parse_authorization_header(
	value: &str,
) -> Result<Option<Vec<(String, String)>>, MalformedRequestError> {
	let value = value.trim();
	let (scheme, rest) = value.split_once(char::is_whitespace).unwrap_or((value, ""));

	if !scheme.eq_ignore_ascii_case(SCHEME) {
		return Ok(None);
	}

	let mut pairs = Vec::new();

	for item in rest.split(',').map(str::trim).filter(|item| !item.is_empty()) {
		let (name, quoted) =
			item.split_once('=').ok_or(MalformedRequestError::InvalidAuthorizationHeader)?;
		let raw = quoted
			.trim()
			.strip_prefix('"')
			.and_then(|v| v.strip_suffix('"'))
			.ok_or(MalformedRequestError::InvalidAuthorizationHeader)?;
		let name =
			percent_decode(name.trim()).ok_or(MalformedRequestError::InvalidAuthorizationHeader)?;

		if name != "realm" && !name.starts_with("oauth_") {
			continue;
		}

		let value = percent_decode(raw).ok_or(MalformedRequestError::InvalidAuthorizationHeader)?;

		pairs.push((name, value));
	}

	Ok(Some(pairs))
}
