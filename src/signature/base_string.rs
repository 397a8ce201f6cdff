//! Signature base string construction (RFC 5849 §3.4.1).

// self
use crate::{_prelude::*, encoding::percent_encode};

/// Builds the base string `METHOD&enc(base-url)&enc(normalized-params)`.
///
/// `parameters` is every signed pair (query, form body, protocol header parameters). Any
/// `oauth_signature` pair is skipped; the header `realm` is expected to be absent already.
pub fn signature_base_string(method: &str, url: &Url, parameters: &[(String, String)]) -> String {
	format!(
		"{}&{}&{}",
		method.to_ascii_uppercase(),
		percent_encode(&normalize_url(url)),
		percent_encode(&normalize_parameters(parameters))
	)
}

/// Base string URI (§3.4.1.2): lowercase scheme and host, default ports dropped, no query or
/// fragment.
pub fn normalize_url(url: &Url) -> String {
	let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
	let port = url.port().map(|port| format!(":{port}")).unwrap_or_default();

	format!("{}://{host}{port}{}", url.scheme(), url.path())
}

/// Parameter normalization (§3.4.1.3.2): encode, sort by name then value, join.
pub fn normalize_parameters(parameters: &[(String, String)]) -> String {
	let mut encoded = parameters
		.iter()
		.filter(|(name, _)| name != "oauth_signature")
		.map(|(name, value)| (percent_encode(name), percent_encode(value)))
		.collect::<Vec<_>>();

	encoded.sort();

	encoded.into_iter().map(|(name, value)| format!("{name}={value}")).collect::<Vec<_>>().join("&")
}
