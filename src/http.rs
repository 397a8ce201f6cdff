//! Transport-neutral request and response values.
//!
//! The provider never talks to a socket. Web frameworks convert their request type into an
//! [`IncomingRequest`], hand it to the provider, and render the returned [`FormResponse`] or
//! [`AuthorizationRedirect`] however they like.

// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Media type of form-encoded bodies and token responses.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Raw inbound HTTP request as seen by the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingRequest {
	/// HTTP method, any case.
	pub method: String,
	/// Absolute request URL including the query string.
	pub url: Url,
	/// Header name/value pairs in arrival order.
	pub headers: Vec<(String, String)>,
	/// Raw body, if any.
	pub body: Option<String>,
}
impl IncomingRequest {
	/// Creates a request without headers or body.
	pub fn new(method: impl Into<String>, url: Url) -> Self {
		Self { method: method.into(), url, headers: Vec::new(), body: None }
	}

	/// Appends a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Sets a raw body without touching `Content-Type`.
	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Sets a form-encoded body and the matching `Content-Type`.
	pub fn with_form_body<'a>(self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
		let body = form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish();

		self.with_header("Content-Type", FORM_CONTENT_TYPE).with_body(body)
	}

	/// First header with the given name, compared case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Returns true when the body is declared as `application/x-www-form-urlencoded`.
	pub fn is_form_encoded(&self) -> bool {
		self.header("Content-Type").is_some_and(|value| {
			value
				.split(';')
				.next()
				.is_some_and(|media| media.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
		})
	}

	/// Decoded form body pairs; empty unless the body is form-encoded.
	pub fn form_pairs(&self) -> Vec<(String, String)> {
		match (&self.body, self.is_form_encoded()) {
			(Some(body), true) => form_urlencoded::parse(body.as_bytes()).into_owned().collect(),
			_ => Vec::new(),
		}
	}

	/// Returns true if the request arrived over HTTPS.
	pub fn is_secure(&self) -> bool {
		self.url.scheme() == "https"
	}
}

/// `application/x-www-form-urlencoded` response body returned by token endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct FormResponse {
	pairs: Vec<(String, String)>,
}
impl FormResponse {
	/// Creates an empty response.
	pub fn new() -> Self {
		Self { pairs: Vec::new() }
	}

	/// Appends a field.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.pairs.push((name.into(), value.into()));

		self
	}

	/// Looks up a field.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.pairs.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	/// Value for the `Content-Type` header.
	pub fn content_type(&self) -> &'static str {
		FORM_CONTENT_TYPE
	}

	/// Serialized body.
	pub fn body(&self) -> String {
		form_urlencoded::Serializer::new(String::new())
			.extend_pairs(self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
			.finish()
	}
}
impl Default for FormResponse {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for FormResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let names = self.pairs.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();

		f.debug_struct("FormResponse").field("fields", &names).finish()
	}
}

/// Where the resource owner goes after approving a request token.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthorizationRedirect {
	/// Redirect to the client callback carrying `oauth_token` and `oauth_verifier`.
	Redirect(Url),
	/// Out-of-band client; show the verifier to the owner instead.
	OutOfBand {
		/// Verifier the owner must relay to the client.
		verifier: String,
	},
}
impl AuthorizationRedirect {
	/// Redirect target, if any.
	pub fn location(&self) -> Option<&Url> {
		match self {
			Self::Redirect(url) => Some(url),
			Self::OutOfBand { .. } => None,
		}
	}

	/// Verifier carried by the redirect or shown out of band.
	pub fn verifier(&self) -> Option<String> {
		match self {
			Self::Redirect(url) => url
				.query_pairs()
				.find(|(name, _)| name == "oauth_verifier")
				.map(|(_, value)| value.into_owned()),
			Self::OutOfBand { verifier } => Some(verifier.clone()),
		}
	}
}
impl Debug for AuthorizationRedirect {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Redirect(url) => f.debug_tuple("Redirect").field(&url.path()).finish(),
			Self::OutOfBand { .. } => f.write_str("OutOfBand(<redacted>)"),
		}
	}
}
