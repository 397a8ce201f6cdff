//! Attaching OAuth 1.0a signatures to outbound HTTP requests.

// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")]
use crate::{
	http::FORM_CONTENT_TYPE,
	signature::{RequestSigner, SignatureError},
};

/// Signs an outbound request without tying the crate to one HTTP client.
///
/// Implementations sign the request's method, URL and form body and attach the resulting
/// `Authorization: OAuth` header.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the request and returns it with the `Authorization` header set.
	fn sign_request(&self, request: Request) -> Result<Request, Error>;
}

/// Failure to sign a `reqwest` request.
#[cfg(feature = "reqwest")]
#[derive(Debug, ThisError)]
pub enum SignRequestError {
	/// Signature computation failed.
	#[error(transparent)]
	Signature(#[from] SignatureError),
	/// The header value could not be represented.
	#[error("Signed Authorization header is not a valid header value.")]
	InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

#[cfg(feature = "reqwest")]
impl RequestSignerExt<reqwest::Request, SignRequestError> for RequestSigner {
	fn sign_request(
		&self,
		mut request: reqwest::Request,
	) -> Result<reqwest::Request, SignRequestError> {
		let is_form = request
			.headers()
			.get(reqwest::header::CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));
		let form = if is_form {
			request
				.body()
				.and_then(reqwest::Body::as_bytes)
				.map(|bytes| url::form_urlencoded::parse(bytes).into_owned().collect::<Vec<_>>())
				.unwrap_or_default()
		} else {
			Vec::new()
		};
		let header =
			self.sign(request.method().as_str(), request.url(), &form)?.authorization_header();

		let value = reqwest::header::HeaderValue::from_str(&header)?;

		request.headers_mut().insert(reqwest::header::AUTHORIZATION, value);

		Ok(request)
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::*,
		auth::TokenSecret,
		http::IncomingRequest,
		params::collect_parameters,
		signature::{SignatureMethod, SignatureVerifier, SigningKeys},
	};

	#[test]
	fn reqwest_requests_carry_verifiable_signatures() {
		let signer =
			RequestSigner::new(client_key("reqwest-client-key-00001"), SignatureMethod::HmacSha1)
				.with_client_secret(TokenSecret::new("client-secret"));
		let url = test_url("/photos?size=original");
		let mut request = reqwest::Request::new(reqwest::Method::POST, url.clone());

		request.headers_mut().insert(
			reqwest::header::CONTENT_TYPE,
			reqwest::header::HeaderValue::from_static(FORM_CONTENT_TYPE),
		);
		*request.body_mut() = Some(reqwest::Body::from("file=vacation.jpg"));

		let signed = signer.sign_request(request).expect("Signing should succeed.");
		let header = signed
			.headers()
			.get(reqwest::header::AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.expect("Authorization header should be set.");
		let incoming = IncomingRequest::new("POST", url)
			.with_header("Authorization", header)
			.with_form_body([("file", "vacation.jpg")]);
		let params = collect_parameters(&incoming).expect("Signed request should parse.");
		let keys = SigningKeys::for_client(Some(TokenSecret::new("client-secret")), None);

		assert!(
			SignatureVerifier::new(SignatureMethod::DEFAULTS).verify(&incoming, &params, &keys)
		);
	}
}
