//! Client-side request signing, used to call an OAuth 1.0a provider.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::{ClientKey, TokenKey, TokenSecret},
	encoding::percent_encode,
	issuer::generate_token,
	signature::{
		RustCryptoPrimitive, SignatureError, SignatureMethod, SignaturePrimitive,
		signature_base_string, signing_key,
	},
};

const NONCE_LENGTH: usize = 32;

/// Produces `oauth_*` parameters and signatures for outgoing requests.
#[derive(Clone)]
pub struct RequestSigner {
	client_key: ClientKey,
	method: SignatureMethod,
	client_secret: Option<TokenSecret>,
	token: Option<(TokenKey, TokenSecret)>,
	private_key: Option<String>,
	realm: Option<String>,
	callback: Option<String>,
	verifier: Option<String>,
	nonce: Option<String>,
	timestamp: Option<u64>,
}
impl RequestSigner {
	/// Starts a signer for the given client and method.
	pub fn new(client_key: ClientKey, method: SignatureMethod) -> Self {
		Self {
			client_key,
			method,
			client_secret: None,
			token: None,
			private_key: None,
			realm: None,
			callback: None,
			verifier: None,
			nonce: None,
			timestamp: None,
		}
	}

	/// Sets the client shared secret (HMAC and PLAINTEXT).
	pub fn with_client_secret(mut self, secret: TokenSecret) -> Self {
		self.client_secret = Some(secret);

		self
	}

	/// Sets the request or access token and its secret.
	pub fn with_token(mut self, token: TokenKey, secret: TokenSecret) -> Self {
		self.token = Some((token, secret));

		self
	}

	/// Sets the PEM private key (RSA-SHA1).
	pub fn with_private_key(mut self, pem: impl Into<String>) -> Self {
		self.private_key = Some(pem.into());

		self
	}

	/// Sends `realm` in the `Authorization` header.
	pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
		self.realm = Some(realm.into());

		self
	}

	/// Sends `oauth_callback` (request-token step).
	pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
		self.callback = Some(callback.into());

		self
	}

	/// Sends `oauth_verifier` (access-token step).
	pub fn with_verifier(mut self, verifier: impl Into<String>) -> Self {
		self.verifier = Some(verifier.into());

		self
	}

	/// Pins the nonce instead of generating one per call.
	pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
		self.nonce = Some(nonce.into());

		self
	}

	/// Pins the timestamp instead of reading the clock.
	pub fn with_timestamp(mut self, timestamp: u64) -> Self {
		self.timestamp = Some(timestamp);

		self
	}

	/// Signs a request.
	///
	/// `form` holds the `application/x-www-form-urlencoded` body pairs, if any; query pairs are
	/// read from `url`.
	pub fn sign(
		&self,
		method: &str,
		url: &Url,
		form: &[(String, String)],
	) -> Result<SignedParameters, SignatureError> {
		let timestamp = self.timestamp.unwrap_or_else(|| {
			u64::try_from(OffsetDateTime::now_utc().unix_timestamp()).unwrap_or_default()
		});
		let nonce = self.nonce.clone().unwrap_or_else(|| generate_token(NONCE_LENGTH));
		let mut oauth = vec![
			("oauth_consumer_key".to_owned(), self.client_key.to_string()),
			("oauth_nonce".to_owned(), nonce),
			("oauth_signature_method".to_owned(), self.method.as_str().to_owned()),
			("oauth_timestamp".to_owned(), timestamp.to_string()),
			("oauth_version".to_owned(), "1.0".to_owned()),
		];

		if let Some((token, _)) = &self.token {
			oauth.push(("oauth_token".into(), token.to_string()));
		}
		if let Some(callback) = &self.callback {
			oauth.push(("oauth_callback".into(), callback.clone()));
		}
		if let Some(verifier) = &self.verifier {
			oauth.push(("oauth_verifier".into(), verifier.clone()));
		}

		let mut signed = url.query_pairs().into_owned().collect::<Vec<_>>();

		signed.extend(form.iter().cloned());
		signed.extend(oauth.iter().cloned());

		let base_string = signature_base_string(method, url, &signed);
		let signature = self.signature(&base_string)?;

		oauth.push(("oauth_signature".into(), signature));

		Ok(SignedParameters { realm: self.realm.clone(), oauth })
	}

	fn signature(&self, base_string: &str) -> Result<String, SignatureError> {
		let primitive = RustCryptoPrimitive;

		match self.method {
			SignatureMethod::RsaSha1 => {
				let pem = self.private_key.as_deref().ok_or_else(|| SignatureError::InvalidKey {
					message: "RSA-SHA1 requires a private key".into(),
				})?;

				Ok(STANDARD.encode(primitive.sign_rsa_sha1(pem, base_string)?))
			},
			method => {
				let secret = self.client_secret.as_ref().ok_or_else(|| SignatureError::InvalidKey {
					message: "shared-secret methods require a client secret".into(),
				})?;
				let key = signing_key(
					secret.expose(),
					self.token.as_ref().map(|(_, secret)| secret.expose()),
				);

				if method == SignatureMethod::Plaintext {
					return Ok(key);
				}

				let raw = primitive.compute_signature(method, base_string, key.as_bytes())?;

				Ok(STANDARD.encode(raw))
			},
		}
	}
}
impl Debug for RequestSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestSigner")
			.field("client_key", &self.client_key)
			.field("method", &self.method)
			.field("token", &self.token.as_ref().map(|(token, _)| token))
			.field("realm", &self.realm)
			.finish_non_exhaustive()
	}
}

/// Protocol parameters produced by [`RequestSigner::sign`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedParameters {
	/// Realm sent alongside the parameters.
	pub realm: Option<String>,
	/// `oauth_*` pairs, signature last.
	pub oauth: Vec<(String, String)>,
}
impl SignedParameters {
	/// Value of `oauth_signature`.
	pub fn signature(&self) -> &str {
		self.get("oauth_signature").unwrap_or_default()
	}

	/// Looks up a protocol parameter.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.oauth.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	/// Renders the `Authorization` header value (RFC 5849 §3.5.1).
	pub fn authorization_header(&self) -> String {
		let realm = self.realm.iter().map(|realm| format!("realm=\"{}\"", percent_encode(realm)));
		let params = self
			.oauth
			.iter()
			.map(|(name, value)| format!("{}=\"{}\"", percent_encode(name), percent_encode(value)));

		format!("OAuth {}", realm.chain(params).collect::<Vec<_>>().join(", "))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn appendix_a_signer() -> RequestSigner {
		RequestSigner::new(
			ClientKey::new("dpf43f3p2l4k3l03").expect("Client fixture should be valid."),
			SignatureMethod::HmacSha1,
		)
		.with_client_secret(TokenSecret::new("kd94hf93k423kf44"))
		.with_token(
			TokenKey::new("nnch734d00sl2jdk").expect("Token fixture should be valid."),
			TokenSecret::new("pfkkdhi9sl3r4s00"),
		)
		.with_nonce("kllo9940pd9333jh")
		.with_timestamp(1_191_242_096)
	}

	#[test]
	fn hmac_sha1_known_answer() {
		let url = Url::parse("http://photos.example.net/photos?file=vacation.jpg&size=original")
			.expect("URL fixture should parse.");
		let signed = appendix_a_signer().sign("GET", &url, &[]).expect("Signing should succeed.");

		assert_eq!(signed.signature(), "tR3+Ty81lMeYAr/Fid0kMTYa/WM=");
	}

	#[test]
	fn plaintext_signature_is_the_key() {
		let signer = RequestSigner::new(
			ClientKey::new("client").expect("Client fixture should be valid."),
			SignatureMethod::Plaintext,
		)
		.with_client_secret(TokenSecret::new("kd94hf93k423kf44"));
		let url = Url::parse("https://example.com/").expect("URL fixture should parse.");
		let signed = signer.sign("POST", &url, &[]).expect("Signing should succeed.");

		assert_eq!(signed.signature(), "kd94hf93k423kf44&");
	}

	#[test]
	fn header_encodes_values_and_leads_with_realm() {
		let url = Url::parse("https://example.com/").expect("URL fixture should parse.");
		let signed = appendix_a_signer()
			.with_realm("Photos")
			.with_callback("https://client.example.com/cb?x=1")
			.sign("POST", &url, &[])
			.expect("Signing should succeed.");
		let header = signed.authorization_header();

		assert!(
			header.starts_with("OAuth realm=\"Photos\", oauth_consumer_key=\"dpf43f3p2l4k3l03\"")
		);
		assert!(
			header.contains("oauth_callback=\"https%3A%2F%2Fclient.example.com%2Fcb%3Fx%3D1\"")
		);
	}

	#[test]
	fn missing_key_material_is_an_error() {
		let url = Url::parse("https://example.com/").expect("URL fixture should parse.");
		let signer = RequestSigner::new(
			ClientKey::new("client").expect("Client fixture should be valid."),
			SignatureMethod::RsaSha1,
		);

		assert!(matches!(signer.sign("GET", &url, &[]), Err(SignatureError::InvalidKey { .. })));
	}
}
