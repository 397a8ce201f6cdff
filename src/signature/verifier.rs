//! Fail-closed signature verification.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use subtle::ConstantTimeEq;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	encoding::percent_encode,
	http::IncomingRequest,
	params::OAuthParams,
	signature::{
		RustCryptoPrimitive, SignatureMethod, SignaturePrimitive, signature_base_string,
	},
};

/// Key material looked up for a request.
#[derive(Clone, Default)]
pub struct SigningKeys {
	/// Client shared secret.
	pub client_secret: Option<TokenSecret>,
	/// Request or access token secret.
	pub token_secret: Option<TokenSecret>,
	/// Client RSA public key (PEM).
	pub public_key: Option<String>,
}
impl SigningKeys {
	/// Keys for a client without a token.
	pub fn for_client(client_secret: Option<TokenSecret>, public_key: Option<String>) -> Self {
		Self { client_secret, token_secret: None, public_key }
	}

	/// Attaches the secret of the presented token.
	pub fn with_token_secret(mut self, token_secret: Option<TokenSecret>) -> Self {
		self.token_secret = token_secret;

		self
	}
}
impl Debug for SigningKeys {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SigningKeys")
			.field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
			.field("token_secret", &self.token_secret.as_ref().map(|_| "<redacted>"))
			.field("public_key_set", &self.public_key.is_some())
			.finish()
	}
}

/// Builds the shared-secret signing key `enc(client_secret)&enc(token_secret)`.
pub fn signing_key(client_secret: &str, token_secret: Option<&str>) -> String {
	format!(
		"{}&{}",
		percent_encode(client_secret),
		percent_encode(token_secret.unwrap_or_default())
	)
}

/// Compares two byte strings without short-circuiting on the first difference.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	a.ct_eq(b).into()
}

/// Recomputes request signatures and compares them in constant time.
#[derive(Clone)]
pub struct SignatureVerifier {
	primitive: Arc<dyn SignaturePrimitive>,
	methods: Vec<SignatureMethod>,
}
impl SignatureVerifier {
	/// Creates a verifier over the RustCrypto primitive accepting `methods`.
	pub fn new(methods: impl IntoIterator<Item = SignatureMethod>) -> Self {
		Self::with_primitive(Arc::new(RustCryptoPrimitive), methods)
	}

	/// Creates a verifier over a custom primitive.
	pub fn with_primitive(
		primitive: Arc<dyn SignaturePrimitive>,
		methods: impl IntoIterator<Item = SignatureMethod>,
	) -> Self {
		Self { primitive, methods: methods.into_iter().collect() }
	}

	/// Signature methods this verifier accepts.
	pub fn methods(&self) -> &[SignatureMethod] {
		&self.methods
	}

	/// Returns true only if the request carries a valid signature for `keys`.
	///
	/// Unsupported methods, absent key material, undecodable signatures and mismatches all
	/// yield `false`.
	pub fn verify(
		&self,
		request: &IncomingRequest,
		params: &OAuthParams,
		keys: &SigningKeys,
	) -> bool {
		let Ok(method) = SignatureMethod::from_str(&params.signature_method) else {
			return false;
		};

		if !self.methods.contains(&method) {
			return false;
		}

		let base_string = signature_base_string(&request.method, &request.url, &params.signed);

		match method {
			SignatureMethod::RsaSha1 => {
				let Some(public_key) = keys.public_key.as_deref() else {
					return false;
				};
				let Ok(signature) = STANDARD.decode(params.signature.as_bytes()) else {
					return false;
				};

				self.primitive.verify_public_key(method, &base_string, public_key, &signature)
			},
			SignatureMethod::HmacSha1
			| SignatureMethod::HmacSha256
			| SignatureMethod::Plaintext => {
				let Some(client_secret) = keys.client_secret.as_ref() else {
					return false;
				};
				let key = signing_key(
					client_secret.expose(),
					keys.token_secret.as_ref().map(TokenSecret::expose),
				);
				let Ok(raw) = self.primitive.compute_signature(method, &base_string, key.as_bytes())
				else {
					return false;
				};
				let expected =
					if method == SignatureMethod::Plaintext { key } else { STANDARD.encode(raw) };

				constant_time_eq(expected.as_bytes(), params.signature.as_bytes())
			},
		}
	}
}
impl Debug for SignatureVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignatureVerifier").field("methods", &self.methods).finish()
	}
}
