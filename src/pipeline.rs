//! Request verification pipeline.
//!
//! A request moves through parameter collection, transport and syntax checks, then a
//! single authorization pass in which every sub-check (client, token, verifier, callback,
//! realm, signature) is evaluated before the verdict is taken. Only a request that passes
//! all of them reaches the replay guard, which records its nonce. Malformed input surfaces
//! as [`MalformedRequestError`]; every other failure collapses into [`AuthorizationError`],
//! with the failing stage reported through [`obs`] only.

pub mod options;

pub use options::VerifyOptions;

// self
use crate::{
	_prelude::*,
	auth::{Client, ClientKey, OwnerId, RealmSet, TokenRef, TokenSecret},
	encoding::is_unreserved,
	error::{AuthorizationError, MalformedRequestError},
	http::IncomingRequest,
	obs,
	params::{OAuthParams, collect_parameters},
	provider::{LengthBounds, ProviderConfig},
	replay::ReplayGuard,
	signature::{SignatureMethod, SignatureVerifier, SigningKeys},
	validator::ProviderCallbacks,
};

/// Outcome of a successful verification, handed to the protected operation.
#[derive(Clone, Debug)]
pub struct VerifiedRequest {
	/// Parsed protocol parameters.
	pub params: OAuthParams,
	/// Client that signed the request.
	pub client: Client,
	/// Token the nonce was recorded against.
	pub token_ref: TokenRef,
	/// Resource owner behind the access token, on protected resource calls.
	pub owner: Option<OwnerId>,
	/// Realm granted to the access token, on protected resource calls.
	pub token_realm: Option<RealmSet>,
}
impl VerifiedRequest {
	/// Key of the signing client.
	pub fn client_key(&self) -> &ClientKey {
		&self.client.client_key
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
	Client,
	Token,
	Verifier,
	Callback,
	Realm,
	Signature,
	Replay,
}
impl Stage {
	const fn as_str(self) -> &'static str {
		match self {
			Self::Client => "client",
			Self::Token => "token",
			Self::Verifier => "verifier",
			Self::Callback => "callback",
			Self::Realm => "realm",
			Self::Signature => "signature",
			Self::Replay => "replay",
		}
	}
}

// Remembers the first failing check without stopping later ones.
#[derive(Debug, Default)]
struct Verdict {
	failure: Option<(Stage, &'static str)>,
}
impl Verdict {
	fn check(&mut self, passed: bool, stage: Stage, reason: &'static str) {
		if !passed && self.failure.is_none() {
			self.failure = Some((stage, reason));
		}
	}

	fn is_clean(&self) -> bool {
		self.failure.is_none()
	}
}

#[derive(Default)]
struct PresentedToken {
	token_ref: TokenRef,
	secret: Option<TokenSecret>,
	owner: Option<OwnerId>,
	realm: Option<RealmSet>,
	valid: bool,
}

/// Verifies signed requests against the provider's callbacks, keys and nonce store.
#[derive(Clone)]
pub struct RequestVerifier {
	callbacks: Arc<dyn ProviderCallbacks>,
	signature: SignatureVerifier,
	replay: ReplayGuard,
	config: Arc<ProviderConfig>,
	dummy_secret: TokenSecret,
}
impl RequestVerifier {
	/// Creates a verifier; `replay` must share the store `callbacks` reads from.
	pub fn new(
		callbacks: Arc<dyn ProviderCallbacks>,
		signature: SignatureVerifier,
		replay: ReplayGuard,
		config: Arc<ProviderConfig>,
	) -> Self {
		let dummy_secret = TokenSecret::generate(config.secret_length);

		Self { callbacks, signature, replay, config, dummy_secret }
	}

	/// Runs the full pipeline for `request`.
	pub async fn verify(
		&self,
		request: &IncomingRequest,
		options: &VerifyOptions,
	) -> Result<VerifiedRequest> {
		let params = collect_parameters(request)?;

		if self.config.enforce_ssl && !request.is_secure() {
			return Err(MalformedRequestError::InsecureTransport.into());
		}

		self.check_syntax(&params)?;

		if options.require_resource_owner && params.token.is_none() {
			return Err(MalformedRequestError::MissingParameter { name: "oauth_token" }.into());
		}
		if options.require_verifier && params.verifier.is_none() {
			return Err(MalformedRequestError::MissingParameter { name: "oauth_verifier" }.into());
		}

		let callbacks = self.callbacks.as_ref();
		let client_key = &params.client_key;
		let mut verdict = Verdict::default();
		let client = callbacks.client(client_key).await?;

		verdict.check(
			callbacks.validate_client_key(client_key).await? && client.is_some(),
			Stage::Client,
			"unknown client",
		);

		let presented = self.lookup_token(&params, options).await?;

		verdict.check(presented.valid, Stage::Token, "unknown, consumed or revoked token");

		if options.require_verifier {
			let matches = match (&params.token, params.verifier.as_deref()) {
				(Some(token), Some(verifier)) =>
					callbacks.validate_verifier(client_key, token, verifier).await?,
				_ => false,
			};

			verdict.check(matches, Stage::Verifier, "verifier mismatch");
		}
		if options.validate_callback {
			let allowed =
				callbacks.validate_redirect_uri(client_key, params.callback.as_deref()).await?;

			verdict.check(allowed, Stage::Callback, "callback not registered");
		}
		if !options.require_resource_owner {
			let allowed =
				callbacks.validate_requested_realm(client_key, params.realm.as_ref()).await?;

			verdict.check(allowed, Stage::Realm, "requested realm not allowed");
		}
		if options.require_realm {
			let required = options.required_realm.as_ref();
			let granted = match &params.token {
				Some(token) =>
					callbacks.validate_realm_for_token(client_key, token, required).await?,
				None => required.is_none_or(RealmSet::is_empty),
			};

			verdict.check(granted, Stage::Realm, "realm not granted");
		}

		let method_usable = SignatureMethod::from_str(&params.signature_method)
			.is_ok_and(|method| client.as_ref().is_none_or(|client| client.supports(method)));
		let keys = self.signing_keys(client.as_ref(), &params, presented.secret);
		let signed = self.signature.verify(request, &params, &keys);

		verdict.check(method_usable && signed, Stage::Signature, "signature mismatch");

		if verdict.is_clean() {
			let fresh = self
				.replay
				.check_and_record(
					client_key,
					params.timestamp,
					&params.nonce,
					presented.token_ref.clone(),
				)
				.await?;

			verdict.check(fresh, Stage::Replay, "nonce reused or timestamp outside window");
		}

		let (Some(client), None) = (client, verdict.failure) else {
			let (stage, reason) = verdict.failure.unwrap_or((Stage::Client, "unknown client"));

			obs::log_rejection(stage.as_str(), reason);
			obs::record_rejection(stage.as_str());

			return Err(AuthorizationError.into());
		};

		Ok(VerifiedRequest {
			params,
			client,
			token_ref: presented.token_ref,
			owner: presented.owner,
			token_realm: presented.realm,
		})
	}

	/// Verifies `request`, then runs `handler` with the verified parameters.
	pub async fn protect<F, Fut, T>(
		&self,
		request: &IncomingRequest,
		options: &VerifyOptions,
		handler: F,
	) -> Result<T>
	where
		F: FnOnce(VerifiedRequest) -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let verified = self.verify(request, options).await?;

		handler(verified).await
	}

	fn check_syntax(&self, params: &OAuthParams) -> Result<(), MalformedRequestError> {
		let credentials = self.config.credential_length;

		check_value("oauth_consumer_key", &params.client_key, credentials)?;

		if let Some(token) = &params.token {
			check_value("oauth_token", token, credentials)?;
		}
		if let Some(verifier) = &params.verifier {
			check_value("oauth_verifier", verifier, credentials)?;
		}

		check_value("oauth_nonce", &params.nonce, self.config.nonce_length)
	}

	async fn lookup_token(
		&self,
		params: &OAuthParams,
		options: &VerifyOptions,
	) -> Result<PresentedToken> {
		let callbacks = self.callbacks.as_ref();
		let client_key = &params.client_key;
		let Some(token) = &params.token else {
			return Ok(PresentedToken { valid: true, ..Default::default() });
		};

		if options.require_verifier {
			let record = callbacks.request_token(client_key, token).await?;
			let valid = callbacks.validate_request_token(client_key, token).await?;

			return Ok(PresentedToken {
				token_ref: TokenRef::Request(token.clone()),
				secret: record.map(|record| record.secret),
				owner: None,
				realm: None,
				valid,
			});
		}

		let record = callbacks.access_token(client_key, token).await?;
		let valid = callbacks.validate_access_token(client_key, token).await?;
		let (secret, owner, realm) = match record {
			Some(record) => (Some(record.secret), Some(record.owner), record.realm),
			None => (None, None, None),
		};

		Ok(PresentedToken {
			token_ref: TokenRef::Access(token.clone()),
			secret,
			owner,
			realm,
			valid,
		})
	}

	// Unknown clients and tokens still go through a full signature computation.
	fn signing_keys(
		&self,
		client: Option<&Client>,
		params: &OAuthParams,
		token_secret: Option<TokenSecret>,
	) -> SigningKeys {
		let keys = match client {
			Some(client) =>
				SigningKeys::for_client(client.secret.clone(), client.public_key.clone()),
			None => SigningKeys::for_client(Some(self.dummy_secret.clone()), None),
		};
		let token_secret = match token_secret {
			Some(secret) => Some(secret),
			None if params.token.is_some() => Some(self.dummy_secret.clone()),
			None => None,
		};

		keys.with_token_secret(token_secret)
	}
}
impl Debug for RequestVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestVerifier")
			.field("signature", &self.signature)
			.field("replay", &self.replay)
			.finish_non_exhaustive()
	}
}

fn check_value(
	name: &'static str,
	value: &str,
	bounds: LengthBounds,
) -> Result<(), MalformedRequestError> {
	if !bounds.contains(value.len()) {
		return Err(MalformedRequestError::InvalidParameter {
			name,
			reason: "length out of bounds",
		});
	}
	if !is_unreserved(value) {
		return Err(MalformedRequestError::InvalidParameter {
			name,
			reason: "contains reserved characters",
		});
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::*,
		auth::TokenKey,
		signature::RequestSigner,
		store::{MemoryStore, ProviderStore},
		validator::StoreCallbacks,
	};

	fn verifier_over(backend: Arc<MemoryStore>, config: ProviderConfig) -> RequestVerifier {
		let store: Arc<dyn ProviderStore> = backend;
		let config = Arc::new(config);

		RequestVerifier::new(
			Arc::new(StoreCallbacks::new(store.clone(), config.clone())),
			SignatureVerifier::new(config.signature_methods.clone()),
			ReplayGuard::new(store, config.timestamp_window()),
			config,
		)
	}

	#[tokio::test]
	async fn accepts_a_signed_request_exactly_once() {
		let (provider, backend) = build_test_provider();
		let client = register_test_client(&provider).await;
		let verifier = verifier_over(backend, ProviderConfig::default());
		let signer = signer_for(&client, SignatureMethod::HmacSha1)
			.with_callback(TEST_CALLBACK)
			.with_nonce("fixed-nonce-value");
		let request = signed_request(&signer, "POST", test_url("/request_token"));
		let verified = verifier
			.verify(&request, &VerifyOptions::request_token())
			.await
			.expect("First delivery should verify.");

		assert_eq!(verified.client_key(), &client.client_key);
		assert_eq!(verified.token_ref, TokenRef::None);

		let replay = verifier
			.verify(&request, &VerifyOptions::request_token())
			.await
			.expect_err("Replayed request must be rejected.");

		assert!(replay.is_unauthorized());
	}

	#[tokio::test]
	async fn malformed_input_is_distinguished() {
		let (provider, backend) = build_test_provider();
		let client = register_test_client(&provider).await;
		let verifier = verifier_over(backend, ProviderConfig::default());
		let signer = signer_for(&client, SignatureMethod::HmacSha1).with_nonce("short");
		let request = signed_request(&signer, "POST", test_url("/request_token"));
		let err = verifier
			.verify(&request, &VerifyOptions::request_token())
			.await
			.expect_err("Short nonce must be rejected.");

		assert!(err.is_malformed());

		let signer = signer_for(&client, SignatureMethod::HmacSha1);
		let request = signed_request(
			&signer,
			"POST",
			Url::parse("http://provider.example.com/request_token").expect("URL should parse."),
		);
		let err = verifier
			.verify(&request, &VerifyOptions::request_token())
			.await
			.expect_err("Plain HTTP must be rejected.");

		assert!(matches!(err, Error::Malformed(MalformedRequestError::InsecureTransport)));

		let request = signed_request(&signer, "POST", test_url("/access_token"));
		let err = verifier
			.verify(&request, &VerifyOptions::access_token())
			.await
			.expect_err("Exchange without a token must be rejected.");

		assert!(matches!(
			err,
			Error::Malformed(MalformedRequestError::MissingParameter { name: "oauth_token" })
		));
	}

	#[tokio::test]
	async fn unknown_client_and_token_are_unauthorized() {
		let (provider, backend) = build_test_provider();
		let client = register_test_client(&provider).await;
		let verifier = verifier_over(backend, ProviderConfig::default());
		let stranger = client_key("unregistered-client-key-0001");
		let signer = RequestSigner::new(stranger, SignatureMethod::HmacSha1)
			.with_client_secret(TokenSecret::new("guess"))
			.with_callback(TEST_CALLBACK);
		let request = signed_request(&signer, "POST", test_url("/request_token"));

		assert!(
			verifier
				.verify(&request, &VerifyOptions::request_token())
				.await
				.expect_err("Unknown client must be rejected.")
				.is_unauthorized()
		);

		let signer = signer_for(&client, SignatureMethod::HmacSha1).with_token(
			TokenKey::new("not-an-issued-token-000001").expect("Token fixture should be valid."),
			TokenSecret::new("guess"),
		);
		let request = signed_request(&signer, "GET", test_url("/photos"));

		assert!(
			verifier
				.verify(&request, &VerifyOptions::protected_resource())
				.await
				.expect_err("Unknown access token must be rejected.")
				.is_unauthorized()
		);
	}

	#[tokio::test]
	async fn unregistered_callback_is_unauthorized() {
		let (provider, backend) = build_test_provider();
		let client = register_test_client(&provider).await;
		let verifier = verifier_over(backend, ProviderConfig::default());
		let signer = signer_for(&client, SignatureMethod::HmacSha1)
			.with_callback("https://attacker.example.com/cb");
		let request = signed_request(&signer, "POST", test_url("/request_token"));
		let err = verifier
			.verify(&request, &VerifyOptions::request_token())
			.await
			.expect_err("Foreign callback must be rejected.");

		assert_eq!(err.status_code(), 401);
		assert_eq!(err.public_message(), "Unauthorized");
	}

	#[tokio::test]
	async fn protect_hands_the_verified_request_to_the_handler() {
		let (provider, backend) = build_test_provider();
		let client = register_test_client(&provider).await;
		let verifier = verifier_over(backend, ProviderConfig::default());
		let signer = signer_for(&client, SignatureMethod::HmacSha1);
		let request = signed_request(&signer, "GET", test_url("/status"));
		let name = verifier
			.protect(&request, &VerifyOptions::client_only(), |verified| async move {
				Ok(verified.client.name)
			})
			.await
			.expect("Two-legged call should verify.");

		assert_eq!(name, "Fixture client");
	}
}
