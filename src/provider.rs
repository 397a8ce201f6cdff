//! The provider orchestrator and its configuration.
//!
//! [`Provider`] composes the verification pipeline, the token issuer and a
//! [`ProviderCallbacks`] policy over one [`ProviderStore`]. Transports route requests with
//! [`Provider::route`] and render the returned [`FormResponse`]s, redirects and errors.

pub mod config;
pub mod endpoint;

mod authorization;
mod token;

pub use authorization::*;
pub use config::*;
pub use endpoint::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Client, ClientRegistration, TokenKey},
	error::AuthorizationError,
	http::{FormResponse, IncomingRequest},
	issuer::TokenIssuer,
	obs::{self, EndpointKind, EndpointOutcome, EndpointSpan},
	pipeline::{RequestVerifier, VerifiedRequest, VerifyOptions},
	replay::ReplayGuard,
	signature::{RustCryptoPrimitive, SignaturePrimitive, SignatureVerifier},
	store::ProviderStore,
	validator::{ProviderCallbacks, StoreCallbacks},
};

/// OAuth 1.0a provider bound to one store and one policy.
///
/// Every operation is independent; all state lives behind the store, so a provider can be
/// cloned into as many workers as needed.
#[derive(Clone)]
pub struct Provider {
	store: Arc<dyn ProviderStore>,
	config: Arc<ProviderConfig>,
	callbacks: Arc<dyn ProviderCallbacks>,
	issuer: TokenIssuer,
	replay: ReplayGuard,
	verifier: RequestVerifier,
}
impl Provider {
	/// Creates a provider using the store-backed default policy.
	pub fn new(config: ProviderConfig, store: Arc<dyn ProviderStore>) -> Result<Self> {
		let config = Arc::new(config);
		let callbacks = Arc::new(StoreCallbacks::new(store.clone(), config.clone()));

		Self::assemble(config, store, callbacks, Arc::new(RustCryptoPrimitive))
	}

	/// Creates a provider whose client, token and realm decisions come from `callbacks`.
	///
	/// Token state transitions and nonce records still go through `store`.
	pub fn with_callbacks(
		config: ProviderConfig,
		store: Arc<dyn ProviderStore>,
		callbacks: Arc<dyn ProviderCallbacks>,
	) -> Result<Self> {
		Self::assemble(Arc::new(config), store, callbacks, Arc::new(RustCryptoPrimitive))
	}

	/// Swaps the crypto primitive used for signature verification.
	pub fn with_signature_primitive(mut self, primitive: Arc<dyn SignaturePrimitive>) -> Self {
		self.verifier =
			Self::build_verifier(&self.config, &self.callbacks, &self.replay, primitive);

		self
	}

	fn assemble(
		config: Arc<ProviderConfig>,
		store: Arc<dyn ProviderStore>,
		callbacks: Arc<dyn ProviderCallbacks>,
		primitive: Arc<dyn SignaturePrimitive>,
	) -> Result<Self> {
		config.validate()?;

		let issuer = TokenIssuer::new(store.clone(), config.clone());
		let replay = ReplayGuard::new(store.clone(), config.timestamp_window());
		let verifier = Self::build_verifier(&config, &callbacks, &replay, primitive);

		Ok(Self { store, config, callbacks, issuer, replay, verifier })
	}

	fn build_verifier(
		config: &Arc<ProviderConfig>,
		callbacks: &Arc<dyn ProviderCallbacks>,
		replay: &ReplayGuard,
		primitive: Arc<dyn SignaturePrimitive>,
	) -> RequestVerifier {
		RequestVerifier::new(
			callbacks.clone(),
			SignatureVerifier::with_primitive(primitive, config.signature_methods.iter().copied()),
			replay.clone(),
			config.clone(),
		)
	}

	/// Active configuration.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Policy the pipeline consults.
	pub fn callbacks(&self) -> &Arc<dyn ProviderCallbacks> {
		&self.callbacks
	}

	/// Resolves a request line to one of the protocol endpoints.
	pub fn route(&self, method: &str, path: &str) -> Option<Endpoint> {
		self.config.endpoints.route(method, path)
	}

	/// Registers a client with a generated key and, unless disabled, a generated secret.
	pub async fn register(&self, registration: ClientRegistration) -> Result<Client> {
		const KIND: EndpointKind = EndpointKind::Register;

		let span = EndpointSpan::new(KIND, "register");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let result = span.instrument(self.issuer.register_client(registration)).await;

		obs::record_endpoint_outcome(KIND, EndpointOutcome::of(&result));

		result
	}

	/// Verifies a request to a protected resource or any other signed endpoint.
	pub async fn verify(
		&self,
		request: &IncomingRequest,
		options: &VerifyOptions,
	) -> Result<VerifiedRequest> {
		const KIND: EndpointKind = EndpointKind::ProtectedResource;

		let span = EndpointSpan::new(KIND, "verify");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let result = span.instrument(self.verifier.verify(request, options)).await;

		obs::record_endpoint_outcome(KIND, EndpointOutcome::of(&result));

		result
	}

	/// Guards `handler`: it only runs, with the verified parameters, once `request` passes.
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

	/// Revokes an access token; unknown tokens are reported as unauthorized.
	pub async fn revoke_access_token(&self, token: &TokenKey) -> Result<AccessToken> {
		<dyn ProviderStore>::revoke_access_token(
			self.store.as_ref(),
			token,
			OffsetDateTime::now_utc(),
		)
		.await?
		.ok_or_else(|| AuthorizationError.into())
	}

	/// Deletes nonce records older than the timestamp window; returns how many went away.
	pub async fn prune_nonces(&self) -> Result<usize> {
		Ok(self.replay.prune().await?)
	}
}
impl Debug for Provider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Provider")
			.field("config", &self.config)
			.field("verifier", &self.verifier)
			.finish_non_exhaustive()
	}
}

fn credentials_response(token: &TokenKey, secret: &str) -> FormResponse {
	FormResponse::new().with("oauth_token", token.to_string()).with("oauth_token_secret", secret)
}
