//! Credential generation and the request-token → access-token lifecycle.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{
		AccessToken, Callback, Client, ClientKey, ClientRegistration, OwnerId, RealmSet,
		RequestToken, TokenKey, TokenSecret,
	},
	error::{AuthorizationError, ConfigError},
	obs,
	provider::ProviderConfig,
	store::{AuthorizeOutcome, ConsumeOutcome, ProviderStore},
};

/// Generates an alphanumeric credential from the thread-local CSPRNG.
pub fn generate_token(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

/// Token/secret pair handed back to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedCredentials {
	/// Public token value.
	pub token: TokenKey,
	/// Token secret.
	pub secret: TokenSecret,
}
impl Debug for IssuedCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IssuedCredentials")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.finish()
	}
}

/// Result of the owner's approval.
#[derive(Clone, Debug)]
pub struct Authorization {
	/// Approved request token.
	pub token: TokenKey,
	/// Freshly generated verifier.
	pub verifier: TokenSecret,
	/// Callback recorded at issue time.
	pub callback: Option<Callback>,
}

/// Issues credentials and drives token state transitions against a store.
#[derive(Clone)]
pub struct TokenIssuer {
	store: Arc<dyn ProviderStore>,
	config: Arc<ProviderConfig>,
}
impl TokenIssuer {
	/// Creates an issuer over `store` using the lengths in `config`.
	pub fn new(store: Arc<dyn ProviderStore>, config: Arc<ProviderConfig>) -> Self {
		Self { store, config }
	}

	/// Persists a new unauthorized request token.
	///
	/// `callback` is the already-validated callback; when absent the client's single registered
	/// callback is recorded. `realm` falls back to the configured default realm.
	pub async fn issue_request_token(
		&self,
		client_key: &ClientKey,
		callback: Option<Callback>,
		realm: Option<RealmSet>,
	) -> Result<IssuedCredentials> {
		let callback = match callback {
			Some(callback) => Some(callback),
			None => <dyn ProviderStore>::fetch_client(self.store.as_ref(), client_key)
				.await?
				.and_then(|client| client.default_callback().cloned())
				.map(Callback::Redirect),
		};
		let realm = realm.or_else(|| self.config.default_realm.clone());
		let credentials = self.generate_credentials()?;
		let record = RequestToken::new(
			credentials.token.clone(),
			credentials.secret.clone(),
			client_key.clone(),
			callback,
			realm,
		);

		<dyn ProviderStore>::save_request_token(self.store.as_ref(), record).await?;

		Ok(credentials)
	}

	/// Attaches the owner's approval to `token` and returns the verifier.
	///
	/// Unknown, already authorized and consumed tokens all fail with [`AuthorizationError`].
	pub async fn authorize(&self, token: &TokenKey, owner: OwnerId) -> Result<Authorization> {
		let verifier = TokenSecret::generate(self.config.verifier_length);
		let outcome = <dyn ProviderStore>::authorize_request_token(
			self.store.as_ref(),
			token,
			verifier.clone(),
			owner,
			OffsetDateTime::now_utc(),
		)
		.await?;

		match outcome {
			AuthorizeOutcome::Authorized(record) =>
				Ok(Authorization { token: record.token, verifier, callback: record.callback }),
			AuthorizeOutcome::AlreadyAuthorized | AuthorizeOutcome::Missing =>
				Err(AuthorizationError.into()),
		}
	}

	/// Consumes an authorized request token and issues the access token derived from it.
	pub async fn exchange_for_access_token(
		&self,
		client_key: &ClientKey,
		token: &TokenKey,
		verifier: &str,
	) -> Result<IssuedCredentials> {
		let outcome = <dyn ProviderStore>::consume_request_token(
			self.store.as_ref(),
			client_key,
			token,
			verifier,
			OffsetDateTime::now_utc(),
		)
		.await?;
		let ConsumeOutcome::Consumed(request) = outcome else {
			return Err(AuthorizationError.into());
		};
		let credentials = self.generate_credentials()?;
		let access = AccessToken::from_request_token(
			&request,
			credentials.token.clone(),
			credentials.secret.clone(),
		)
		.ok_or(AuthorizationError)?;

		<dyn ProviderStore>::save_access_token(self.store.as_ref(), access).await?;

		Ok(credentials)
	}

	/// Creates and stores a client with a generated key and, unless disabled, a secret.
	pub async fn register_client(&self, registration: ClientRegistration) -> Result<Client> {
		let client_key = ClientKey::new(generate_token(self.config.client_key_length))
			.map_err(ConfigError::from)?;
		let secret = registration
			.issue_secret
			.then(|| TokenSecret::generate(self.config.secret_length));
		let client = Client {
			client_key,
			name: registration.name,
			description: registration.description,
			secret,
			public_key: registration.public_key,
			callbacks: registration.callbacks,
			owner: registration.owner,
			registered_at: OffsetDateTime::now_utc(),
		};

		if let Err(e) = client.validate() {
			obs::warn_missing_signing_material(&client.client_key);

			return Err(e.into());
		}

		<dyn ProviderStore>::save_client(self.store.as_ref(), client.clone()).await?;

		Ok(client)
	}

	fn generate_credentials(&self) -> Result<IssuedCredentials> {
		let token =
			TokenKey::new(generate_token(self.config.token_length)).map_err(ConfigError::from)?;
		let secret = TokenSecret::generate(self.config.secret_length);

		Ok(IssuedCredentials { token, secret })
	}
}
impl Debug for TokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer").finish_non_exhaustive()
	}
}
