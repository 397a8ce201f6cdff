//! Client, token and realm policy consumed by the verification pipeline.
//!
//! [`ProviderCallbacks`] is the capability set a provider plugs in. Only the three record
//! lookups are required; every `validate_*` decision has a default built on them, and
//! [`StoreCallbacks`] supplies store-backed lookups plus the configured realm and `oob`
//! policies.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Callback, Client, ClientKey, OUT_OF_BAND, RealmSet, RequestToken, TokenKey},
	provider::ProviderConfig,
	store::ProviderStore,
};

/// Boxed future returned by [`ProviderCallbacks`] operations.
pub type CallbackFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Decision hooks for client identity, callbacks, realms, verifiers and tokens.
pub trait ProviderCallbacks
where
	Self: Send + Sync,
{
	/// Looks up a client with its signing material.
	fn client<'a>(&'a self, client_key: &'a ClientKey) -> CallbackFuture<'a, Option<Client>>;

	/// Looks up a request token issued to `client_key`.
	fn request_token<'a>(
		&'a self,
		client_key: &'a ClientKey,
		token: &'a TokenKey,
	) -> CallbackFuture<'a, Option<RequestToken>>;

	/// Looks up an access token issued to `client_key`.
	fn access_token<'a>(
		&'a self,
		client_key: &'a ClientKey,
		token: &'a TokenKey,
	) -> CallbackFuture<'a, Option<AccessToken>>;

	/// True if the client exists.
	fn validate_client_key<'a>(&'a self, client_key: &'a ClientKey) -> CallbackFuture<'a, bool> {
		Box::pin(async move { Ok(self.client(client_key).await?.is_some()) })
	}

	/// True if `callback` is registered for the client, or absent while exactly one is
	/// registered. `oob` is accepted by default.
	fn validate_redirect_uri<'a>(
		&'a self,
		client_key: &'a ClientKey,
		callback: Option<&'a str>,
	) -> CallbackFuture<'a, bool> {
		Box::pin(async move {
			let Some(client) = self.client(client_key).await? else {
				return Ok(false);
			};

			Ok(redirect_allowed(&client, callback, true))
		})
	}

	/// Provider-level gate on requested realms; permissive by default.
	fn validate_requested_realm<'a>(
		&'a self,
		_client_key: &'a ClientKey,
		_realm: Option<&'a RealmSet>,
	) -> CallbackFuture<'a, bool> {
		Box::pin(async { Ok(true) })
	}

	/// True if no realm is required or the access token's realm intersects `required`.
	fn validate_realm_for_token<'a>(
		&'a self,
		client_key: &'a ClientKey,
		token: &'a TokenKey,
		required: Option<&'a RealmSet>,
	) -> CallbackFuture<'a, bool> {
		Box::pin(async move {
			if required.is_none_or(RealmSet::is_empty) {
				return Ok(true);
			}

			Ok(self
				.access_token(client_key, token)
				.await?
				.is_some_and(|access| access.grants_realm(required)))
		})
	}

	/// True if the request token is authorized with exactly this verifier.
	fn validate_verifier<'a>(
		&'a self,
		client_key: &'a ClientKey,
		token: &'a TokenKey,
		verifier: &'a str,
	) -> CallbackFuture<'a, bool> {
		Box::pin(async move {
			Ok(self
				.request_token(client_key, token)
				.await?
				.is_some_and(|request| {
					!request.is_consumed() && request.verifier_matches(verifier)
				}))
		})
	}

	/// True if the request token exists for the client and has not been exchanged.
	fn validate_request_token<'a>(
		&'a self,
		client_key: &'a ClientKey,
		token: &'a TokenKey,
	) -> CallbackFuture<'a, bool> {
		Box::pin(async move {
			Ok(self.request_token(client_key, token).await?.is_some_and(|r| !r.is_consumed()))
		})
	}

	/// True if the access token exists for the client and is not revoked.
	fn validate_access_token<'a>(
		&'a self,
		client_key: &'a ClientKey,
		token: &'a TokenKey,
	) -> CallbackFuture<'a, bool> {
		Box::pin(async move {
			Ok(self.access_token(client_key, token).await?.is_some_and(|a| !a.is_revoked()))
		})
	}
}

/// Redirect policy shared by the default hooks.
pub fn redirect_allowed(client: &Client, callback: Option<&str>, allow_out_of_band: bool) -> bool {
	match callback {
		None => client.default_callback().is_some(),
		Some(OUT_OF_BAND) => allow_out_of_band,
		Some(raw) => match Callback::parse(raw) {
			Ok(Callback::Redirect(url)) => client.is_registered_callback(&url),
			_ => false,
		},
	}
}

/// Store-backed [`ProviderCallbacks`] honoring the configured realm whitelist and `oob` switch.
#[derive(Clone)]
pub struct StoreCallbacks {
	store: Arc<dyn ProviderStore>,
	config: Arc<ProviderConfig>,
}
impl StoreCallbacks {
	/// Creates the default policy over `store`.
	pub fn new(store: Arc<dyn ProviderStore>, config: Arc<ProviderConfig>) -> Self {
		Self { store, config }
	}
}
impl ProviderCallbacks for StoreCallbacks {
	fn client<'a>(&'a self, client_key: &'a ClientKey) -> CallbackFuture<'a, Option<Client>> {
		Box::pin(async move {
			Ok(<dyn ProviderStore>::fetch_client(self.store.as_ref(), client_key).await?)
		})
	}

	fn request_token<'a>(
		&'a self,
		client_key: &'a ClientKey,
		token: &'a TokenKey,
	) -> CallbackFuture<'a, Option<RequestToken>> {
		Box::pin(async move {
			let record =
				<dyn ProviderStore>::fetch_request_token(self.store.as_ref(), token).await?;

			Ok(record.filter(|record| &record.client_key == client_key))
		})
	}

	fn access_token<'a>(
		&'a self,
		client_key: &'a ClientKey,
		token: &'a TokenKey,
	) -> CallbackFuture<'a, Option<AccessToken>> {
		Box::pin(async move {
			let record = <dyn ProviderStore>::fetch_access_token(self.store.as_ref(), token).await?;

			Ok(record.filter(|record| &record.client_key == client_key))
		})
	}

	fn validate_redirect_uri<'a>(
		&'a self,
		client_key: &'a ClientKey,
		callback: Option<&'a str>,
	) -> CallbackFuture<'a, bool> {
		Box::pin(async move {
			let Some(client) = self.client(client_key).await? else {
				return Ok(false);
			};

			Ok(redirect_allowed(&client, callback, self.config.allow_out_of_band))
		})
	}

	fn validate_requested_realm<'a>(
		&'a self,
		_client_key: &'a ClientKey,
		realm: Option<&'a RealmSet>,
	) -> CallbackFuture<'a, bool> {
		Box::pin(async move {
			Ok(match (&self.config.realms, realm) {
				(Some(allowed), Some(requested)) => requested.is_subset(allowed),
				_ => true,
			})
		})
	}
}
impl Debug for StoreCallbacks {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StoreCallbacks").finish_non_exhaustive()
	}
}
