//! Persistence contract and built-in store implementations for provider records.
//!
//! Two operations carry atomicity requirements that the rest of the crate relies on:
//! [`ProviderStore::insert_nonce`] must reject a duplicate [`NonceKey`] with
//! [`StoreError::Conflict`], and [`ProviderStore::consume_request_token`] must check and mark a
//! request token in one step so concurrent exchanges cannot both succeed.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{
		AccessToken, Client, ClientKey, NonceKey, NonceRecord, OwnerId, RequestToken, TokenKey,
		TokenSecret,
	},
};

/// Boxed future returned by every [`ProviderStore`] operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by provider stores.
pub trait ProviderStore
where
	Self: Send + Sync,
{
	/// Persists or replaces a client record.
	fn save_client(&self, client: Client) -> StoreFuture<'_, ()>;

	/// Fetches a client by key.
	fn fetch_client<'a>(&'a self, client_key: &'a ClientKey) -> StoreFuture<'a, Option<Client>>;

	/// Persists a freshly issued request token.
	fn save_request_token(&self, token: RequestToken) -> StoreFuture<'_, ()>;

	/// Fetches a request token by its public value.
	fn fetch_request_token<'a>(
		&'a self,
		token: &'a TokenKey,
	) -> StoreFuture<'a, Option<RequestToken>>;

	/// Attaches the owner's approval to an unauthorized request token.
	fn authorize_request_token<'a>(
		&'a self,
		token: &'a TokenKey,
		verifier: TokenSecret,
		owner: OwnerId,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, AuthorizeOutcome>;

	/// Atomically checks the verifier and marks the request token consumed.
	fn consume_request_token<'a>(
		&'a self,
		client_key: &'a ClientKey,
		token: &'a TokenKey,
		verifier: &'a str,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, ConsumeOutcome>;

	/// Persists an access token.
	fn save_access_token(&self, token: AccessToken) -> StoreFuture<'_, ()>;

	/// Fetches an access token by its public value.
	fn fetch_access_token<'a>(&'a self, token: &'a TokenKey)
	-> StoreFuture<'a, Option<AccessToken>>;

	/// Marks an access token as revoked at the provided instant.
	fn revoke_access_token<'a>(
		&'a self,
		token: &'a TokenKey,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, Option<AccessToken>>;

	/// Records a nonce; fails with [`StoreError::Conflict`] when the key already exists.
	fn insert_nonce(&self, record: NonceRecord) -> StoreFuture<'_, ()>;

	/// Deletes nonce records whose `oauth_timestamp` is older than `cutoff` (unix seconds).
	fn prune_nonces(&self, cutoff: u64) -> StoreFuture<'_, usize>;
}

/// Result of attaching an owner's approval to a request token.
#[derive(Clone, Debug)]
pub enum AuthorizeOutcome {
	/// The token was unauthorized and now carries the verifier and owner.
	Authorized(RequestToken),
	/// The token had already been authorized or consumed; nothing changed.
	AlreadyAuthorized,
	/// No token matched.
	Missing,
}

/// Result of the atomic request-token consumption.
#[derive(Clone, Debug)]
pub enum ConsumeOutcome {
	/// The verifier matched and the token is now consumed.
	Consumed(RequestToken),
	/// The token was exchanged before.
	AlreadyConsumed,
	/// The token is authorized but the verifier differs.
	VerifierMismatch,
	/// The token exists but has not been authorized yet.
	NotAuthorized,
	/// No token matched for this client.
	Missing,
}

/// Error type produced by [`ProviderStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// A referenced record does not exist.
	#[error("The {entity} does not exist.")]
	NotFound {
		/// Record kind.
		entity: &'static str,
	},
	/// A uniqueness constraint was violated.
	#[error("Uniqueness constraint violated.")]
	Conflict,
}

/// Serializable image of every record a store holds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct StoreSnapshot {
	clients: Vec<Client>,
	request_tokens: Vec<RequestToken>,
	access_tokens: Vec<AccessToken>,
	nonces: Vec<NonceRecord>,
}

/// Indexed records shared by the built-in backends.
#[derive(Clone, Debug, Default)]
pub(crate) struct StoreState {
	clients: HashMap<ClientKey, Client>,
	request_tokens: HashMap<TokenKey, RequestToken>,
	access_tokens: HashMap<TokenKey, AccessToken>,
	nonces: HashMap<NonceKey, NonceRecord>,
}
impl StoreState {
	pub(crate) fn from_snapshot(snapshot: StoreSnapshot) -> Self {
		Self {
			clients: snapshot.clients.into_iter().map(|c| (c.client_key.clone(), c)).collect(),
			request_tokens: snapshot
				.request_tokens
				.into_iter()
				.map(|t| (t.token.clone(), t))
				.collect(),
			access_tokens: snapshot
				.access_tokens
				.into_iter()
				.map(|t| (t.token.clone(), t))
				.collect(),
			nonces: snapshot.nonces.into_iter().map(|n| (n.key.clone(), n)).collect(),
		}
	}

	pub(crate) fn to_snapshot(&self) -> StoreSnapshot {
		StoreSnapshot {
			clients: self.clients.values().cloned().collect(),
			request_tokens: self.request_tokens.values().cloned().collect(),
			access_tokens: self.access_tokens.values().cloned().collect(),
			nonces: self.nonces.values().cloned().collect(),
		}
	}

	pub(crate) fn save_client(&mut self, client: Client) {
		self.clients.insert(client.client_key.clone(), client);
	}

	pub(crate) fn client(&self, client_key: &ClientKey) -> Option<Client> {
		self.clients.get(client_key).cloned()
	}

	pub(crate) fn save_request_token(&mut self, token: RequestToken) {
		self.request_tokens.insert(token.token.clone(), token);
	}

	pub(crate) fn request_token(&self, token: &TokenKey) -> Option<RequestToken> {
		self.request_tokens.get(token).cloned()
	}

	pub(crate) fn authorize_request_token(
		&mut self,
		token: &TokenKey,
		verifier: TokenSecret,
		owner: OwnerId,
		instant: OffsetDateTime,
	) -> AuthorizeOutcome {
		match self.request_tokens.get_mut(token) {
			Some(record) if record.is_unauthorized() => {
				record.authorize(verifier, owner, instant);

				AuthorizeOutcome::Authorized(record.clone())
			},
			Some(_) => AuthorizeOutcome::AlreadyAuthorized,
			None => AuthorizeOutcome::Missing,
		}
	}

	pub(crate) fn consume_request_token(
		&mut self,
		client_key: &ClientKey,
		token: &TokenKey,
		verifier: &str,
		instant: OffsetDateTime,
	) -> ConsumeOutcome {
		let Some(record) =
			self.request_tokens.get_mut(token).filter(|record| &record.client_key == client_key)
		else {
			return ConsumeOutcome::Missing;
		};

		if record.is_consumed() {
			return ConsumeOutcome::AlreadyConsumed;
		}
		if record.is_unauthorized() {
			return ConsumeOutcome::NotAuthorized;
		}
		if !record.verifier_matches(verifier) {
			return ConsumeOutcome::VerifierMismatch;
		}

		record.consume(instant);

		ConsumeOutcome::Consumed(record.clone())
	}

	pub(crate) fn save_access_token(&mut self, token: AccessToken) {
		self.access_tokens.insert(token.token.clone(), token);
	}

	pub(crate) fn access_token(&self, token: &TokenKey) -> Option<AccessToken> {
		self.access_tokens.get(token).cloned()
	}

	pub(crate) fn revoke_access_token(
		&mut self,
		token: &TokenKey,
		instant: OffsetDateTime,
	) -> Option<AccessToken> {
		let record = self.access_tokens.get_mut(token)?;

		record.revoke(instant);

		Some(record.clone())
	}

	pub(crate) fn insert_nonce(&mut self, record: NonceRecord) -> Result<(), StoreError> {
		if self.nonces.contains_key(&record.key) {
			return Err(StoreError::Conflict);
		}

		self.nonces.insert(record.key.clone(), record);

		Ok(())
	}

	pub(crate) fn nonce_count(&self) -> usize {
		self.nonces.len()
	}

	pub(crate) fn prune_nonces(&mut self, cutoff: u64) -> usize {
		let before = self.nonces.len();

		self.nonces.retain(|key, _| key.timestamp >= cutoff);

		before - self.nonces.len()
	}
}
