//! Thread-safe in-memory [`ProviderStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{
		AccessToken, Client, ClientKey, NonceRecord, OwnerId, RequestToken, TokenKey, TokenSecret,
	},
	store::{AuthorizeOutcome, ConsumeOutcome, ProviderStore, StoreFuture, StoreState},
};

type SharedState = Arc<RwLock<StoreState>>;

/// Thread-safe storage backend that keeps records in-process for tests and demos.
///
/// Every mutation takes the write lock for its whole check-and-update, which gives the nonce
/// and request-token operations their atomicity.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SharedState);
impl MemoryStore {
	/// Number of nonce records currently held.
	pub fn nonce_count(&self) -> usize {
		self.0.read().nonce_count()
	}

	fn read<T>(state: &SharedState, f: impl FnOnce(&StoreState) -> T) -> T {
		f(&state.read())
	}

	fn write<T>(state: &SharedState, f: impl FnOnce(&mut StoreState) -> T) -> T {
		f(&mut state.write())
	}
}
impl ProviderStore for MemoryStore {
	fn save_client(&self, client: Client) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			Self::write(&state, |s| s.save_client(client));

			Ok(())
		})
	}

	fn fetch_client<'a>(&'a self, client_key: &'a ClientKey) -> StoreFuture<'a, Option<Client>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(Self::read(&state, |s| s.client(client_key))) })
	}

	fn save_request_token(&self, token: RequestToken) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			Self::write(&state, |s| s.save_request_token(token));

			Ok(())
		})
	}

	fn fetch_request_token<'a>(
		&'a self,
		token: &'a TokenKey,
	) -> StoreFuture<'a, Option<RequestToken>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(Self::read(&state, |s| s.request_token(token))) })
	}

	fn authorize_request_token<'a>(
		&'a self,
		token: &'a TokenKey,
		verifier: TokenSecret,
		owner: OwnerId,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, AuthorizeOutcome> {
		let state = self.0.clone();

		Box::pin(async move {
			Ok(Self::write(&state, |s| s.authorize_request_token(token, verifier, owner, instant)))
		})
	}

	fn consume_request_token<'a>(
		&'a self,
		client_key: &'a ClientKey,
		token: &'a TokenKey,
		verifier: &'a str,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, ConsumeOutcome> {
		let state = self.0.clone();

		Box::pin(async move {
			Ok(Self::write(&state, |s| {
				s.consume_request_token(client_key, token, verifier, instant)
			}))
		})
	}

	fn save_access_token(&self, token: AccessToken) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			Self::write(&state, |s| s.save_access_token(token));

			Ok(())
		})
	}

	fn fetch_access_token<'a>(
		&'a self,
		token: &'a TokenKey,
	) -> StoreFuture<'a, Option<AccessToken>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(Self::read(&state, |s| s.access_token(token))) })
	}

	fn revoke_access_token<'a>(
		&'a self,
		token: &'a TokenKey,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, Option<AccessToken>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(Self::write(&state, |s| s.revoke_access_token(token, instant))) })
	}

	fn insert_nonce(&self, record: NonceRecord) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move { Self::write(&state, |s| s.insert_nonce(record)) })
	}

	fn prune_nonces(&self, cutoff: u64) -> StoreFuture<'_, usize> {
		let state = self.0.clone();

		Box::pin(async move { Ok(Self::write(&state, |s| s.prune_nonces(cutoff))) })
	}
}
