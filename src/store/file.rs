//! File-backed [`ProviderStore`] for small single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{
		AccessToken, Client, ClientKey, NonceRecord, OwnerId, RequestToken, TokenKey, TokenSecret,
	},
	store::{
		AuthorizeOutcome, ConsumeOutcome, ProviderStore, StoreError, StoreFuture, StoreSnapshot,
		StoreState,
	},
};

/// Persists provider records to a JSON file after each mutation.
///
/// The snapshot is written to a sibling `.tmp` file and renamed over the target, so readers
/// never observe a partially written file.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<StoreState>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let state = StoreState::from_snapshot(Self::load_snapshot(&path)?);

		Ok(Self { path, inner: Arc::new(RwLock::new(state)) })
	}

	/// Location of the JSON snapshot.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<StoreSnapshot, StoreError> {
		if !path.exists() {
			return Ok(StoreSnapshot::default());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(StoreSnapshot::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, state: &StoreState) -> Result<(), StoreError> {
		let serialized =
			serde_json::to_vec_pretty(&state.to_snapshot()).map_err(|e| {
				StoreError::Serialization {
					message: format!("Failed to serialize store snapshot: {e}"),
				}
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	/// Applies a mutation to a staged copy under the write lock and persists when `changed`
	/// says so.
	///
	/// The in-memory state only advances once the snapshot is on disk, so a failed write leaves
	/// memory and file in agreement.
	fn mutate<T>(
		&self,
		apply: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
		changed: impl FnOnce(&T) -> bool,
	) -> Result<T, StoreError> {
		let mut guard = self.inner.write();
		let mut staged = guard.clone();
		let value = apply(&mut staged)?;

		if changed(&value) {
			self.persist_locked(&staged)?;
		}

		*guard = staged;

		Ok(value)
	}
}
impl ProviderStore for FileStore {
	fn save_client(&self, client: Client) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.mutate(
				|s| {
					s.save_client(client);

					Ok(())
				},
				|_| true,
			)
		})
	}

	fn fetch_client<'a>(&'a self, client_key: &'a ClientKey) -> StoreFuture<'a, Option<Client>> {
		Box::pin(async move { Ok(self.inner.read().client(client_key)) })
	}

	fn save_request_token(&self, token: RequestToken) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.mutate(
				|s| {
					s.save_request_token(token);

					Ok(())
				},
				|_| true,
			)
		})
	}

	fn fetch_request_token<'a>(
		&'a self,
		token: &'a TokenKey,
	) -> StoreFuture<'a, Option<RequestToken>> {
		Box::pin(async move { Ok(self.inner.read().request_token(token)) })
	}

	fn authorize_request_token<'a>(
		&'a self,
		token: &'a TokenKey,
		verifier: TokenSecret,
		owner: OwnerId,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, AuthorizeOutcome> {
		Box::pin(async move {
			self.mutate(
				|s| Ok(s.authorize_request_token(token, verifier, owner, instant)),
				|outcome| matches!(outcome, AuthorizeOutcome::Authorized(_)),
			)
		})
	}

	fn consume_request_token<'a>(
		&'a self,
		client_key: &'a ClientKey,
		token: &'a TokenKey,
		verifier: &'a str,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, ConsumeOutcome> {
		Box::pin(async move {
			self.mutate(
				|s| Ok(s.consume_request_token(client_key, token, verifier, instant)),
				|outcome| matches!(outcome, ConsumeOutcome::Consumed(_)),
			)
		})
	}

	fn save_access_token(&self, token: AccessToken) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.mutate(
				|s| {
					s.save_access_token(token);

					Ok(())
				},
				|_| true,
			)
		})
	}

	fn fetch_access_token<'a>(
		&'a self,
		token: &'a TokenKey,
	) -> StoreFuture<'a, Option<AccessToken>> {
		Box::pin(async move { Ok(self.inner.read().access_token(token)) })
	}

	fn revoke_access_token<'a>(
		&'a self,
		token: &'a TokenKey,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, Option<AccessToken>> {
		Box::pin(async move {
			self.mutate(|s| Ok(s.revoke_access_token(token, instant)), Option::is_some)
		})
	}

	fn insert_nonce(&self, record: NonceRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|s| s.insert_nonce(record), |_| true) })
	}

	fn prune_nonces(&self, cutoff: u64) -> StoreFuture<'_, usize> {
		Box::pin(async move { self.mutate(|s| Ok(s.prune_nonces(cutoff)), |removed| *removed > 0) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::TokenRef;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"oauth1_provider_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn request_token() -> RequestToken {
		RequestToken::new(
			TokenKey::new("request-token-demo").expect("Failed to build token fixture."),
			TokenSecret::new("request-secret"),
			ClientKey::new("client-demo").expect("Failed to build client fixture."),
			None,
			None,
		)
	}

	#[test]
	fn consumption_survives_reopen() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let record = request_token();
		let token = record.token.clone();
		let client_key = record.client_key.clone();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let now = OffsetDateTime::now_utc();

		rt.block_on(store.save_request_token(record))
			.expect("Failed to save fixture record to file store.");
		rt.block_on(store.authorize_request_token(
			&token,
			TokenSecret::new("verifier"),
			OwnerId::new("alice").expect("Failed to build owner fixture."),
			now,
		))
		.expect("Failed to authorize fixture record.");

		let outcome = rt
			.block_on(store.consume_request_token(&client_key, &token, "verifier", now))
			.expect("Failed to consume fixture record.");

		assert!(matches!(outcome, ConsumeOutcome::Consumed(_)));

		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.fetch_request_token(&token))
			.expect("Failed to fetch fixture record from file store.")
			.expect("File store lost record after reopen.");

		assert!(fetched.is_consumed());

		let again = rt
			.block_on(reopened.consume_request_token(&client_key, &token, "verifier", now))
			.expect("Second consumption should not error.");

		assert!(matches!(again, ConsumeOutcome::AlreadyConsumed));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn nonce_conflicts_persist() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let record = NonceRecord::new(
			ClientKey::new("client-demo").expect("Failed to build client fixture."),
			1_700_000_000,
			"nonce-demo",
			TokenRef::None,
		);

		rt.block_on(store.insert_nonce(record.clone())).expect("First nonce should insert.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert_eq!(rt.block_on(reopened.insert_nonce(record)), Err(StoreError::Conflict));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_persist_leaves_memory_untouched() {
		let dir = temp_path().with_extension("d");
		let store = FileStore::open(dir.join("store.json")).expect("Failed to open file store.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let record = NonceRecord::new(
			ClientKey::new("client-demo").expect("Failed to build client fixture."),
			1_700_000_000,
			"nonce-demo",
			TokenRef::None,
		);

		fs::remove_dir_all(&dir).expect("Failed to remove store directory.");

		assert!(matches!(
			rt.block_on(store.insert_nonce(record.clone())),
			Err(StoreError::Backend { .. })
		));

		fs::create_dir_all(&dir).expect("Failed to recreate store directory.");

		assert_eq!(rt.block_on(store.insert_nonce(record)), Ok(()));

		fs::remove_dir_all(&dir).unwrap_or_else(|e| {
			panic!("Failed to remove temporary store directory {}: {e}", dir.display())
		});
	}
}
