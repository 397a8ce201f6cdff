//! Single-use nonce enforcement.

// self
use crate::{
	_prelude::*,
	auth::{ClientKey, NonceRecord, TokenRef},
	store::{ProviderStore, StoreError},
};

/// Records `(client, timestamp, nonce, token)` tuples and rejects repeats.
///
/// Atomicity comes from the store: [`ProviderStore::insert_nonce`] fails with
/// [`StoreError::Conflict`] on a duplicate key, which is read as a replay.
#[derive(Clone)]
pub struct ReplayGuard {
	store: Arc<dyn ProviderStore>,
	window: Option<Duration>,
}
impl ReplayGuard {
	/// Creates a guard; `window` bounds how far `oauth_timestamp` may drift from the clock.
	pub fn new(store: Arc<dyn ProviderStore>, window: Option<Duration>) -> Self {
		Self { store, window }
	}

	/// Returns true if the tuple is fresh and has now been recorded.
	pub async fn check_and_record(
		&self,
		client_key: &ClientKey,
		timestamp: u64,
		nonce: &str,
		token: TokenRef,
	) -> Result<bool, StoreError> {
		if !self.is_timely(timestamp, OffsetDateTime::now_utc()) {
			return Ok(false);
		}

		let record = NonceRecord::new(client_key.clone(), timestamp, nonce, token);

		match <dyn ProviderStore>::insert_nonce(self.store.as_ref(), record).await {
			Ok(()) => Ok(true),
			Err(StoreError::Conflict) => Ok(false),
			Err(e) => Err(e),
		}
	}

	/// Returns true when no window is configured or `timestamp` lies inside it.
	pub fn is_timely(&self, timestamp: u64, now: OffsetDateTime) -> bool {
		let Some(window) = self.window else {
			return true;
		};
		let Ok(timestamp) = i64::try_from(timestamp) else {
			return false;
		};

		(now.unix_timestamp() - timestamp).abs() <= window.whole_seconds()
	}

	/// Deletes nonce records that fell out of the window; a no-op without one.
	pub async fn prune(&self) -> Result<usize, StoreError> {
		let Some(window) = self.window else {
			return Ok(0);
		};
		// A window reaching past the representable range prunes nothing.
		let cutoff = OffsetDateTime::now_utc()
			.checked_sub(window)
			.and_then(|cutoff| u64::try_from(cutoff.unix_timestamp()).ok())
			.unwrap_or(0);

		<dyn ProviderStore>::prune_nonces(self.store.as_ref(), cutoff).await
	}
}
impl Debug for ReplayGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReplayGuard").field("window", &self.window).finish_non_exhaustive()
	}
}
