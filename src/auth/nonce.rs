//! Replay-protection facts: one record per accepted `(client, timestamp, nonce, token)` tuple.

// self
use crate::{
	_prelude::*,
	auth::{ClientKey, TokenKey},
};

/// Token presented alongside a nonce; at most one kind is ever attached.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "token", rename_all = "snake_case")]
pub enum TokenRef {
	/// Two-legged request without a token (request-token endpoint, client-only resources).
	#[default]
	None,
	/// Request token presented on the access-token exchange.
	Request(TokenKey),
	/// Access token presented on a protected resource call.
	Access(TokenKey),
}
impl TokenRef {
	/// Returns the referenced token value, if any.
	pub fn token(&self) -> Option<&TokenKey> {
		match self {
			Self::None => None,
			Self::Request(token) | Self::Access(token) => Some(token),
		}
	}
}

/// Uniqueness key the store must enforce for nonce records.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonceKey {
	/// Client that signed the request.
	pub client_key: ClientKey,
	/// Value of `oauth_timestamp`.
	pub timestamp: u64,
	/// Value of `oauth_nonce`.
	pub nonce: String,
	/// Token presented with the request.
	pub token: TokenRef,
}

/// Write-once record proving a nonce has been consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceRecord {
	/// Uniqueness key.
	pub key: NonceKey,
	/// Instant the provider accepted the request.
	pub recorded_at: OffsetDateTime,
}
impl NonceRecord {
	/// Creates a record stamped with the current clock.
	pub fn new(
		client_key: ClientKey,
		timestamp: u64,
		nonce: impl Into<String>,
		token: TokenRef,
	) -> Self {
		Self {
			key: NonceKey { client_key, timestamp, nonce: nonce.into(), token },
			recorded_at: OffsetDateTime::now_utc(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_ref_exposes_single_token() {
		let token = TokenKey::new("token-abc").expect("Token fixture should be valid.");

		assert_eq!(TokenRef::None.token(), None);
		assert_eq!(TokenRef::Request(token.clone()).token(), Some(&token));
		assert_eq!(TokenRef::Access(token.clone()).token(), Some(&token));
		assert_ne!(TokenRef::Request(token.clone()), TokenRef::Access(token));
	}

	#[test]
	fn keys_differ_by_token_kind() {
		let client = ClientKey::new("client").expect("Client fixture should be valid.");
		let token = TokenKey::new("token").expect("Token fixture should be valid.");
		let a = NonceRecord::new(client.clone(), 1, "n", TokenRef::Request(token.clone()));
		let b = NonceRecord::new(client, 1, "n", TokenRef::Access(token));

		assert_ne!(a.key, b.key);
	}
}
