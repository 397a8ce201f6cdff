//! OAuth 1.0a provider core: verifies signed requests against single-use nonces and runs the
//! three-legged token lifecycle over pluggable stores.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod encoding;
pub mod error;
pub mod ext;
pub mod http;
pub mod issuer;
pub mod obs;
pub mod params;
pub mod pipeline;
pub mod provider;
pub mod replay;
pub mod signature;
pub mod store;
pub mod validator;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{Client, ClientKey, ClientRegistration},
		http::IncomingRequest,
		provider::{Provider, ProviderConfig},
		signature::{RequestSigner, SignatureMethod},
		store::{MemoryStore, ProviderStore},
	};

	/// Callback registered for fixture clients.
	pub const TEST_CALLBACK: &str = "https://client.example.com/cb";
	/// Base URL used by fixture requests.
	pub const TEST_ORIGIN: &str = "https://provider.example.com";

	/// Builds a [`Provider`] over a fresh [`MemoryStore`] using the default configuration.
	pub fn build_test_provider() -> (Provider, Arc<MemoryStore>) {
		build_test_provider_with(ProviderConfig::default())
	}

	/// Builds a [`Provider`] over a fresh [`MemoryStore`] using the supplied configuration.
	pub fn build_test_provider_with(config: ProviderConfig) -> (Provider, Arc<MemoryStore>) {
		let backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn ProviderStore> = backend.clone();

		(Provider::new(config, store).expect("Fixture provider config should be valid."), backend)
	}

	/// Registers an HMAC-capable client with a single [`TEST_CALLBACK`].
	pub async fn register_test_client(provider: &Provider) -> Client {
		let callback = Url::parse(TEST_CALLBACK).expect("Fixture callback should parse.");

		provider
			.register(ClientRegistration::new("Fixture client").with_callback(callback))
			.await
			.expect("Fixture client registration should succeed.")
	}

	/// Builds a signer for the provided client using its shared secret.
	pub fn signer_for(client: &Client, method: SignatureMethod) -> RequestSigner {
		let secret = client.secret.clone().expect("Fixture client should carry a shared secret.");

		RequestSigner::new(client.client_key.clone(), method).with_client_secret(secret)
	}

	/// Resolves a path against [`TEST_ORIGIN`].
	pub fn test_url(path: &str) -> Url {
		Url::parse(TEST_ORIGIN)
			.and_then(|origin| origin.join(path))
			.expect("Fixture URL should parse.")
	}

	/// Signs a bodiless request and returns it ready for verification.
	pub fn signed_request(signer: &RequestSigner, method: &str, url: Url) -> IncomingRequest {
		let header = signer
			.sign(method, &url, &[])
			.expect("Fixture request should sign successfully.")
			.authorization_header();

		IncomingRequest::new(method, url).with_header("Authorization", header)
	}

	/// Convenience accessor used by fixtures that only know the raw key.
	pub fn client_key(value: &str) -> ClientKey {
		ClientKey::new(value).expect("Fixture client key should be valid.")
	}
}

mod _prelude {
	pub use std::{
		borrow::Cow,
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, tokio as _};
