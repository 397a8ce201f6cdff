//! Provider configuration, its builder, and validation.

// self
use crate::{
	_prelude::*,
	auth::RealmSet,
	error::ConfigError,
	provider::EndpointPaths,
	signature::SignatureMethod,
};

/// Shortest generated credential accepted by validation.
pub const MIN_CREDENTIAL_LENGTH: usize = 20;
/// Default length of generated tokens, secrets, verifiers and client keys.
pub const DEFAULT_CREDENTIAL_LENGTH: usize = 30;

/// Inclusive length range for inbound values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
	/// Shortest accepted length.
	pub min: usize,
	/// Longest accepted length.
	pub max: usize,
}
impl LengthBounds {
	/// Creates a range.
	pub const fn new(min: usize, max: usize) -> Self {
		Self { min, max }
	}

	/// Returns true if `len` lies inside the range.
	pub fn contains(&self, len: usize) -> bool {
		(self.min..=self.max).contains(&len)
	}

	fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
		if self.min == 0 || self.min > self.max {
			return Err(ConfigError::InvalidLengthBounds { field });
		}

		Ok(())
	}
}

/// Runtime policy of a provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
	/// Paths of the protocol endpoints.
	pub endpoints: EndpointPaths,
	/// Length of generated request and access tokens.
	pub token_length: usize,
	/// Length of generated token and client secrets.
	pub secret_length: usize,
	/// Length of generated verifiers.
	pub verifier_length: usize,
	/// Length of generated client keys.
	pub client_key_length: usize,
	/// Accepted length of inbound `oauth_consumer_key` and `oauth_token`.
	pub credential_length: LengthBounds,
	/// Accepted length of inbound `oauth_nonce`.
	pub nonce_length: LengthBounds,
	/// Signature methods clients may use.
	pub signature_methods: Vec<SignatureMethod>,
	/// Reject requests whose URL is not `https`.
	pub enforce_ssl: bool,
	/// Realms clients may request; `None` accepts any realm.
	pub realms: Option<RealmSet>,
	/// Realm recorded on request tokens that did not ask for one.
	pub default_realm: Option<RealmSet>,
	/// Accept `oauth_callback=oob`.
	pub allow_out_of_band: bool,
	/// Maximum distance between `oauth_timestamp` and the provider clock, in seconds.
	pub timestamp_window_secs: Option<u64>,
}
impl ProviderConfig {
	/// Starts a builder seeded with the defaults.
	pub fn builder() -> ProviderConfigBuilder {
		ProviderConfigBuilder::default()
	}

	/// Parses and validates a JSON document; missing fields take their defaults.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(json);
		let config: Self =
			serde_path_to_error::deserialize(&mut deserializer).map_err(ConfigError::parse)?;

		config.validate()?;

		Ok(config)
	}

	/// Timestamp acceptance window, if any.
	pub fn timestamp_window(&self) -> Option<Duration> {
		self.timestamp_window_secs
			.map(|secs| Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)))
	}

	/// Checks every invariant of the configuration.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.endpoints.validate()?;
		self.credential_length.validate("credential_length")?;
		self.nonce_length.validate("nonce_length")?;

		for (field, actual) in [
			("token_length", self.token_length),
			("secret_length", self.secret_length),
			("verifier_length", self.verifier_length),
			("client_key_length", self.client_key_length),
		] {
			if actual < MIN_CREDENTIAL_LENGTH {
				return Err(ConfigError::CredentialTooShort {
					field,
					min: MIN_CREDENTIAL_LENGTH,
					actual,
				});
			}
		}

		// Issued keys must pass the inbound checks themselves.
		if [self.token_length, self.verifier_length, self.client_key_length]
			.into_iter()
			.any(|len| !self.credential_length.contains(len))
		{
			return Err(ConfigError::InvalidLengthBounds { field: "credential_length" });
		}
		if self.signature_methods.is_empty() {
			return Err(ConfigError::NoSignatureMethods);
		}
		if let (Some(allowed), Some(default)) = (&self.realms, &self.default_realm)
			&& !default.is_subset(allowed)
		{
			return Err(ConfigError::DefaultRealmNotAllowed);
		}

		Ok(())
	}
}
impl Default for ProviderConfig {
	fn default() -> Self {
		Self {
			endpoints: EndpointPaths::default(),
			token_length: DEFAULT_CREDENTIAL_LENGTH,
			secret_length: DEFAULT_CREDENTIAL_LENGTH,
			verifier_length: DEFAULT_CREDENTIAL_LENGTH,
			client_key_length: DEFAULT_CREDENTIAL_LENGTH,
			credential_length: LengthBounds::new(20, 64),
			nonce_length: LengthBounds::new(8, 64),
			signature_methods: SignatureMethod::DEFAULTS.to_vec(),
			enforce_ssl: true,
			realms: None,
			default_realm: None,
			allow_out_of_band: true,
			timestamp_window_secs: None,
		}
	}
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug, Default)]
pub struct ProviderConfigBuilder {
	config: ProviderConfig,
}
impl ProviderConfigBuilder {
	/// Overrides the endpoint paths.
	pub fn endpoints(mut self, endpoints: EndpointPaths) -> Self {
		self.config.endpoints = endpoints;

		self
	}

	/// Sets the generated token length.
	pub fn token_length(mut self, len: usize) -> Self {
		self.config.token_length = len;

		self
	}

	/// Sets the generated secret length.
	pub fn secret_length(mut self, len: usize) -> Self {
		self.config.secret_length = len;

		self
	}

	/// Sets the generated verifier length.
	pub fn verifier_length(mut self, len: usize) -> Self {
		self.config.verifier_length = len;

		self
	}

	/// Sets the generated client key length.
	pub fn client_key_length(mut self, len: usize) -> Self {
		self.config.client_key_length = len;

		self
	}

	/// Sets the accepted inbound credential lengths.
	pub fn credential_length(mut self, min: usize, max: usize) -> Self {
		self.config.credential_length = LengthBounds::new(min, max);

		self
	}

	/// Sets the accepted inbound nonce lengths.
	pub fn nonce_length(mut self, min: usize, max: usize) -> Self {
		self.config.nonce_length = LengthBounds::new(min, max);

		self
	}

	/// Replaces the enabled signature methods.
	pub fn signature_methods<I>(mut self, methods: I) -> Self
	where
		I: IntoIterator<Item = SignatureMethod>,
	{
		self.config.signature_methods = methods.into_iter().collect();
		self.config.signature_methods.sort();
		self.config.signature_methods.dedup();

		self
	}

	/// Toggles HTTPS enforcement.
	pub fn enforce_ssl(mut self, enforce: bool) -> Self {
		self.config.enforce_ssl = enforce;

		self
	}

	/// Restricts the realms clients may request.
	pub fn realms(mut self, realms: RealmSet) -> Self {
		self.config.realms = Some(realms);

		self
	}

	/// Sets the fallback realm for request tokens.
	pub fn default_realm(mut self, realm: RealmSet) -> Self {
		self.config.default_realm = Some(realm);

		self
	}

	/// Toggles `oob` callbacks.
	pub fn allow_out_of_band(mut self, allow: bool) -> Self {
		self.config.allow_out_of_band = allow;

		self
	}

	/// Enables the timestamp acceptance window.
	pub fn timestamp_window(mut self, window: Duration) -> Self {
		self.config.timestamp_window_secs = Some(window.whole_seconds().unsigned_abs());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}
