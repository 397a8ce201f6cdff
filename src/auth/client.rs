//! Registered clients (consumers) and the registration request that creates them.

// self
use crate::{
	_prelude::*,
	auth::{ClientKey, OwnerId, TokenSecret},
	error::ConfigError,
	signature::SignatureMethod,
};

/// A registered application allowed to sign requests against the provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct Client {
	/// Public client identifier (`oauth_consumer_key`).
	pub client_key: ClientKey,
	/// Display name shown on the authorization page.
	pub name: String,
	/// Optional display description.
	pub description: Option<String>,
	/// Shared secret for HMAC and PLAINTEXT signatures.
	pub secret: Option<TokenSecret>,
	/// PEM-encoded RSA public key for RSA-SHA1 signatures.
	pub public_key: Option<String>,
	/// Registered redirect targets.
	pub callbacks: Vec<Url>,
	/// Resource owner who registered the client, when known.
	pub owner: Option<OwnerId>,
	/// Registration instant.
	pub registered_at: OffsetDateTime,
}
impl Client {
	/// Checks the "secret or public key" invariant.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.secret.is_none() && self.public_key.is_none() {
			return Err(ConfigError::MissingSigningMaterial { client: self.client_key.clone() });
		}

		Ok(())
	}

	/// Returns true when the client holds the key material the method needs.
	pub fn supports(&self, method: SignatureMethod) -> bool {
		if method.uses_public_key() { self.public_key.is_some() } else { self.secret.is_some() }
	}

	/// Returns true if `candidate` matches one of the registered callbacks.
	pub fn is_registered_callback(&self, candidate: &Url) -> bool {
		self.callbacks.iter().any(|callback| callback == candidate)
	}

	/// The implicit callback used when a request omits `oauth_callback`.
	///
	/// Only clients with exactly one registered callback have one.
	pub fn default_callback(&self) -> Option<&Url> {
		match self.callbacks.as_slice() {
			[only] => Some(only),
			_ => None,
		}
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("client_key", &self.client_key)
			.field("name", &self.name)
			.field("description", &self.description)
			.field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
			.field("public_key_set", &self.public_key.is_some())
			.field("callbacks", &self.callbacks)
			.field("owner", &self.owner)
			.field("registered_at", &self.registered_at)
			.finish()
	}
}

/// Application-supplied metadata for a new client registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientRegistration {
	/// Display name.
	pub name: String,
	/// Optional display description.
	pub description: Option<String>,
	/// Redirect targets the client may use.
	pub callbacks: Vec<Url>,
	/// PEM-encoded RSA public key, if the client signs with RSA-SHA1.
	pub public_key: Option<String>,
	/// Owner performing the registration.
	pub owner: Option<OwnerId>,
	/// Whether a shared secret should be generated (defaults to true).
	pub issue_secret: bool,
}
impl ClientRegistration {
	/// Starts a registration for an application with the provided display name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			description: None,
			callbacks: Vec::new(),
			public_key: None,
			owner: None,
			issue_secret: true,
		}
	}

	/// Sets the display description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}

	/// Adds a redirect target.
	pub fn with_callback(mut self, callback: Url) -> Self {
		self.callbacks.push(callback);

		self
	}

	/// Attaches a PEM-encoded RSA public key.
	pub fn with_public_key(mut self, pem: impl Into<String>) -> Self {
		self.public_key = Some(pem.into());

		self
	}

	/// Records the registering owner.
	pub fn with_owner(mut self, owner: OwnerId) -> Self {
		self.owner = Some(owner);

		self
	}

	/// Skips shared-secret generation (RSA-only clients).
	pub fn without_secret(mut self) -> Self {
		self.issue_secret = false;

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn client(callbacks: &[&str]) -> Client {
		Client {
			client_key: ClientKey::new("client-key-0000000000")
				.expect("Client key should be valid."),
			name: "demo".into(),
			description: None,
			secret: Some(TokenSecret::new("secret")),
			public_key: None,
			callbacks: callbacks
				.iter()
				.map(|raw| Url::parse(raw).expect("Callback fixture should parse."))
				.collect(),
			owner: None,
			registered_at: OffsetDateTime::UNIX_EPOCH,
		}
	}

	#[test]
	fn default_callback_requires_exactly_one() {
		assert!(client(&[]).default_callback().is_none());
		assert_eq!(
			client(&["https://a.example.com/cb"]).default_callback().map(Url::as_str),
			Some("https://a.example.com/cb")
		);
		assert!(
			client(&["https://a.example.com/cb", "https://b.example.com/cb"])
				.default_callback()
				.is_none()
		);
	}

	#[test]
	fn signing_material_invariant() {
		let mut record = client(&[]);

		assert!(record.validate().is_ok());
		assert!(record.supports(SignatureMethod::HmacSha1));
		assert!(!record.supports(SignatureMethod::RsaSha1));

		record.secret = None;

		assert!(matches!(record.validate(), Err(ConfigError::MissingSigningMaterial { .. })));

		record.public_key = Some("-----BEGIN PUBLIC KEY-----".into());

		assert!(record.validate().is_ok());
		assert!(record.supports(SignatureMethod::RsaSha1));
		assert!(!record.supports(SignatureMethod::Plaintext));
	}

	#[test]
	fn debug_redacts_secret() {
		let rendered = format!("{:?}", client(&[]));

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("\"secret\""));
	}
}
