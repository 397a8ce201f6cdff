//! Per-call-site verification requirements.

// self
use crate::auth::RealmSet;

/// Flags selecting which checks a call site needs beyond signature and replay protection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerifyOptions {
	/// An `oauth_token` must be present and name a live token.
	pub require_resource_owner: bool,
	/// An `oauth_verifier` must be present and match the request token.
	pub require_verifier: bool,
	/// The presented access token must grant [`Self::required_realm`].
	pub require_realm: bool,
	/// Realm gate checked when [`Self::require_realm`] is set.
	pub required_realm: Option<RealmSet>,
	/// Check `oauth_callback` against the client's registered callbacks.
	pub validate_callback: bool,
}
impl VerifyOptions {
	/// Temporary-credential request: client signature only, callback and realm policy applied.
	pub fn request_token() -> Self {
		Self { validate_callback: true, ..Default::default() }
	}

	/// Token-credential exchange: an authorized request token and its verifier.
	pub fn access_token() -> Self {
		Self { require_resource_owner: true, require_verifier: true, ..Default::default() }
	}

	/// Protected resource call made with an access token.
	pub fn protected_resource() -> Self {
		Self { require_resource_owner: true, ..Default::default() }
	}

	/// Two-legged call signed with client credentials alone.
	pub fn client_only() -> Self {
		Self::default()
	}

	/// Gates the call on `realm`.
	pub fn with_realm(mut self, realm: RealmSet) -> Self {
		self.require_realm = true;
		self.required_realm = Some(realm);

		self
	}
}
