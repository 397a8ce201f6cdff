//! Request and access token records plus their lifecycle helpers.

// self
use crate::{
	_prelude::*,
	auth::{Callback, ClientKey, OwnerId, RealmSet, TokenKey, TokenSecret},
};

/// Lifecycle status of a request token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestTokenStatus {
	/// Issued to the client; waiting for the resource owner.
	Unauthorized,
	/// The owner approved it and a verifier is attached.
	Authorized,
	/// Exchanged for an access token; inert from now on.
	Consumed,
}

/// Temporary credential representing an authorization grant in progress.
#[derive(Clone, Serialize, Deserialize)]
pub struct RequestToken {
	/// Public token value (`oauth_token`).
	pub token: TokenKey,
	/// Token secret paired with the client secret when signing.
	pub secret: TokenSecret,
	/// Client the token was issued to.
	pub client_key: ClientKey,
	/// Where to send the owner after authorization.
	pub callback: Option<Callback>,
	/// Realms requested for the eventual access token.
	pub realm: Option<RealmSet>,
	/// Verifier attached by the authorization step.
	pub verifier: Option<TokenSecret>,
	/// Owner who authorized the token.
	pub owner: Option<OwnerId>,
	/// Issue instant.
	pub issued_at: OffsetDateTime,
	/// Authorization instant.
	pub authorized_at: Option<OffsetDateTime>,
	/// Exchange instant.
	pub consumed_at: Option<OffsetDateTime>,
}
impl RequestToken {
	/// Creates an unauthorized request token stamped with the current clock.
	pub fn new(
		token: TokenKey,
		secret: TokenSecret,
		client_key: ClientKey,
		callback: Option<Callback>,
		realm: Option<RealmSet>,
	) -> Self {
		Self {
			token,
			secret,
			client_key,
			callback,
			realm,
			verifier: None,
			owner: None,
			issued_at: OffsetDateTime::now_utc(),
			authorized_at: None,
			consumed_at: None,
		}
	}

	/// Computes the lifecycle status.
	pub fn status(&self) -> RequestTokenStatus {
		if self.consumed_at.is_some() {
			RequestTokenStatus::Consumed
		} else if self.verifier.is_some() {
			RequestTokenStatus::Authorized
		} else {
			RequestTokenStatus::Unauthorized
		}
	}

	/// Returns true if the owner has not acted on the token yet.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self.status(), RequestTokenStatus::Unauthorized)
	}

	/// Returns true once the token has been exchanged.
	pub fn is_consumed(&self) -> bool {
		matches!(self.status(), RequestTokenStatus::Consumed)
	}

	/// Returns true if the token is authorized and `candidate` equals the stored verifier.
	pub fn verifier_matches(&self, candidate: &str) -> bool {
		self.verifier.as_ref().is_some_and(|verifier| verifier.matches(candidate))
	}

	/// Attaches the owner's approval.
	pub fn authorize(&mut self, verifier: TokenSecret, owner: OwnerId, instant: OffsetDateTime) {
		self.verifier = Some(verifier);
		self.owner = Some(owner);
		self.authorized_at = Some(instant);
	}

	/// Marks the token as exchanged.
	pub fn consume(&mut self, instant: OffsetDateTime) {
		self.consumed_at = Some(instant);
	}
}
impl Debug for RequestToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestToken")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.field("client_key", &self.client_key)
			.field("callback", &self.callback)
			.field("realm", &self.realm)
			.field("verifier", &self.verifier.as_ref().map(|_| "<redacted>"))
			.field("owner", &self.owner)
			.field("issued_at", &self.issued_at)
			.field("authorized_at", &self.authorized_at)
			.field("consumed_at", &self.consumed_at)
			.finish()
	}
}

/// Long-lived credential for calling protected resources on the owner's behalf.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
	/// Public token value (`oauth_token`).
	pub token: TokenKey,
	/// Token secret paired with the client secret when signing.
	pub secret: TokenSecret,
	/// Client the token was issued to.
	pub client_key: ClientKey,
	/// Owner who granted access.
	pub owner: OwnerId,
	/// Realms inherited from the request token.
	pub realm: Option<RealmSet>,
	/// Issue instant.
	pub issued_at: OffsetDateTime,
	/// Revocation instant if the token has been revoked.
	pub revoked_at: Option<OffsetDateTime>,
}
impl AccessToken {
	/// Derives an access token from a consumed request token, inheriting owner and realm.
	///
	/// Returns `None` when the request token was never authorized.
	pub fn from_request_token(
		request: &RequestToken,
		token: TokenKey,
		secret: TokenSecret,
	) -> Option<Self> {
		Some(Self {
			token,
			secret,
			client_key: request.client_key.clone(),
			owner: request.owner.clone()?,
			realm: request.realm.clone(),
			issued_at: OffsetDateTime::now_utc(),
			revoked_at: None,
		})
	}

	/// Returns true if the token has been revoked.
	pub fn is_revoked(&self) -> bool {
		self.revoked_at.is_some()
	}

	/// Marks the token as revoked.
	pub fn revoke(&mut self, instant: OffsetDateTime) {
		self.revoked_at = Some(instant);
	}

	/// Returns true when no realm is required, or the stored realm intersects `required`.
	pub fn grants_realm(&self, required: Option<&RealmSet>) -> bool {
		match required {
			None => true,
			Some(required) if required.is_empty() => true,
			Some(required) => self.realm.as_ref().is_some_and(|realm| realm.intersects(required)),
		}
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.field("client_key", &self.client_key)
			.field("owner", &self.owner)
			.field("realm", &self.realm)
			.field("issued_at", &self.issued_at)
			.field("revoked_at", &self.revoked_at)
			.finish()
	}
}
