//! Resource-owner authorization: the confirmation page data and the owner's decision.

// self
use crate::{
	_prelude::*,
	auth::{Callback, OwnerId, RealmSet, RequestToken, TokenKey},
	error::{AuthorizationError, MalformedRequestError},
	http::{AuthorizationRedirect, IncomingRequest},
	obs::{self, EndpointKind, EndpointOutcome, EndpointSpan},
	provider::Provider,
	store::ProviderStore,
};

/// What the owner is asked to approve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingAuthorization {
	/// Request token awaiting a decision.
	pub token: TokenKey,
	/// Display name of the requesting client.
	pub client_name: String,
	/// Optional client description.
	pub client_description: Option<String>,
	/// Realm the client asked for.
	pub realm: Option<RealmSet>,
	/// Where the owner will be sent afterwards.
	pub callback: Option<Callback>,
}

/// Reads `oauth_token` from the query string or a form body of an authorize request.
pub fn requested_token(request: &IncomingRequest) -> Result<TokenKey, MalformedRequestError> {
	let raw = request
		.url
		.query_pairs()
		.into_owned()
		.chain(request.form_pairs())
		.find(|(name, _)| name == "oauth_token")
		.map(|(_, value)| value)
		.ok_or(MalformedRequestError::MissingParameter { name: "oauth_token" })?;

	TokenKey::new(raw).map_err(|_| MalformedRequestError::InvalidParameter {
		name: "oauth_token",
		reason: "not a valid identifier",
	})
}

impl Provider {
	/// Loads the data for the GET confirmation page.
	///
	/// Unknown tokens and tokens the owner already acted on are unauthorized.
	pub async fn pending_authorization(&self, token: &TokenKey) -> Result<PendingAuthorization> {
		const KIND: EndpointKind = EndpointKind::Authorize;

		let span = EndpointSpan::new(KIND, "pending_authorization");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let result = span
			.instrument(async move {
				let record =
					<dyn ProviderStore>::fetch_request_token(self.store.as_ref(), token)
						.await?
						.filter(RequestToken::is_unauthorized)
						.ok_or(AuthorizationError)?;
				let client =
					<dyn ProviderStore>::fetch_client(self.store.as_ref(), &record.client_key)
						.await?
						.ok_or(AuthorizationError)?;

				Ok(PendingAuthorization {
					token: record.token,
					client_name: client.name,
					client_description: client.description,
					realm: record.realm,
					callback: record.callback,
				})
			})
			.await;

		obs::record_endpoint_outcome(KIND, EndpointOutcome::of(&result));

		result
	}

	/// Records `owner`'s approval of `token` and tells the transport where to send them.
	///
	/// The owner must already be authenticated by the surrounding application. Redirect
	/// callbacks receive `oauth_token` and `oauth_verifier` as query parameters; `oob`
	/// clients get the verifier for display.
	pub async fn authorize(
		&self,
		token: &TokenKey,
		owner: OwnerId,
	) -> Result<AuthorizationRedirect> {
		const KIND: EndpointKind = EndpointKind::Authorize;

		let span = EndpointSpan::new(KIND, "authorize");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let result = span
			.instrument(async move {
				let approval = self.issuer.authorize(token, owner).await?;

				Ok(match approval.callback {
					Some(Callback::Redirect(mut url)) => {
						url.query_pairs_mut()
							.append_pair("oauth_token", &approval.token)
							.append_pair("oauth_verifier", approval.verifier.expose());

						AuthorizationRedirect::Redirect(url)
					},
					Some(Callback::OutOfBand) | None => AuthorizationRedirect::OutOfBand {
						verifier: approval.verifier.expose().to_owned(),
					},
				})
			})
			.await;

		obs::record_endpoint_outcome(KIND, EndpointOutcome::of(&result));

		result
	}
}
