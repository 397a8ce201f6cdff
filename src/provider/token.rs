//! Request-token and access-token endpoints.

// self
use crate::{
	_prelude::*,
	auth::Callback,
	error::{AuthorizationError, MalformedRequestError},
	http::{FormResponse, IncomingRequest},
	obs::{self, EndpointKind, EndpointOutcome, EndpointSpan},
	pipeline::VerifyOptions,
	provider::{Provider, credentials_response},
};

impl Provider {
	/// Issues temporary credentials (RFC 5849 §2.1).
	///
	/// The response carries `oauth_token`, `oauth_token_secret` and
	/// `oauth_callback_confirmed=true`.
	pub async fn request_token(&self, request: &IncomingRequest) -> Result<FormResponse> {
		const KIND: EndpointKind = EndpointKind::RequestToken;

		let span = EndpointSpan::new(KIND, "request_token");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let result = span
			.instrument(async move {
				let verified =
					self.verifier.verify(request, &VerifyOptions::request_token()).await?;
				let callback = verified
					.params
					.callback
					.as_deref()
					.map(Callback::parse)
					.transpose()
					.map_err(|_| MalformedRequestError::InvalidParameter {
						name: "oauth_callback",
						reason: "neither an absolute URI nor `oob`",
					})?;
				let issued = self
					.issuer
					.issue_request_token(
						verified.client_key(),
						callback,
						verified.params.realm.clone(),
					)
					.await?;

				Ok(credentials_response(&issued.token, issued.secret.expose())
					.with("oauth_callback_confirmed", "true"))
			})
			.await;

		obs::record_endpoint_outcome(KIND, EndpointOutcome::of(&result));

		result
	}

	/// Exchanges an authorized request token and its verifier for token credentials
	/// (RFC 5849 §2.3).
	///
	/// The request token is consumed; a second exchange fails even with the right verifier.
	pub async fn access_token(&self, request: &IncomingRequest) -> Result<FormResponse> {
		const KIND: EndpointKind = EndpointKind::AccessToken;

		let span = EndpointSpan::new(KIND, "access_token");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let result = span
			.instrument(async move {
				let verified = self.verifier.verify(request, &VerifyOptions::access_token()).await?;
				let (Some(token), Some(verifier)) =
					(verified.params.token.as_ref(), verified.params.verifier.as_deref())
				else {
					return Err(AuthorizationError.into());
				};
				let issued = self
					.issuer
					.exchange_for_access_token(verified.client_key(), token, verifier)
					.await?;

				Ok(credentials_response(&issued.token, issued.secret.expose()))
			})
			.await;

		obs::record_endpoint_outcome(KIND, EndpointOutcome::of(&result));

		result
	}
}
