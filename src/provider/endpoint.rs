//! Endpoint paths and method-aware routing.

// self
use crate::{_prelude::*, error::ConfigError, obs::EndpointKind};

/// Protocol endpoints a transport routes to the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// `POST` temporary-credential request.
	RequestToken,
	/// `POST` token-credential exchange.
	AccessToken,
	/// `GET` confirmation page or `POST` owner decision.
	Authorize,
	/// `GET` registration form or `POST` registration.
	Register,
}
impl Endpoint {
	/// Observability label of the endpoint.
	pub const fn kind(self) -> EndpointKind {
		match self {
			Self::RequestToken => EndpointKind::RequestToken,
			Self::AccessToken => EndpointKind::AccessToken,
			Self::Authorize => EndpointKind::Authorize,
			Self::Register => EndpointKind::Register,
		}
	}

	/// Returns true if the endpoint answers `method`.
	pub fn accepts(self, method: &str) -> bool {
		match self {
			Self::RequestToken | Self::AccessToken => method.eq_ignore_ascii_case("POST"),
			Self::Authorize | Self::Register =>
				method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("POST"),
		}
	}
}

/// Paths the protocol endpoints are mounted on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
	/// Temporary-credential request path.
	pub request_token: String,
	/// Token-credential exchange path.
	pub access_token: String,
	/// Client registration path.
	pub register: String,
	/// Resource-owner authorization path.
	pub authorize: String,
}
impl EndpointPaths {
	/// Resolves a method and path to an endpoint.
	pub fn route(&self, method: &str, path: &str) -> Option<Endpoint> {
		[
			(Endpoint::RequestToken, &self.request_token),
			(Endpoint::AccessToken, &self.access_token),
			(Endpoint::Register, &self.register),
			(Endpoint::Authorize, &self.authorize),
		]
		.into_iter()
		.find(|(endpoint, mounted)| *mounted == path && endpoint.accepts(method))
		.map(|(endpoint, _)| endpoint)
	}

	pub(crate) fn validate(&self) -> Result<(), ConfigError> {
		let paths = [
			("request_token", &self.request_token),
			("access_token", &self.access_token),
			("register", &self.register),
			("authorize", &self.authorize),
		];
		let mut seen = BTreeMap::new();

		for (endpoint, path) in paths {
			if !path.starts_with('/') {
				return Err(ConfigError::InvalidEndpointPath { endpoint, path: path.clone() });
			}
			if seen.insert(path.as_str(), endpoint).is_some() {
				return Err(ConfigError::DuplicateEndpointPath { path: path.clone() });
			}
		}

		Ok(())
	}
}
impl Default for EndpointPaths {
	fn default() -> Self {
		Self {
			request_token: "/request_token".into(),
			access_token: "/access_token".into(),
			register: "/register".into(),
			authorize: "/authorize".into(),
		}
	}
}
