//! Provider-level error types and their boundary rendering.
//!
//! Only two classes are meant to reach clients: [`MalformedRequestError`] (400, descriptive) and
//! [`AuthorizationError`] (401, deliberately opaque). Everything else is a server fault.

// self
use crate::{
	_prelude::*,
	auth::{ClientKey, IdentifierError, RealmValidationError},
	store::StoreError,
};

/// Provider-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical provider error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Missing, duplicated, or unparseable protocol parameters.
	#[error(transparent)]
	Malformed(#[from] MalformedRequestError),
	/// Any authorization failure; carries no detail on purpose.
	#[error(transparent)]
	Unauthorized(#[from] AuthorizationError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(#[source] StoreError),
}
impl Error {
	/// HTTP status code the transport should answer with.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::Malformed(_) => 400,
			Self::Unauthorized(_) => 401,
			Self::Config(_) | Self::Storage(_) => 500,
		}
	}

	/// Response body safe to show to the client.
	pub fn public_message(&self) -> Cow<'static, str> {
		match self {
			Self::Malformed(err) => Cow::Owned(err.to_string()),
			Self::Unauthorized(_) => Cow::Borrowed("Unauthorized"),
			Self::Config(_) | Self::Storage(_) => Cow::Borrowed("Internal Server Error"),
		}
	}

	/// Returns true for the 401 class.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized(_))
	}

	/// Returns true for the 400 class.
	pub fn is_malformed(&self) -> bool {
		matches!(self, Self::Malformed(_))
	}
}
impl From<StoreError> for Error {
	fn from(e: StoreError) -> Self {
		match e {
			StoreError::NotFound { .. } => Self::Unauthorized(AuthorizationError),
			other => Self::Storage(other),
		}
	}
}

/// Unified authorization failure.
///
/// Unknown clients, bad signatures, unknown or reused tokens, verifier mismatches, nonce replays,
/// and realm mismatches all collapse into this value so responses cannot be used as an oracle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ThisError)]
#[error("The request could not be authorized.")]
pub struct AuthorizationError;

/// Client-side protocol errors; safe to describe since they concern the client implementation.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum MalformedRequestError {
	/// A required protocol parameter is absent.
	#[error("Missing mandatory OAuth parameter {name}.")]
	MissingParameter {
		/// Parameter name.
		name: &'static str,
	},
	/// A protocol parameter appeared more than once.
	#[error("Duplicate OAuth parameter {name}.")]
	DuplicateParameter {
		/// Parameter name.
		name: String,
	},
	/// A protocol parameter failed syntax checks.
	#[error("Invalid OAuth parameter {name}: {reason}.")]
	InvalidParameter {
		/// Parameter name.
		name: &'static str,
		/// Human-readable reason.
		reason: &'static str,
	},
	/// The `Authorization: OAuth` header could not be parsed.
	#[error("Malformed OAuth Authorization header.")]
	InvalidAuthorizationHeader,
	/// `oauth_version` was present with a value other than `1.0`.
	#[error("Unsupported OAuth version {version}.")]
	UnsupportedVersion {
		/// Version string sent by the client.
		version: String,
	},
	/// The request did not arrive over HTTPS while HTTPS is enforced.
	#[error("Insecure transport; HTTPS is required.")]
	InsecureTransport,
}

/// Configuration and setup failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A generated credential length is below the supported minimum.
	#[error("The {field} must be at least {min} characters, got {actual}.")]
	CredentialTooShort {
		/// Configuration field name.
		field: &'static str,
		/// Minimum length.
		min: usize,
		/// Configured length.
		actual: usize,
	},
	/// An inbound length bound is empty or inverted.
	#[error("The {field} bounds are invalid.")]
	InvalidLengthBounds {
		/// Configuration field name.
		field: &'static str,
	},
	/// No signature method is enabled.
	#[error("At least one signature method must be enabled.")]
	NoSignatureMethods,
	/// Endpoint path is not absolute.
	#[error("The {endpoint} endpoint path must start with '/': {path}.")]
	InvalidEndpointPath {
		/// Endpoint label.
		endpoint: &'static str,
		/// Offending path.
		path: String,
	},
	/// Two endpoints share the same path.
	#[error("Endpoint path {path} is used more than once.")]
	DuplicateEndpointPath {
		/// Offending path.
		path: String,
	},
	/// The default realm is outside the provider realm whitelist.
	#[error("The default realm is not part of the allowed realms.")]
	DefaultRealmNotAllowed,
	/// A client holds neither a shared secret nor a public key.
	#[error("Client {client} has neither a shared secret nor a public key.")]
	MissingSigningMaterial {
		/// Affected client.
		client: ClientKey,
	},
	/// A generated or supplied identifier is invalid.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
	/// A configured realm is invalid.
	#[error(transparent)]
	InvalidRealm(#[from] RealmValidationError),
	/// The JSON configuration could not be parsed.
	#[error("Provider configuration is invalid at {path}.")]
	Parse {
		/// Path of the offending field.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a path-aware JSON parsing failure.
	pub fn parse(source: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self::Parse { path: source.path().to_string(), source }
	}
}
