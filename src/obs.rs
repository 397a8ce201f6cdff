//! Optional observability helpers for provider endpoints.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth1_provider.endpoint` with the
//!   `endpoint` and `stage` fields, plus `debug!` events for rejected verifications.
//! - Enable `metrics` to increment `oauth1_provider_endpoint_total` (labeled by `endpoint` +
//!   `outcome`) and `oauth1_provider_rejection_total` (labeled by `stage`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Provider operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointKind {
	/// Temporary-credential issuance.
	RequestToken,
	/// Token-credential exchange.
	AccessToken,
	/// Resource-owner authorization.
	Authorize,
	/// Client registration.
	Register,
	/// Signed call to a protected resource.
	ProtectedResource,
}
impl EndpointKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointKind::RequestToken => "request_token",
			EndpointKind::AccessToken => "access_token",
			EndpointKind::Authorize => "authorize",
			EndpointKind::Register => "register",
			EndpointKind::ProtectedResource => "protected_resource",
		}
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointOutcome {
	/// Entry to a provider operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Authorization failure (401).
	Rejected,
	/// Malformed request (400).
	Malformed,
	/// Configuration or storage failure (500).
	Failure,
}
impl EndpointOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointOutcome::Attempt => "attempt",
			EndpointOutcome::Success => "success",
			EndpointOutcome::Rejected => "rejected",
			EndpointOutcome::Malformed => "malformed",
			EndpointOutcome::Failure => "failure",
		}
	}

	/// Classifies an operation result.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => Self::Success,
			Err(Error::Malformed(_)) => Self::Malformed,
			Err(Error::Unauthorized(_)) => Self::Rejected,
			Err(Error::Config(_) | Error::Storage(_)) => Self::Failure,
		}
	}
}
impl Display for EndpointOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
