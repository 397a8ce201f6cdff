//! Redacting wrapper for shared secrets, token secrets, and verifiers.

// crates.io
use subtle::ConstantTimeEq;
// self
use crate::{_prelude::*, issuer::generate_token};

/// Secret material (client secret, token secret, verifier) kept out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Draws a fresh alphanumeric secret of `len` characters.
	pub fn generate(len: usize) -> Self {
		Self(generate_token(len))
	}

	/// Returns the inner secret value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Compares against a candidate without short-circuiting on the first differing byte.
	pub fn matches(&self, candidate: &str) -> bool {
		self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn matches_requires_exact_value() {
		let secret = TokenSecret::new("verifier-123");

		assert!(secret.matches("verifier-123"));
		assert!(!secret.matches("verifier-124"));
		assert!(!secret.matches("verifier-12"));
		assert!(!secret.matches(""));
	}

	#[test]
	fn generated_secrets_have_the_requested_length() {
		let first = TokenSecret::generate(32);
		let second = TokenSecret::generate(32);

		assert_eq!(first.expose().len(), 32);
		assert!(first.expose().bytes().all(|b| b.is_ascii_alphanumeric()));
		assert!(!first.matches(second.expose()));
	}
}
