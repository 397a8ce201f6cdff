//! Callback targets recorded on request tokens.

// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Literal `oauth_callback` value announcing an out-of-band verifier (RFC 5849 §2.1).
pub const OUT_OF_BAND: &str = "oob";

/// Where the resource owner is sent once authorization completes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Callback {
	/// Redirect the user agent back to a registered client URI.
	Redirect(Url),
	/// The client cannot receive redirects; the verifier is shown to the owner instead.
	OutOfBand,
}
impl Callback {
	/// Parses a raw `oauth_callback` value.
	pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
		if raw == OUT_OF_BAND { Ok(Self::OutOfBand) } else { Url::parse(raw).map(Self::Redirect) }
	}

	/// Returns the redirect URL, if any.
	pub fn redirect_url(&self) -> Option<&Url> {
		match self {
			Self::Redirect(url) => Some(url),
			Self::OutOfBand => None,
		}
	}
}
impl Display for Callback {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Redirect(url) => f.write_str(url.as_str()),
			Self::OutOfBand => f.write_str(OUT_OF_BAND),
		}
	}
}
impl FromStr for Callback {
	type Err = url::ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl Serialize for Callback {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}
impl<'de> Deserialize<'de> for Callback {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Callback::parse(&raw).map_err(DeError::custom)
	}
}
