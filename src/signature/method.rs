//! Signature method identifiers carried in `oauth_signature_method`.

// self
use crate::_prelude::*;

/// Supported `oauth_signature_method` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignatureMethod {
	/// `HMAC-SHA1` (RFC 5849 §3.4.2).
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// `HMAC-SHA256`; not part of RFC 5849 and disabled unless configured.
	#[serde(rename = "HMAC-SHA256")]
	HmacSha256,
	/// `RSA-SHA1` (RFC 5849 §3.4.3).
	#[serde(rename = "RSA-SHA1")]
	RsaSha1,
	/// `PLAINTEXT` (RFC 5849 §3.4.4).
	#[serde(rename = "PLAINTEXT")]
	Plaintext,
}
impl SignatureMethod {
	/// Methods enabled when nothing else is configured.
	pub const DEFAULTS: [Self; 3] = [Self::HmacSha1, Self::RsaSha1, Self::Plaintext];

	/// Wire name of the method.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::HmacSha1 => "HMAC-SHA1",
			Self::HmacSha256 => "HMAC-SHA256",
			Self::RsaSha1 => "RSA-SHA1",
			Self::Plaintext => "PLAINTEXT",
		}
	}

	/// Returns true when the method verifies against the client's public key.
	pub const fn uses_public_key(self) -> bool {
		matches!(self, Self::RsaSha1)
	}
}
impl Display for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for SignatureMethod {
	type Err = UnsupportedSignatureMethod;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"HMAC-SHA1" => Ok(Self::HmacSha1),
			"HMAC-SHA256" => Ok(Self::HmacSha256),
			"RSA-SHA1" => Ok(Self::RsaSha1),
			"PLAINTEXT" => Ok(Self::Plaintext),
			other => Err(UnsupportedSignatureMethod(other.to_owned())),
		}
	}
}

/// Raised when `oauth_signature_method` names an unknown method.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unsupported signature method {0}.")]
pub struct UnsupportedSignatureMethod(pub String);

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn wire_names_are_case_sensitive() {
		assert_eq!(SignatureMethod::from_str("HMAC-SHA1"), Ok(SignatureMethod::HmacSha1));
		assert_eq!(SignatureMethod::from_str("RSA-SHA1"), Ok(SignatureMethod::RsaSha1));
		assert!(SignatureMethod::from_str("hmac-sha1").is_err());
		assert!(SignatureMethod::from_str("HMAC-MD5").is_err());
	}

	#[test]
	fn serde_uses_wire_names() {
		let payload = serde_json::to_string(&SignatureMethod::DEFAULTS)
			.expect("Signature methods should serialize.");

		assert_eq!(payload, r#"["HMAC-SHA1","RSA-SHA1","PLAINTEXT"]"#);
	}
}
