//! Parameter collection: turns a raw request into the normalized OAuth parameter set.
//!
//! Parameters are gathered from the query string, a form-encoded body (only when the
//! `Content-Type` says so), and the `Authorization: OAuth` header. `realm` is lifted out of the
//! signed set wherever it appears.

pub mod header;

pub use header::parse_authorization_header;

// self
use crate::{
	_prelude::*,
	auth::{ClientKey, RealmSet, TokenKey},
	error::MalformedRequestError,
	http::IncomingRequest,
};

/// The only `oauth_version` the provider speaks.
pub const OAUTH_VERSION: &str = "1.0";

/// Verified-shape OAuth parameters extracted from a request.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthParams {
	/// `oauth_consumer_key`.
	pub client_key: ClientKey,
	/// `oauth_token`, if presented.
	pub token: Option<TokenKey>,
	/// `oauth_nonce`.
	pub nonce: String,
	/// `oauth_timestamp` in unix seconds.
	pub timestamp: u64,
	/// `oauth_signature`, decoded.
	pub signature: String,
	/// `oauth_signature_method`, as sent.
	pub signature_method: String,
	/// `oauth_verifier`, if presented.
	pub verifier: Option<String>,
	/// `oauth_callback`, if presented.
	pub callback: Option<String>,
	/// Requested realm, from the header or the query/body.
	pub realm: Option<RealmSet>,
	/// `oauth_version`, if presented.
	pub version: Option<String>,
	/// Every pair that takes part in the signature base string.
	pub signed: Vec<(String, String)>,
}
impl OAuthParams {
	/// First signed value under `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.signed.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}
}
impl Debug for OAuthParams {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthParams")
			.field("client_key", &self.client_key)
			.field("token", &self.token)
			.field("nonce", &self.nonce)
			.field("timestamp", &self.timestamp)
			.field("signature_method", &self.signature_method)
			.field("verifier", &self.verifier.as_ref().map(|_| "<redacted>"))
			.field("callback", &self.callback)
			.field("realm", &self.realm)
			.field("version", &self.version)
			.finish_non_exhaustive()
	}
}

/// Extracts and shape-checks the protocol parameters of `request`.
pub fn collect_parameters(request: &IncomingRequest) -> Result<OAuthParams, MalformedRequestError> {
	let mut signed = request.url.query_pairs().into_owned().collect::<Vec<_>>();

	signed.extend(request.form_pairs());

	// Query and body realms stay signed; only the header realm is excluded.
	let mut realms =
		signed
			.iter()
			.filter(|(name, _)| name == "realm")
			.map(|(_, v)| v.clone())
			.collect::<Vec<_>>();

	if let Some(header) = request.header("Authorization") {
		let (header_realm, header_params): (Vec<_>, Vec<_>) = parse_authorization_header(header)?
			.unwrap_or_default()
			.into_iter()
			.partition(|(name, _)| name == "realm");

		realms.extend(header_realm.into_iter().map(|(_, v)| v));
		signed.extend(header_params);
	}

	let realm = match realms.as_slice() {
		[] => None,
		[raw] => parse_realm(raw)?,
		_ => return Err(MalformedRequestError::DuplicateParameter { name: "realm".into() }),
	};

	reject_duplicates(&signed)?;

	let lookup = |name: &str| signed.iter().find(|(key, _)| key == name).map(|(_, v)| v.clone());
	let required = |name: &'static str| {
		lookup(name)
			.filter(|value| !value.is_empty())
			.ok_or(MalformedRequestError::MissingParameter { name })
	};
	let client_key = ClientKey::new(required("oauth_consumer_key")?).map_err(|_| {
		MalformedRequestError::InvalidParameter {
			name: "oauth_consumer_key",
			reason: "not a valid identifier",
		}
	})?;
	let nonce = required("oauth_nonce")?;
	let timestamp = parse_timestamp(&required("oauth_timestamp")?)?;
	let signature = required("oauth_signature")?;
	let signature_method = required("oauth_signature_method")?;
	let token = lookup("oauth_token")
		.map(|raw| {
			TokenKey::new(raw).map_err(|_| MalformedRequestError::InvalidParameter {
				name: "oauth_token",
				reason: "not a valid identifier",
			})
		})
		.transpose()?;
	let version = lookup("oauth_version");

	if let Some(version) = version.as_deref().filter(|v| *v != OAUTH_VERSION) {
		return Err(MalformedRequestError::UnsupportedVersion { version: version.to_owned() });
	}

	Ok(OAuthParams {
		client_key,
		token,
		nonce,
		timestamp,
		signature,
		signature_method,
		verifier: lookup("oauth_verifier"),
		callback: lookup("oauth_callback"),
		realm,
		version,
		signed,
	})
}

fn reject_duplicates(pairs: &[(String, String)]) -> Result<(), MalformedRequestError> {
	let mut seen = BTreeMap::new();

	for (name, _) in pairs.iter().filter(|(name, _)| name.starts_with("oauth_")) {
		if seen.insert(name.as_str(), ()).is_some() {
			return Err(MalformedRequestError::DuplicateParameter { name: name.clone() });
		}
	}

	Ok(())
}

fn parse_realm(raw: &str) -> Result<Option<RealmSet>, MalformedRequestError> {
	let realm = RealmSet::from_str(raw).map_err(|_| MalformedRequestError::InvalidParameter {
		name: "realm",
		reason: "not a space-delimited realm list",
	})?;

	Ok((!realm.is_empty()).then_some(realm))
}

fn parse_timestamp(raw: &str) -> Result<u64, MalformedRequestError> {
	let invalid = MalformedRequestError::InvalidParameter {
		name: "oauth_timestamp",
		reason: "must be a positive integer",
	};

	if !raw.bytes().all(|b| b.is_ascii_digit()) {
		return Err(invalid);
	}

	raw.parse().map_err(|_| invalid)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request(url: &str) -> IncomingRequest {
		IncomingRequest::new("POST", Url::parse(url).expect("URL fixture should parse."))
	}

	const HEADER: &str = "OAuth realm=\"Example\", oauth_consumer_key=\"9djdj82h48djs9d2\", \
	                      oauth_token=\"kkk9d7dh3k39sjv7\", oauth_signature_method=\"HMAC-SHA1\", \
	                      oauth_timestamp=\"137131201\", oauth_nonce=\"7d8f3e4a\", \
	                      oauth_signature=\"bYT5CMsGcbgUdFHObYMEfcx6bsw%3D\"";

	#[test]
	fn collects_from_all_sources() {
		let request = request("http://example.com/request?b5=%3D%253D&a3=a&c%40=&a2=r%20b")
			.with_header("Authorization", HEADER)
			.with_header("Content-Type", "application/x-www-form-urlencoded")
			.with_body("c2&a3=2+q");
		let params = collect_parameters(&request).expect("RFC example should parse.");

		assert_eq!(params.client_key.as_ref(), "9djdj82h48djs9d2");
		assert_eq!(params.token.as_deref(), Some("kkk9d7dh3k39sjv7"));
		assert_eq!(params.timestamp, 137_131_201);
		assert_eq!(params.signature, "bYT5CMsGcbgUdFHObYMEfcx6bsw=");
		assert_eq!(params.realm.as_ref().map(ToString::to_string).as_deref(), Some("Example"));
		assert!(params.signed.iter().all(|(name, _)| name != "realm"));
		assert!(params.signed.contains(&("a3".into(), "2 q".into())));
		assert!(params.signed.contains(&("c2".into(), String::new())));
	}

	#[test]
	fn query_realm_is_requested_and_signed() {
		let request = request(
			"https://example.com/request_token?realm=photos&oauth_consumer_key=ck&oauth_nonce=n&\
			 oauth_signature=s&oauth_signature_method=PLAINTEXT&oauth_timestamp=5",
		);
		let params = collect_parameters(&request).expect("Query realm should parse.");

		assert_eq!(params.realm.as_ref().map(ToString::to_string).as_deref(), Some("photos"));
		assert!(params.signed.contains(&("realm".into(), "photos".into())));
	}

	#[test]
	fn body_is_ignored_without_form_content_type() {
		let request = request("http://example.com/request")
			.with_header("Authorization", HEADER)
			.with_body("c2&a3=2+q");
		let params = collect_parameters(&request).expect("Header parameters should parse.");

		assert!(params.get("c2").is_none());
	}

	#[test]
	fn missing_and_duplicate_parameters_are_malformed() {
		let missing = request("https://example.com/?oauth_consumer_key=ck&oauth_nonce=n");

		assert_eq!(
			collect_parameters(&missing),
			Err(MalformedRequestError::MissingParameter { name: "oauth_timestamp" })
		);

		let duplicate = request("https://example.com/?oauth_nonce=other")
			.with_header("Authorization", HEADER);

		assert_eq!(
			collect_parameters(&duplicate),
			Err(MalformedRequestError::DuplicateParameter { name: "oauth_nonce".into() })
		);

		let duplicate_realm = request("https://example.com/?realm=other")
			.with_header("Authorization", HEADER);

		assert!(matches!(
			collect_parameters(&duplicate_realm),
			Err(MalformedRequestError::DuplicateParameter { .. })
		));
	}

	#[test]
	fn rejects_bad_timestamp_and_version() {
		let base = "https://example.com/?oauth_consumer_key=ck&oauth_nonce=n&oauth_signature=s&\
		            oauth_signature_method=PLAINTEXT";

		assert!(matches!(
			collect_parameters(&request(&format!("{base}&oauth_timestamp=-5"))),
			Err(MalformedRequestError::InvalidParameter { name: "oauth_timestamp", .. })
		));
		assert!(matches!(
			collect_parameters(&request(&format!("{base}&oauth_timestamp=5&oauth_version=2.0"))),
			Err(MalformedRequestError::UnsupportedVersion { .. })
		));
		assert!(
			collect_parameters(&request(&format!("{base}&oauth_timestamp=5&oauth_version=1.0")))
				.is_ok()
		);
	}
}
