//! Realm sets used to scope tokens and gate protected resources.

// std
use std::{collections::BTreeSet, slice::Iter};
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Errors emitted when validating realms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RealmValidationError {
	/// Empty realm entries are not allowed.
	#[error("Realm entries cannot be empty.")]
	Empty,
	/// Realms cannot contain embedded whitespace characters.
	#[error("Realm contains whitespace: {realm}.")]
	ContainsWhitespace {
		/// The offending realm string.
		realm: String,
	},
}

/// Normalized, deduplicated set of realm names.
///
/// Realms travel on the wire as a single space-delimited string (the `realm` parameter of the
/// `Authorization: OAuth` header). Sorting keeps equality and the serialized form stable no matter
/// how the client ordered them.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RealmSet(Arc<[String]>);
impl RealmSet {
	/// Creates a normalized realm set from any iterator.
	pub fn new<I, S>(realms: I) -> Result<Self, RealmValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self(normalize(realms)?))
	}

	/// Number of distinct realms.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no realms are defined.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the set contains the provided realm.
	pub fn contains(&self, realm: &str) -> bool {
		self.0.binary_search_by(|candidate| candidate.as_str().cmp(realm)).is_ok()
	}

	/// Returns true when at least one realm appears in both sets.
	pub fn intersects(&self, other: &RealmSet) -> bool {
		self.iter().any(|realm| other.contains(realm))
	}

	/// Returns true when every realm of `self` also appears in `other`.
	pub fn is_subset(&self, other: &RealmSet) -> bool {
		self.iter().all(|realm| other.contains(realm))
	}

	/// Iterator over normalized realms.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|s| s.as_str())
	}

	/// Returns the normalized string representation (space-delimited).
	pub fn normalized(&self) -> String {
		self.0.join(" ")
	}
}
impl Debug for RealmSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("RealmSet").field(&self.0).finish()
	}
}
impl Display for RealmSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}

/// Iterator over realm strings.
pub struct RealmIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for RealmIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|s| s.as_str())
	}
}
impl<'a> IntoIterator for &'a RealmSet {
	type IntoIter = RealmIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		RealmIter { inner: self.0.iter() }
	}
}
impl FromStr for RealmSet {
	type Err = RealmValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(RealmValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}
impl Serialize for RealmSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.normalized())
	}
}
impl<'de> Deserialize<'de> for RealmSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		RealmSet::from_str(&raw).map_err(DeError::custom)
	}
}

fn normalize<I, S>(realms: I) -> Result<Arc<[String]>, RealmValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut set = BTreeSet::new();

	for realm in realms {
		let owned: String = realm.into();

		if owned.is_empty() {
			return Err(RealmValidationError::Empty);
		}
		if owned.chars().any(char::is_whitespace) {
			return Err(RealmValidationError::ContainsWhitespace { realm: owned });
		}

		set.insert(owned);
	}

	Ok(Arc::from(set.into_iter().collect::<Vec<_>>()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn realms_normalize_and_compare() {
		let lhs = RealmSet::new(["trolling", "secret", "secret"])
			.expect("Left-hand realm set should be valid.");
		let rhs = RealmSet::from_str("secret trolling").expect("Realm string should parse.");

		assert_eq!(lhs, rhs);
		assert_eq!(lhs.normalized(), "secret trolling");
		assert_eq!(lhs.iter().collect::<Vec<_>>(), vec!["secret", "trolling"]);
	}

	#[test]
	fn intersection_and_subset_checks() {
		let granted = RealmSet::from_str("secret").expect("Granted realm should parse.");
		let required = RealmSet::from_str("secret photos").expect("Required realms should parse.");
		let other = RealmSet::from_str("trolling").expect("Other realm should parse.");

		assert!(granted.intersects(&required));
		assert!(!granted.intersects(&other));
		assert!(granted.is_subset(&required));
		assert!(!required.is_subset(&granted));
		assert!(RealmSet::default().is_subset(&granted));
	}

	#[test]
	fn invalid_realms_error() {
		assert!(RealmSet::new([""]).is_err());
		assert!(matches!(
			RealmSet::new(["contains space"]),
			Err(RealmValidationError::ContainsWhitespace { .. })
		));
		assert!(RealmSet::from_str("").expect("Empty string is an empty set.").is_empty());
		assert!(RealmSet::from_str("   ").is_err());
	}

	#[test]
	fn serializes_as_space_delimited_string() {
		let realms = RealmSet::from_str("b a").expect("Realm string should parse.");
		let payload = serde_json::to_string(&realms).expect("Realm set should serialize.");

		assert_eq!(payload, "\"a b\"");

		let back: RealmSet = serde_json::from_str(&payload).expect("Realm set should deserialize.");

		assert_eq!(back, realms);
	}
}
