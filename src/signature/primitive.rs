//! Pluggable cryptographic primitives behind signature computation.

// crates.io
use hmac::{Hmac, Mac};
use rsa::{
	Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey,
	pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
	pkcs8::{DecodePrivateKey, DecodePublicKey},
};
use sha1::{Digest, Sha1};
use sha2::Sha256;
// self
use crate::{_prelude::*, signature::SignatureMethod};

/// Crypto collaborator invoked by the verifier and the client-side signer.
pub trait SignaturePrimitive
where
	Self: Send + Sync,
{
	/// Computes the raw signature bytes for shared-secret methods.
	///
	/// `key` is the already-joined `enc(client_secret)&enc(token_secret)` signing key.
	fn compute_signature(
		&self,
		method: SignatureMethod,
		base_string: &str,
		key: &[u8],
	) -> Result<Vec<u8>, SignatureError>;

	/// Checks an RSA signature against a PEM-encoded public key; any failure is `false`.
	fn verify_public_key(
		&self,
		method: SignatureMethod,
		base_string: &str,
		public_key_pem: &str,
		signature: &[u8],
	) -> bool;
}

/// Failures raised while computing signatures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SignatureError {
	/// The primitive cannot produce signatures for this method.
	#[error("Signature method {method} is not supported here.")]
	UnsupportedMethod {
		/// Offending method.
		method: SignatureMethod,
	},
	/// Key material is absent or unreadable.
	#[error("Invalid signing key: {message}.")]
	InvalidKey {
		/// Human-readable error payload.
		message: String,
	},
	/// The RSA backend failed.
	#[error("RSA failure: {message}.")]
	Rsa {
		/// Human-readable error payload.
		message: String,
	},
}

/// Default primitive backed by the RustCrypto `hmac`, `sha1`, `sha2` and `rsa` crates.
#[derive(Clone, Copy, Debug, Default)]
pub struct RustCryptoPrimitive;
impl RustCryptoPrimitive {
	/// Produces an RSA-SHA1 (PKCS#1 v1.5) signature with a PEM private key.
	///
	/// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`) encodings.
	pub fn sign_rsa_sha1(
		&self,
		private_key_pem: &str,
		base_string: &str,
	) -> Result<Vec<u8>, SignatureError> {
		let key = RsaPrivateKey::from_pkcs8_pem(private_key_pem)
			.or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_key_pem))
			.map_err(|e| SignatureError::InvalidKey { message: e.to_string() })?;
		let digest = Sha1::digest(base_string.as_bytes());

		key.sign(Pkcs1v15Sign::new::<Sha1>(), &digest)
			.map_err(|e| SignatureError::Rsa { message: e.to_string() })
	}

	fn parse_public_key(pem: &str) -> Option<RsaPublicKey> {
		RsaPublicKey::from_public_key_pem(pem).or_else(|_| RsaPublicKey::from_pkcs1_pem(pem)).ok()
	}

	fn hmac<M>(key: &[u8], base_string: &str) -> Result<Vec<u8>, SignatureError>
	where
		M: Mac + hmac::digest::KeyInit,
	{
		let mut mac = <M as Mac>::new_from_slice(key)
			.map_err(|e| SignatureError::InvalidKey { message: e.to_string() })?;

		mac.update(base_string.as_bytes());

		Ok(mac.finalize().into_bytes().to_vec())
	}
}
impl SignaturePrimitive for RustCryptoPrimitive {
	fn compute_signature(
		&self,
		method: SignatureMethod,
		base_string: &str,
		key: &[u8],
	) -> Result<Vec<u8>, SignatureError> {
		match method {
			SignatureMethod::HmacSha1 => Self::hmac::<Hmac<Sha1>>(key, base_string),
			SignatureMethod::HmacSha256 => Self::hmac::<Hmac<Sha256>>(key, base_string),
			SignatureMethod::Plaintext => Ok(key.to_vec()),
			SignatureMethod::RsaSha1 => Err(SignatureError::UnsupportedMethod { method }),
		}
	}

	fn verify_public_key(
		&self,
		method: SignatureMethod,
		base_string: &str,
		public_key_pem: &str,
		signature: &[u8],
	) -> bool {
		if method != SignatureMethod::RsaSha1 {
			return false;
		}

		let Some(key) = Self::parse_public_key(public_key_pem) else {
			return false;
		};
		let digest = Sha1::digest(base_string.as_bytes());

		key.verify(Pkcs1v15Sign::new::<Sha1>(), &digest, signature).is_ok()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use rand_core::OsRng;
	use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
	// self
	use super::*;

	#[test]
	fn plaintext_returns_key() {
		let signature = RustCryptoPrimitive
			.compute_signature(SignatureMethod::Plaintext, "ignored", b"a&b")
			.expect("PLAINTEXT should always compute.");

		assert_eq!(signature, b"a&b");
	}

	#[test]
	fn hmac_sha256_differs_from_sha1() {
		let sha1 = RustCryptoPrimitive
			.compute_signature(SignatureMethod::HmacSha1, "base", b"key&")
			.expect("HMAC-SHA1 should compute.");
		let sha256 = RustCryptoPrimitive
			.compute_signature(SignatureMethod::HmacSha256, "base", b"key&")
			.expect("HMAC-SHA256 should compute.");

		assert_eq!(sha1.len(), 20);
		assert_eq!(sha256.len(), 32);
	}

	#[test]
	fn rsa_round_trip_and_tamper() {
		let private =
			RsaPrivateKey::new(&mut OsRng, 1024).expect("RSA key generation should work.");
		let private_pem = private
			.to_pkcs8_pem(LineEnding::LF)
			.expect("Private key should encode to PEM.");
		let public_pem = private
			.to_public_key()
			.to_public_key_pem(LineEnding::LF)
			.expect("Public key should encode to PEM.");
		let signature = RustCryptoPrimitive
			.sign_rsa_sha1(&private_pem, "base string")
			.expect("RSA signing should succeed.");

		assert!(RustCryptoPrimitive.verify_public_key(
			SignatureMethod::RsaSha1,
			"base string",
			&public_pem,
			&signature
		));
		assert!(!RustCryptoPrimitive.verify_public_key(
			SignatureMethod::RsaSha1,
			"base strinG",
			&public_pem,
			&signature
		));
		assert!(!RustCryptoPrimitive.verify_public_key(
			SignatureMethod::RsaSha1,
			"base string",
			"not a key",
			&signature
		));
	}
}
