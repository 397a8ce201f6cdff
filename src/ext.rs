//! Client-side extension contracts.
//!
//! [`RequestSignerExt`] lets a [`RequestSigner`](crate::signature::RequestSigner) sign requests
//! built by an HTTP client. The `reqwest` feature ships the implementation for
//! `reqwest::Request`.

pub mod request_signer;

pub use request_signer::*;
