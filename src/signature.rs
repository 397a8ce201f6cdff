//! Signature base strings, methods, primitives, verification, and client-side signing.

pub mod base_string;
pub mod method;
pub mod primitive;
pub mod signer;
pub mod verifier;

pub use base_string::*;
pub use method::*;
pub use primitive::*;
pub use signer::*;
pub use verifier::*;
