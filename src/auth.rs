//! Provider-domain identifiers, realm sets, clients, nonces, and token models.

pub mod callback;
pub mod client;
pub mod id;
pub mod nonce;
pub mod realm;
pub mod token;

pub use callback::*;
pub use client::*;
pub use id::*;
pub use nonce::*;
pub use realm::*;
pub use token::{record::*, secret::*};
