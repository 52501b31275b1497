//! Account abstraction (ERC-4337) smart account owner signing
//!
//! This crate contains the signing abstraction for smart account owner keys. Smart account
//! implementations verify user operation signatures in different ways, so one owner key is
//! exposed as a set of signing modes (raw hash, EIP-191 personal message, EIP-712 typed data)
//! that all produce the same 65-byte `r || s || v` encoding.

mod error;
mod key;
mod signer;

pub use error::SignerError;
pub use key::KeySigner;
pub use signer::{personal_digest, SmartAccountSigner};
