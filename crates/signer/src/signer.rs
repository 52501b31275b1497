//! Signing capability set shared by all smart account owner backends

use crate::SignerError;
use async_trait::async_trait;
use ethers::{
    types::{transaction::eip712::Eip712, Address, Bytes, Signature, H256},
    utils::keccak256,
};

/// Prefix of the EIP-191 personal message framing
const ETH_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// A trait for backends that own a smart account owner key
///
/// Smart account implementations differ in the signature encoding their on-chain verification
/// logic expects, so the owner key is exposed as three signing modes over the same key. Any
/// backend (in-memory key, hardware key, remote signer) implements the same byte contract and is
/// selected via dependency injection: every mode returns the 65-byte `r || s || v` encoding with
/// `v` normalized into {27, 28}.
#[async_trait]
pub trait SmartAccountSigner: Send + Sync {
    /// Address of the owner EOA.
    fn address(&self) -> Address;

    /// Uncompressed public key of the owner with the SEC1 format marker stripped (64 bytes).
    ///
    /// Account factories that derive the counterfactual account address from the public key
    /// instead of the owner address need the raw point bytes. Repeated calls return identical
    /// bytes.
    fn public_key(&self) -> Bytes;

    /// Signs the 32-byte hash directly, without any framing.
    ///
    /// Used by account implementations that verify against the raw hash.
    ///
    /// # Arguments
    /// * `hash` - The 32-byte hash to sign
    ///
    /// # Returns
    /// * `Signature` - The signature with `v` in {27, 28}
    async fn sign_hash(&self, hash: H256) -> Result<Signature, SignerError>;

    /// Signs the hash with the EIP-191 personal message framing applied first.
    ///
    /// Used by account implementations that verify signatures with `ecrecover` over the
    /// prefixed hash.
    ///
    /// # Arguments
    /// * `hash` - The 32-byte hash to frame and sign
    ///
    /// # Returns
    /// * `Signature` - The signature with `v` in {27, 28}
    async fn sign_personal_message(&self, hash: H256) -> Result<Signature, SignerError>;

    /// Signs the EIP-712 digest of the payload, with no personal message prefix on top.
    ///
    /// # Arguments
    /// * `payload` - The typed data to digest and sign
    ///
    /// # Returns
    /// * `Signature` - The signature with `v` in {27, 28}
    async fn sign_typed_data<T>(&self, payload: &T) -> Result<Signature, SignerError>
    where
        T: Eip712 + Send + Sync;
}

/// Applies the EIP-191 personal message framing to a 32-byte hash
///
/// The framed bytes are `"\x19Ethereum Signed Message:\n" + decimal length + hash`, hashed with
/// Keccak-256.
pub fn personal_digest(hash: &H256) -> H256 {
    let mut framed = format!("{ETH_MESSAGE_PREFIX}{}", hash.as_bytes().len()).into_bytes();
    framed.extend_from_slice(hash.as_bytes());
    keccak256(framed).into()
}

/// Normalizes a raw ECDSA recovery id into an Ethereum `v` value
///
/// Values below 27 are shifted into {27, 28}; anything already at or above 27 is passed through
/// untouched.
pub(crate) fn normalize_v(v: u8) -> u64 {
    let v = u64::from(v);
    if v < 27 {
        v + 27
    } else {
        v
    }
}
