//! In-memory signing backend holding a secp256k1 owner key

use crate::{
    error::SignerError,
    signer::{normalize_v, personal_digest, SmartAccountSigner},
};
use async_trait::async_trait;
use ethers::{
    prelude::{
        k256::{ecdsa::SigningKey, elliptic_curve::sec1::ToEncodedPoint, FieldBytes},
        rand,
    },
    signers::{coins_bip39::English, MnemonicBuilder},
    types::{transaction::eip712::Eip712, Address, Bytes, Signature, H256, U256},
    utils::{hex, keccak256},
};
use std::fmt;

/// Derivation path used for mnemonic-derived owner keys
const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Smart account owner backed by an in-memory secp256k1 key
///
/// The secret scalar is owned exclusively by this instance and is never serialized or logged.
/// Signing touches no mutable state, so one instance can be shared across tasks.
#[derive(Clone)]
pub struct KeySigner {
    /// Signing key of the owner
    key: SigningKey,
    /// EOA address derived from the key
    address: Address,
}

impl KeySigner {
    fn new(key: SigningKey) -> Self {
        let pubkey = public_key_bytes(&key);
        let address = Address::from_slice(&keccak256(&pubkey)[12..]);
        Self { key, address }
    }

    /// Creates a signer from a 32-byte secret scalar
    ///
    /// # Arguments
    /// * `bytes` - The secret scalar in big-endian form
    ///
    /// # Returns
    /// * `Self` - A new `KeySigner` instance
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let key = SigningKey::from_slice(bytes)
            .map_err(|err| SignerError::InvalidKey { inner: err.to_string() })?;
        Ok(Self::new(key))
    }

    /// Creates a signer from a hex-encoded secret scalar, with or without the `0x` prefix
    pub fn from_hex(src: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(src.trim_start_matches("0x"))
            .map_err(|err| SignerError::InvalidKey { inner: err.to_string() })?;
        Self::from_bytes(&bytes)
    }

    /// Creates a signer from the given mnemonic phrase
    ///
    /// # Arguments
    /// * `phrase` - The mnemonic phrase
    ///
    /// # Returns
    /// * `Self` - A new `KeySigner` instance for the first account of the phrase
    pub fn from_phrase(phrase: &str) -> Result<Self, SignerError> {
        let wallet = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .derivation_path(DEFAULT_DERIVATION_PATH)
            .map_err(|err| SignerError::InvalidKey { inner: err.to_string() })?
            .build()
            .map_err(|err| SignerError::InvalidKey { inner: err.to_string() })?;
        Ok(Self::new(wallet.signer().clone()))
    }

    /// Generates a signer with a fresh random key
    pub fn random() -> Self {
        Self::new(SigningKey::random(&mut rand::thread_rng()))
    }

    fn sign_digest(&self, digest: &H256) -> Result<Signature, SignerError> {
        let (sig, rec_id) = self
            .key
            .sign_prehash_recoverable(digest.as_bytes())
            .map_err(|err| SignerError::Ecdsa { inner: err.to_string() })?;
        let r_bytes: FieldBytes = sig.r().into();
        let s_bytes: FieldBytes = sig.s().into();
        Ok(Signature {
            r: U256::from_big_endian(r_bytes.as_slice()),
            s: U256::from_big_endian(s_bytes.as_slice()),
            v: normalize_v(u8::from(rec_id)),
        })
    }
}

#[async_trait]
impl SmartAccountSigner for KeySigner {
    fn address(&self) -> Address {
        self.address
    }

    fn public_key(&self) -> Bytes {
        public_key_bytes(&self.key).into()
    }

    async fn sign_hash(&self, hash: H256) -> Result<Signature, SignerError> {
        self.sign_digest(&hash)
    }

    async fn sign_personal_message(&self, hash: H256) -> Result<Signature, SignerError> {
        self.sign_digest(&personal_digest(&hash))
    }

    async fn sign_typed_data<T>(&self, payload: &T) -> Result<Signature, SignerError>
    where
        T: Eip712 + Send + Sync,
    {
        let digest = payload
            .encode_eip712()
            .map_err(|err| SignerError::TypedData { inner: err.to_string() })?;
        self.sign_digest(&H256::from(digest))
    }
}

impl fmt::Debug for KeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySigner").field("address", &self.address).finish_non_exhaustive()
    }
}

/// Uncompressed public key point without the SEC1 format marker (64 bytes)
fn public_key_bytes(key: &SigningKey) -> Vec<u8> {
    key.verifying_key().to_encoded_point(false).as_bytes()[1..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::RecoveryMessage;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const PHRASE: &str = "test test test test test test test test test test test junk";

    fn signer() -> KeySigner {
        KeySigner::from_hex(KEY).expect("valid key")
    }

    fn digest() -> H256 {
        let mut hash = [0u8; 32];
        hash[31] = 0x01;
        H256::from(hash)
    }

    #[test]
    fn derives_known_address() {
        assert_eq!(signer().address(), ADDRESS.parse().unwrap());
    }

    #[test]
    fn phrase_derivation_matches_first_account() {
        let signer = KeySigner::from_phrase(PHRASE).unwrap();
        assert_eq!(signer.address(), ADDRESS.parse().unwrap());
    }

    #[test]
    fn public_key_is_deterministic() {
        let signer = signer();
        let pubkey = signer.public_key();
        assert_eq!(pubkey.len(), 64);
        assert_eq!(pubkey, signer.public_key());
        assert_eq!(Address::from_slice(&keccak256(&pubkey)[12..]), signer.address());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(KeySigner::from_bytes(&[1u8; 31]).is_err());
        // the zero scalar is outside the valid secp256k1 range
        assert!(KeySigner::from_bytes(&[0u8; 32]).is_err());
        assert!(KeySigner::from_hex("0xnothex").is_err());
        assert!(KeySigner::from_phrase("not a valid phrase").is_err());
    }

    #[tokio::test]
    async fn raw_hash_signature_recovers_owner() {
        let signer = signer();
        let hash = digest();

        let sig = signer.sign_hash(hash).await.unwrap();
        let bytes = sig.to_vec();

        assert_eq!(bytes.len(), 65);
        assert!(bytes[64] == 27 || bytes[64] == 28);
        assert_eq!(sig.recover(RecoveryMessage::Hash(hash)).unwrap(), signer.address());
    }

    #[tokio::test]
    async fn personal_message_framing_is_observable() {
        let signer = signer();
        let hash = digest();

        let raw = signer.sign_hash(hash).await.unwrap();
        let personal = signer.sign_personal_message(hash).await.unwrap();

        assert_ne!(raw, personal);
        assert_eq!(
            personal.recover(RecoveryMessage::Hash(personal_digest(&hash))).unwrap(),
            signer.address()
        );
    }

    #[tokio::test]
    async fn typed_data_signature_recovers_owner() {
        let payload: ethers::types::transaction::eip712::TypedData =
            serde_json::from_value(serde_json::json!({
                "types": {
                    "EIP712Domain": [
                        {"name": "name", "type": "string"},
                        {"name": "version", "type": "string"},
                        {"name": "chainId", "type": "uint256"},
                        {"name": "verifyingContract", "type": "address"}
                    ],
                    "Person": [
                        {"name": "name", "type": "string"},
                        {"name": "wallet", "type": "address"}
                    ],
                    "Mail": [
                        {"name": "from", "type": "Person"},
                        {"name": "to", "type": "Person"},
                        {"name": "contents", "type": "string"}
                    ]
                },
                "primaryType": "Mail",
                "domain": {
                    "name": "Ether Mail",
                    "version": "1",
                    "chainId": 1,
                    "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
                },
                "message": {
                    "from": {
                        "name": "Cow",
                        "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"
                    },
                    "to": {
                        "name": "Bob",
                        "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"
                    },
                    "contents": "Hello, Bob!"
                }
            }))
            .unwrap();

        let signer = signer();
        let sig = signer.sign_typed_data(&payload).await.unwrap();
        let digest = H256::from(payload.encode_eip712().unwrap());

        assert_eq!(sig.recover(RecoveryMessage::Hash(digest)).unwrap(), signer.address());
    }

    #[tokio::test]
    async fn random_signers_do_not_collide() {
        let a = KeySigner::random();
        let b = KeySigner::random();
        assert_ne!(a.address(), b.address());

        let sig = a.sign_hash(digest()).await.unwrap();
        assert_eq!(sig.recover(RecoveryMessage::Hash(digest())).unwrap(), a.address());
    }
}
