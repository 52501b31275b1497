use thiserror::Error;

/// Signer error
#[derive(Debug, Error)]
pub enum SignerError {
    /// Key material is not a valid secp256k1 secret
    #[error("invalid key: {inner}")]
    InvalidKey {
        /// The inner error message
        inner: String,
    },

    /// ECDSA signing failed
    #[error("ecdsa error: {inner}")]
    Ecdsa {
        /// The inner error message
        inner: String,
    },

    /// EIP-712 digest could not be computed for the payload
    #[error("typed data error: {inner}")]
    TypedData {
        /// The inner error message
        inner: String,
    },
}
