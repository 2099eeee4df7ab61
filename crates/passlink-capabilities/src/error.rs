//! Capability-related error types.

use passlink_crypto::CryptoError;
use thiserror::Error;

/// Errors that can occur with share tokens and view admission.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The token text is not valid base64 or not JSON.
    #[error("malformed share token: {0}")]
    Decode(String),

    /// The decoded token has the wrong shape or fails payload validation.
    #[error("invalid share payload: {0}")]
    InvalidPayload(String),

    /// The signature is malformed or no signer can be recovered from it.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The link's view budget is spent.
    #[error("view limit reached for nonce {nonce} (max {max_views})")]
    ViewLimitReached {
        /// The exhausted nonce.
        nonce: String,
        /// The cap the link was issued with.
        max_views: u32,
    },

    /// Storage error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Crypto error raised while signing.
    #[error("crypto error: {0}")]
    CryptoError(#[from] CryptoError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type for capability operations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;
