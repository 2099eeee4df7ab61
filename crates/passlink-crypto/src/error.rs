//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// Invalid signature length.
    #[error("invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// Invalid address length.
    #[error("invalid address length: expected {expected}, got {actual}")]
    InvalidAddressLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// The `r` or `s` scalar is zero, not below the curve order, or high-s.
    #[error("signature scalars out of range")]
    ScalarOutOfRange,

    /// The `v` byte is not a valid recovery id.
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// Public key recovery failed.
    #[error("public key recovery failed")]
    RecoveryFailed,

    /// Refusing to recover a signer over an empty message.
    #[error("cannot recover a signer from an empty message")]
    EmptyMessage,

    /// Invalid secret key material.
    #[error("invalid secret key")]
    InvalidSecretKey,

    /// Signing failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Invalid hex encoding.
    #[error("invalid hex encoding")]
    InvalidHexEncoding,

    /// I/O error (e.g. reading/writing key files).
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
