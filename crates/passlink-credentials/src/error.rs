//! Credential store error types.

use thiserror::Error;

/// Errors from the credential store and resolver.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No credential with that id is owned by the address.
    ///
    /// Deliberately the same whether the id is unknown, the address owns
    /// nothing, or the credential belongs to someone else.
    #[error("credential not found: {credential_id}")]
    NotFound {
        /// The requested credential id.
        credential_id: String,
    },

    /// A credential offered for insertion is missing required fields.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// Storage error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;
