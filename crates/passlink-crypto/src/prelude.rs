//! Prelude module - commonly used types for convenient import.
//!
//! Use `use passlink_crypto::prelude::*;` to import all essential types.

// Errors
pub use crate::{CryptoError, CryptoResult};

// Identity
pub use crate::Address;

// Signatures
pub use crate::{RecoverableSignature, SIGNATURE_LENGTH};

// Signing and recovery
pub use crate::{LocalSigner, Signer, hash_message, recover_address};
