//! Passlink Crypto - signer recovery for wallet-signed share links.
//!
//! This crate provides:
//! - 20-byte account addresses with EIP-55 checksum rendering
//! - 65-byte recoverable secp256k1 signatures (`r || s || v`)
//! - Personal-message hashing and signer recovery
//! - A [`Signer`] abstraction with an in-process [`LocalSigner`]
//!
//! # Verification Model
//!
//! The server never holds key material. A link is trusted because the
//! address recovered from its signature owns the credential it names, not
//! because the link claims an owner.
//!
//! # Example
//!
//! ```
//! use passlink_crypto::{LocalSigner, Signer, recover_address};
//!
//! let signer = LocalSigner::generate();
//! let message = b"share this credential";
//! let signature = signer.sign_message(message).unwrap();
//!
//! assert_eq!(recover_address(message, &signature).unwrap(), signer.address());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod address;
mod error;
mod recover;
mod signature;
mod signer;

pub use address::Address;
pub use error::{CryptoError, CryptoResult};
pub use recover::{hash_message, recover_address};
pub use signature::{RecoverableSignature, SIGNATURE_LENGTH};
pub use signer::{LocalSigner, Signer};
