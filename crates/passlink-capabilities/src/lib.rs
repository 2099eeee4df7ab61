//! Passlink Capabilities - signed, view-capped share tokens.
//!
//! This crate provides:
//! - [`SharePayload`], the claim a credential owner signs
//! - [`ShareToken`] with its URL-safe wire codec
//! - [`ViewGate`] admission control keyed by token nonce
//!
//! # Security Model
//!
//! A share token is:
//! - Created client-side and signed by the owning wallet
//! - Self-describing: the signer is recovered from the signature
//! - Usage-bounded by a per-nonce view counter on the server
//!
//! The claim is signed, not encrypted. Anyone holding the link can read it.
//!
//! # Example
//!
//! ```
//! use passlink_capabilities::ShareToken;
//! use passlink_crypto::{LocalSigner, Signer};
//!
//! let owner = LocalSigner::generate();
//! let token = ShareToken::issue("cred-1", 2, &owner).unwrap();
//!
//! let received = ShareToken::decode(&token.encode().unwrap()).unwrap();
//! assert_eq!(received.signer_address().unwrap(), owner.address());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod gate;
mod payload;
mod token;

pub use error::{CapabilityError, CapabilityResult};
pub use gate::{Admission, InMemoryViewGate, ViewGate};
pub use payload::{SHARE_ACTION, SharePayload};
pub use token::{MAX_TOKEN_LEN, ShareToken};
