//! Passlink Credentials - the credential store and ownership resolution.
//!
//! Credentials are issued elsewhere and indexed here. Redemption only ever
//! asks one question of this crate: does this address own a credential with
//! this id?

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod credential;
mod error;
mod resolver;
mod store;

pub use credential::Credential;
pub use error::{CredentialError, CredentialResult};
pub use resolver::CredentialResolver;
pub use store::{CredentialStore, InMemoryCredentialStore, JsonFileCredentialStore};
