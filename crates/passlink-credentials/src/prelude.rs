//! Prelude module - commonly used types for convenient import.
//!
//! Use `use passlink_credentials::prelude::*;` to import all essential types.

// Errors
pub use crate::{CredentialError, CredentialResult};

// Records
pub use crate::Credential;

// Stores and resolution
pub use crate::{
    CredentialResolver, CredentialStore, InMemoryCredentialStore, JsonFileCredentialStore,
};
