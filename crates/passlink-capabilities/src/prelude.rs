//! Prelude module - commonly used types for convenient import.
//!
//! Use `use passlink_capabilities::prelude::*;` to import all essential types.

// Errors
pub use crate::{CapabilityError, CapabilityResult};

// Token types
pub use crate::{MAX_TOKEN_LEN, SHARE_ACTION, SharePayload, ShareToken};

// Admission
pub use crate::{Admission, InMemoryViewGate, ViewGate};
