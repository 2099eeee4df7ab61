//! Prelude module - commonly used types for convenient import.
//!
//! Use `use passlink_gateway::prelude::*;` to import all essential types.

// Configuration
pub use crate::{GatewayConfig, StoreBackend};

// Errors
pub use crate::{GatewayError, GatewayResult, RedeemError};

// Redemption
pub use crate::{Redemption, RedemptionService};

// Server
pub use crate::{AppState, build_router, build_state, serve};
