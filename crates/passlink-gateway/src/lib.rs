//! Passlink Gateway - HTTP surface for share-link redemption.
//!
//! The gateway composes the lower crates into one redemption pipeline and
//! serves it over HTTP:
//!
//! ```text
//! POST /api/auth/access-token
//!   └── RedemptionService
//!       ├── ShareToken::decode        (passlink-capabilities)
//!       ├── ShareToken::signer_address (passlink-crypto)
//!       ├── ViewGate::try_admit       (passlink-capabilities)
//!       └── CredentialResolver        (passlink-credentials)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use passlink_gateway::{GatewayConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::load("passlink.toml")?;
//!     serve(&config).await?;
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod config;
mod error;
mod http;
mod redeem;
mod server;

pub use config::{GateSettings, GatewayConfig, ServerSettings, StoreBackend, StoreSettings};
pub use error::{GatewayError, GatewayResult};
pub use http::{AppState, build_router};
pub use redeem::{RedeemError, Redemption, RedemptionService, RedemptionStage};
pub use server::{build_state, run, serve, shutdown_signal, spawn_sweeper};
