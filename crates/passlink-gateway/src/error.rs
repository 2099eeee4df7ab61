//! Gateway startup errors.
//!
//! Redemption failures are [`RedeemError`](crate::RedeemError); these cover
//! everything that stops the gateway from running at all.

use std::net::SocketAddr;

use thiserror::Error;

/// Gateway error type.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A setting is missing or out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The listener could not bind.
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Reading the config file or serving failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`GatewayConfig`](crate::GatewayConfig).
    #[error("malformed config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
