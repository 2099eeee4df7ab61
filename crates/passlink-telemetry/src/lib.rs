//! Passlink Telemetry - logging and request correlation.
//!
//! This crate provides:
//! - [`LogConfig`], deserializable from the `[logging]` config table
//! - Subscriber installation in pretty, compact, JSON or full format
//! - [`RequestContext`] spans for correlating one request's log lines
//!
//! # Example
//!
//! ```rust,no_run
//! use passlink_telemetry::{LogConfig, LogFormat, RequestContext, setup_logging};
//!
//! # fn main() -> Result<(), passlink_telemetry::TelemetryError> {
//! setup_logging(&LogConfig::new("debug").with_format(LogFormat::Compact))?;
//!
//! let ctx = RequestContext::new("/api/auth/access-token");
//! let _entered = ctx.span().entered();
//! tracing::info!("Redeeming share token");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::RequestContext;
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
