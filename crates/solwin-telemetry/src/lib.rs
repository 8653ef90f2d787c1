//! Solwin Telemetry - logging setup for Solar Window binaries.
//!
//! # Example
//!
//! ```rust,no_run
//! use solwin_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), solwin_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("solwin_engine=debug");
//! setup_logging(&config)?;
//!
//! tracing::info!("ready");
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

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
