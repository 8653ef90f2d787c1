//! Solwin Engine - the embedded application's half of the frame protocol.
//!
//! [`EngineChannel`] owns the engine state, pins the parent origin on the
//! first inbound message, dispatches host commands and reports state and
//! interactions upward. When the document is not embedded the channel is
//! inert and every send is a no-op.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use solwin_core::{EngineWindow, Location, SolarEngineState};
//! use solwin_engine::{EngineChannel, EngineConfig};
//!
//! # async fn example(window: Arc<dyn EngineWindow>) -> Result<(), solwin_engine::EngineError> {
//! let channel = EngineChannel::new(window, EngineConfig::default());
//! channel.initialize()?;
//!
//! channel.update_state(
//!     SolarEngineState::new().with_location(Location::new(39.99, -105.26)),
//!     true,
//! );
//! channel.report_interaction("map-click", None);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod channel;
mod config;
mod error;

pub use channel::{EngineChannel, Readiness};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
