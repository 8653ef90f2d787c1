//! Solwin Core - shared protocol model for the Solar Window frame bridge.
//!
//! The Solar Window engine runs inside an isolated frame and talks to the
//! dashboard that hosts it through the browser's cross-document message
//! primitive. This crate holds everything both ends agree on:
//!
//! - The closed wire model: [`DashboardEnvelope`] (host to engine) and
//!   [`EngineEnvelope`] (engine to host), validated once at each inbound
//!   boundary.
//! - [`SolarEngineState`], the engine's single piece of shared state, and
//!   its shallow merge.
//! - [`TargetOrigin`], the wildcard-or-exact delivery target.
//! - Transport traits ([`EngineWindow`], [`HostDocument`], [`Frame`]) that
//!   abstract the message primitive so both endpoints run without a browser.
//!
//! # Example
//!
//! ```rust
//! use solwin_core::{Command, DashboardEnvelope, DashboardMessage};
//!
//! let raw = serde_json::json!({ "type": "COMMAND", "payload": "REFRESH" });
//! let envelope = DashboardEnvelope::from_value(&raw).unwrap();
//! assert_eq!(envelope.message, DashboardMessage::Command(Command::Refresh));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod message;
mod origin;
mod state;
mod transport;

pub use error::{ProtocolError, ProtocolResult, TransportError, TransportResult};
pub use message::{
    Command, DashboardEnvelope, DashboardMessage, DashboardMessageType, EngineEnvelope,
    EngineMessage, EngineMessageType, InteractionPayload, ReadyPayload, now_millis,
};
pub use origin::TargetOrigin;
pub use state::{Location, SolarEngineState};
pub use transport::{
    EngineWindow, EventTarget, Frame, FrameSpec, HostDocument, ListenerId, MessageEvent,
    MessageListener, WindowId,
};

/// Version string announced in `ENGINE_READY`.
pub const ENGINE_VERSION: &str = "1.0.0";

/// Capabilities announced in `ENGINE_READY`.
pub const ENGINE_CAPABILITIES: [&str; 2] = ["solar-analysis", "map-interaction"];

/// Delay between engine initialization and the readiness announcement, in
/// milliseconds.
///
/// This is a heuristic for letting the host install its listener first. It
/// is not a synchronization guarantee: a host that posts before the engine
/// listener exists loses that message.
pub const READY_DELAY_MS: u64 = 1000;
