//! Prelude module - commonly used types for convenient import.
//!
//! Use `use solwin_core::prelude::*;` to import all essential types.

// Wire model
pub use crate::{
    Command, DashboardEnvelope, DashboardMessage, DashboardMessageType, EngineEnvelope,
    EngineMessage, EngineMessageType, InteractionPayload, ReadyPayload,
};

// State
pub use crate::{Location, SolarEngineState};

// Transport
pub use crate::{
    EngineWindow, EventTarget, Frame, FrameSpec, HostDocument, ListenerId, MessageEvent,
    MessageListener, TargetOrigin, WindowId,
};

// Errors
pub use crate::{ProtocolError, ProtocolResult, TransportError, TransportResult};
