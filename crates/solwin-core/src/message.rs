//! Wire envelopes for both directions of the frame protocol.
//!
//! Every envelope is a JSON object with a `type` discriminator and a
//! `payload`. Engine envelopes also carry a producer `timestamp`; host
//! envelopes may carry an opaque `auth` token that is passed through and
//! never interpreted.
//!
//! There is no request identifier: a `STATE_UPDATE` can only be matched to
//! the `STATE_REQUEST` that caused it by type. Two overlapping requests
//! cannot be told apart.

use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};
use crate::state::SolarEngineState;

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Loosely typed envelope as it crosses the boundary.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    timestamp: Value,
    #[serde(default)]
    auth: Value,
}

impl RawEnvelope {
    fn parse(value: &Value) -> ProtocolResult<Self> {
        Self::deserialize(value).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn number_to_millis(number: &serde_json::Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

fn payload_as<T>(message_type: &'static str, payload: &Value) -> ProtocolResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    T::deserialize(payload).map_err(|e| ProtocolError::PayloadMismatch {
        message_type,
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Host -> engine
// ---------------------------------------------------------------------------

/// A command the host asks the engine to perform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Bootstrap request. The engine bootstraps at load time, so this is a no-op.
    Initialize,
    /// Reload the engine document.
    Refresh,
    /// A command name this engine does not know. Kept so it can be logged.
    Unknown(String),
}

impl Command {
    /// Map a wire name to a command.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "INITIALIZE" => Self::Initialize,
            "REFRESH" => Self::Refresh,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Wire name of the command.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Initialize => "INITIALIZE",
            Self::Refresh => "REFRESH",
            Self::Unknown(name) => name,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discriminator of host-to-engine messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardMessageType {
    /// `COMMAND`
    Command,
    /// `STATE_REQUEST`
    StateRequest,
}

impl DashboardMessageType {
    /// Wire form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "COMMAND",
            Self::StateRequest => "STATE_REQUEST",
        }
    }
}

impl fmt::Display for DashboardMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-to-engine message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardMessage {
    /// Run a command.
    Command(Command),
    /// Ask for a `STATE_UPDATE` carrying the current state.
    StateRequest,
}

impl DashboardMessage {
    /// Discriminator of this message.
    #[must_use]
    pub fn message_type(&self) -> DashboardMessageType {
        match self {
            Self::Command(_) => DashboardMessageType::Command,
            Self::StateRequest => DashboardMessageType::StateRequest,
        }
    }
}

/// Host-to-engine envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardEnvelope {
    /// The typed message.
    pub message: DashboardMessage,
    /// Opaque pass-through token.
    pub auth: Option<String>,
}

impl DashboardEnvelope {
    /// Wrap a message without an auth token.
    #[must_use]
    pub fn new(message: DashboardMessage) -> Self {
        Self {
            message,
            auth: None,
        }
    }

    /// Attach an opaque auth token.
    #[must_use]
    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    /// Validate an inbound envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownType`] for discriminators other than
    /// `COMMAND` and `STATE_REQUEST`, and [`ProtocolError::PayloadMismatch`]
    /// when a `COMMAND` payload is not a string. The `auth` and `timestamp`
    /// fields never fail validation: a non-string token is discarded and any
    /// timestamp is ignored.
    pub fn from_value(value: &Value) -> ProtocolResult<Self> {
        let raw = RawEnvelope::parse(value)?;
        let message = match raw.kind.as_str() {
            "COMMAND" => {
                let name: String =
                    payload_as(DashboardMessageType::Command.as_str(), &raw.payload)?;
                DashboardMessage::Command(Command::from_name(&name))
            },
            "STATE_REQUEST" => DashboardMessage::StateRequest,
            other => return Err(ProtocolError::UnknownType(other.to_owned())),
        };

        // A token that is not a string is dropped rather than failing the message.
        let auth = match raw.auth {
            Value::String(token) => Some(token),
            _ => None,
        };

        Ok(Self { message, auth })
    }

    /// Wire form of the envelope. Host envelopes carry no timestamp.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let payload = match &self.message {
            DashboardMessage::Command(command) => Value::String(command.name().to_owned()),
            DashboardMessage::StateRequest => Value::Null,
        };

        let mut object = serde_json::Map::new();
        object.insert(
            "type".to_owned(),
            Value::String(self.message.message_type().as_str().to_owned()),
        );
        object.insert("payload".to_owned(), payload);
        if let Some(auth) = &self.auth {
            object.insert("auth".to_owned(), Value::String(auth.clone()));
        }
        Value::Object(object)
    }
}

impl From<DashboardMessage> for DashboardEnvelope {
    fn from(message: DashboardMessage) -> Self {
        Self::new(message)
    }
}

impl Serialize for DashboardEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DashboardEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Engine -> host
// ---------------------------------------------------------------------------

/// Payload of `ENGINE_READY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyPayload {
    /// Engine version.
    pub version: String,
    /// Capability names.
    pub capabilities: Vec<String>,
}

impl ReadyPayload {
    /// Build a readiness payload.
    #[must_use]
    pub fn new(version: impl Into<String>, capabilities: Vec<String>) -> Self {
        Self {
            version: version.into(),
            capabilities,
        }
    }
}

/// Payload of `INTERACTION`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionPayload {
    /// What the user did.
    pub action: String,
    /// Free-form detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// When it happened, ms since epoch.
    pub timestamp: i64,
}

impl InteractionPayload {
    /// Build an interaction stamped with the current time.
    #[must_use]
    pub fn now(action: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            action: action.into(),
            data,
            timestamp: now_millis(),
        }
    }
}

/// Discriminator of engine-to-host messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineMessageType {
    /// `ENGINE_READY`
    EngineReady,
    /// `STATE_UPDATE`
    StateUpdate,
    /// `INTERACTION`
    Interaction,
}

impl EngineMessageType {
    /// Wire form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EngineReady => "ENGINE_READY",
            Self::StateUpdate => "STATE_UPDATE",
            Self::Interaction => "INTERACTION",
        }
    }

    /// Parse a wire discriminator.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ENGINE_READY" => Some(Self::EngineReady),
            "STATE_UPDATE" => Some(Self::StateUpdate),
            "INTERACTION" => Some(Self::Interaction),
            _ => None,
        }
    }
}

impl fmt::Display for EngineMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine-to-host message.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// The engine finished booting.
    EngineReady(ReadyPayload),
    /// Full state snapshot.
    StateUpdate(SolarEngineState),
    /// Something the user did inside the engine.
    Interaction(InteractionPayload),
}

impl EngineMessage {
    /// Discriminator of this message.
    #[must_use]
    pub fn message_type(&self) -> EngineMessageType {
        match self {
            Self::EngineReady(_) => EngineMessageType::EngineReady,
            Self::StateUpdate(_) => EngineMessageType::StateUpdate,
            Self::Interaction(_) => EngineMessageType::Interaction,
        }
    }
}

/// Engine-to-host envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineEnvelope {
    /// The typed message.
    pub message: EngineMessage,
    /// Producer time, ms since epoch. Advisory only.
    pub timestamp: i64,
}

impl EngineEnvelope {
    /// Wrap a message stamped with the current time.
    #[must_use]
    pub fn now(message: EngineMessage) -> Self {
        Self {
            message,
            timestamp: now_millis(),
        }
    }

    /// Discriminator of the wrapped message.
    #[must_use]
    pub fn message_type(&self) -> EngineMessageType {
        self.message.message_type()
    }

    /// Validate an inbound envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] when the discriminator is unknown, the
    /// payload does not match it, or the timestamp is missing.
    pub fn from_value(value: &Value) -> ProtocolResult<Self> {
        let raw = RawEnvelope::parse(value)?;
        let message_type = EngineMessageType::parse(&raw.kind)
            .ok_or_else(|| ProtocolError::UnknownType(raw.kind.clone()))?;

        let tag = message_type.as_str();
        let message = match message_type {
            EngineMessageType::EngineReady => {
                EngineMessage::EngineReady(payload_as(tag, &raw.payload)?)
            },
            EngineMessageType::StateUpdate => {
                EngineMessage::StateUpdate(payload_as(tag, &raw.payload)?)
            },
            EngineMessageType::Interaction => {
                EngineMessage::Interaction(payload_as(tag, &raw.payload)?)
            },
        };

        let timestamp = match &raw.timestamp {
            Value::Number(number) => number_to_millis(number),
            _ => None,
        }
        .ok_or(ProtocolError::MissingTimestamp(tag))?;

        Ok(Self { message, timestamp })
    }

    /// Wire form of the envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if a payload cannot be represented as JSON.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Serialize for EngineEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EngineEnvelope", 3)?;
        state.serialize_field("type", self.message_type().as_str())?;
        match &self.message {
            EngineMessage::EngineReady(payload) => state.serialize_field("payload", payload)?,
            EngineMessage::StateUpdate(payload) => state.serialize_field("payload", payload)?,
            EngineMessage::Interaction(payload) => state.serialize_field("payload", payload)?,
        }
        state.serialize_field("timestamp", &self.timestamp)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for EngineEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(D::Error::custom)
    }
}
