//! Protocol and transport error types.

use thiserror::Error;

/// An inbound envelope that could not be turned into a typed message.
///
/// Receivers never reply with these; they log and drop the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The envelope is not an object with a string `type` field.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The `type` discriminator is not one this direction understands.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// The payload does not have the shape its `type` requires.
    #[error("payload mismatch for {message_type}: {reason}")]
    PayloadMismatch {
        /// Discriminator of the offending envelope.
        message_type: &'static str,
        /// What was wrong with the payload.
        reason: String,
    },

    /// An engine envelope arrived without its producer timestamp.
    #[error("missing timestamp on {0}")]
    MissingTimestamp(&'static str),
}

/// Result type for envelope parsing.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Failures of the underlying cross-document message primitive.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The target browsing context no longer exists.
    #[error("target context is gone")]
    TargetGone,

    /// The platform refused to post the message.
    #[error("message rejected: {0}")]
    Rejected(String),

    /// The top-level context could not be inspected (cross-origin access).
    #[error("cannot introspect top-level context: {0}")]
    IntrospectionDenied(String),

    /// The requested mount point does not exist.
    #[error("no element with id {0:?}")]
    NoSuchElement(String),

    /// The message could not be serialized for delivery.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
