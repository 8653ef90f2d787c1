//! Engine channel error types.

use thiserror::Error;

/// Errors raised while setting up the engine channel.
///
/// Runtime protocol problems are never surfaced as errors; they are logged
/// and the offending message is dropped.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The readiness timer needs a Tokio runtime and none is running.
    #[error("no Tokio runtime available to schedule the readiness announcement")]
    RuntimeUnavailable,

    /// `initialize` was called more than once.
    #[error("engine channel already initialized")]
    AlreadyInitialized,
}

/// Result type for engine channel setup.
pub type EngineResult<T> = Result<T, EngineError>;
