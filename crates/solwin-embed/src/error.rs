//! Embedding errors.

use solwin_core::TransportError;
use thiserror::Error;

/// Errors raised by [`embed`](crate::embed).
///
/// All of them are raised before a frame is attached, so a failed embed
/// never leaves a partial frame behind.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// `containerId` was absent or empty.
    #[error("containerId is required")]
    MissingContainerId,

    /// No element with the given id exists in the host document.
    #[error("container element with id \"{0}\" not found")]
    ContainerNotFound(String),

    /// The host document reported an origin that is not a URL origin.
    #[error("host document origin is not a valid origin: {0}")]
    InvalidOrigin(String),

    /// The document refused to mount the frame.
    #[error("failed to mount frame: {0}")]
    Mount(#[from] TransportError),
}

/// Result type for embedding operations.
pub type EmbedResult<T> = Result<T, EmbedError>;
