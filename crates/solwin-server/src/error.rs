//! Server errors and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use solwin_regional::RegionalError;

/// Errors produced while handling a request or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request was malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Nothing exists for the request.
    #[error("not found: {0}")]
    NotFound(String),

    /// An upstream data service failed.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// A collaborator is not configured.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The listener could not be bound or the server stopped abnormally.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RegionalError> for ServerError {
    fn from(err: RegionalError) -> Self {
        match err {
            RegionalError::InvalidRegionCode(_) | RegionalError::InvalidLocation { .. } => {
                Self::BadRequest(err.to_string())
            },
            RegionalError::NoData(_) | RegionalError::NotFound(_) => {
                Self::NotFound(err.to_string())
            },
            RegionalError::ApiKeyNotConfigured { .. } => Self::Unavailable(err.to_string()),
            RegionalError::ApiRequestFailed(_)
            | RegionalError::InvalidResponse(_)
            | RegionalError::Http(_) => Self::Upstream(err.to_string()),
        }
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(%status, error = %self, "Request failed");
        }
        (status, Json(ErrorBody {
            error: self.to_string(),
        }))
            .into_response()
    }
}
