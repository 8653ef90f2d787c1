//! Regional data errors.

use thiserror::Error;

use crate::region::RegionCode;

/// Errors that can occur while resolving regions or fetching rates.
#[derive(Debug, Error)]
pub enum RegionalError {
    /// Region code is not two ASCII letters.
    #[error("invalid region code: {0:?}")]
    InvalidRegionCode(String),

    /// Coordinate is not finite or out of range.
    #[error("invalid location: ({lat}, {lng})")]
    InvalidLocation {
        /// Latitude.
        lat: f64,
        /// Longitude.
        lng: f64,
    },

    /// The geocoder found no region for a coordinate.
    #[error("no region found: {0}")]
    NotFound(String),

    /// The rate provider returned no records for a region.
    #[error("no rate data for region {0}")]
    NoData(RegionCode),

    /// API key not configured.
    #[error("API key not configured for {provider}")]
    ApiKeyNotConfigured {
        /// Provider name.
        provider: String,
    },

    /// Upstream answered with an error.
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// Upstream answer could not be understood.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RegionalError {
    /// Whether the failure lies with the upstream service rather than the
    /// caller's input.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::ApiRequestFailed(_) | Self::InvalidResponse(_) | Self::Http(_)
        )
    }
}

/// Result type for regional operations.
pub type RegionalResult<T> = Result<T, RegionalError>;
