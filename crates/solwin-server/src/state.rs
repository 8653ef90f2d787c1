//! Shared request state.

use std::sync::Arc;

use axum::http::HeaderValue;

use solwin_regional::RateProvider;

/// Default `max-age` of the embed script outside dev mode.
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 3600;

/// How the embed script is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    /// Development mode disables caching of the script.
    pub dev_mode: bool,
    /// `max-age` outside dev mode.
    pub cache_max_age_secs: u64,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            dev_mode: false,
            cache_max_age_secs: DEFAULT_CACHE_MAX_AGE_SECS,
        }
    }
}

impl ServerOptions {
    /// `Cache-Control` value for the embed script.
    #[must_use]
    pub fn cache_control(&self) -> HeaderValue {
        if self.dev_mode {
            HeaderValue::from_static("no-cache")
        } else {
            HeaderValue::from_str(&format!("public, max-age={}", self.cache_max_age_secs))
                .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
        }
    }
}

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Regional rate source.
    pub rates: Arc<dyn RateProvider>,
    /// Delivery options.
    pub options: ServerOptions,
}

impl AppState {
    /// Create state.
    #[must_use]
    pub fn new(rates: Arc<dyn RateProvider>, options: ServerOptions) -> Self {
        Self { rates, options }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
