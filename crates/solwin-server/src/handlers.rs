//! Request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use tracing::debug;

use solwin_regional::{RateRecord, RegionCode};

use crate::error::ServerResult;
use crate::state::AppState;

/// The embedding helper served to third-party pages.
pub const EMBED_SCRIPT: &str = include_str!("../assets/embed.js");

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers
}

pub(crate) async fn embed_script(State(state): State<AppState>) -> (HeaderMap, &'static str) {
    let mut headers = cors_headers();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/javascript"),
    );
    headers.insert(CACHE_CONTROL, state.options.cache_control());
    (headers, EMBED_SCRIPT)
}

pub(crate) async fn embed_preflight() -> (StatusCode, HeaderMap) {
    (StatusCode::OK, cors_headers())
}

pub(crate) async fn latest_rate(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> ServerResult<Json<RateRecord>> {
    let region = RegionCode::parse(&region)?;
    let record = state.rates.fetch_regional_rate(&region).await?;
    debug!(%region, period = %record.period, "Serving latest rate");
    Ok(Json(record))
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
