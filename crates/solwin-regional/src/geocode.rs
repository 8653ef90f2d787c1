//! Google reverse geocoding.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use solwin_core::Location;

use crate::error::{RegionalError, RegionalResult};
use crate::provider::RegionResolver;
use crate::region::RegionCode;

/// Public Google Maps API root.
pub const DEFAULT_GEOCODE_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Address component type naming a state or province.
const STATE_COMPONENT: &str = "administrative_area_level_1";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl GeocodeResponse {
    /// Short name of the first state-level component across all results.
    fn state_short_name(&self) -> Option<&str> {
        self.results
            .iter()
            .flat_map(|r| &r.address_components)
            .find(|c| c.types.iter().any(|t| t == STATE_COMPONENT))
            .map(|c| c.short_name.as_str())
    }
}

/// Resolves coordinates to state codes with the Google Geocoding API.
#[derive(Clone)]
pub struct GoogleGeocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for GoogleGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleGeocoder")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

impl GoogleGeocoder {
    /// Geocoder against the public API.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_GEOCODE_BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Use another API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl RegionResolver for GoogleGeocoder {
    async fn resolve_region(&self, location: Location) -> RegionalResult<RegionCode> {
        if !location.is_valid() {
            return Err(RegionalError::InvalidLocation {
                lat: location.lat,
                lng: location.lng,
            });
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RegionalError::ApiKeyNotConfigured {
                provider: "google-maps".to_string(),
            })?;

        debug!(lat = location.lat, lng = location.lng, "Geocoding location");
        let url = format!("{}/geocode/json", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[
                ("latlng", format!("{},{}", location.lat, location.lng)),
                ("key", api_key.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Geocoding API error");
            return Err(RegionalError::ApiRequestFailed(format!(
                "HTTP {}: {body}",
                status.as_u16()
            )));
        }

        let parsed: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| RegionalError::InvalidResponse(e.to_string()))?;

        match parsed.status.as_str() {
            "OK" => {},
            "ZERO_RESULTS" => {
                return Err(RegionalError::NotFound(
                    "no geocoding results for this location".to_string(),
                ));
            },
            other => {
                let detail = parsed.error_message.as_deref().unwrap_or("no detail");
                error!(status = other, detail, "Geocoding request rejected");
                return Err(RegionalError::ApiRequestFailed(format!("{other}: {detail}")));
            },
        }

        let short_name = parsed.state_short_name().ok_or_else(|| {
            RegionalError::NotFound("no state information in geocoding results".to_string())
        })?;
        debug!(state = short_name, "Resolved state");
        // Rate data is keyed by two-letter codes; other jurisdictions have none.
        RegionCode::parse(short_name).map_err(|_| {
            RegionalError::NotFound(format!(
                "state {short_name:?} has no two-letter region code"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn geocode_router(seen: &Arc<Mutex<Vec<HashMap<String, String>>>>, body: Value) -> Router {
        let seen = Arc::clone(seen);
        Router::new().route(
            "/geocode/json",
            get(move |Query(query): Query<HashMap<String, String>>| {
                let seen = Arc::clone(&seen);
                let body = body.clone();
                async move {
                    seen.lock().unwrap().push(query);
                    Json(body)
                }
            }),
        )
    }

    fn boulder_body() -> Value {
        json!({
            "status": "OK",
            "results": [
                {"address_components": [
                    {"long_name": "Boulder", "short_name": "Boulder", "types": ["locality", "political"]}
                ]},
                {"address_components": [
                    {"long_name": "Boulder County", "short_name": "Boulder County",
                     "types": ["administrative_area_level_2", "political"]},
                    {"long_name": "Colorado", "short_name": "CO",
                     "types": ["administrative_area_level_1", "political"]}
                ]}
            ]
        })
    }

    #[tokio::test]
    async fn test_resolves_first_state_component() {
        let seen = Arc::default();
        let base = serve(geocode_router(&seen, boulder_body())).await;
        let geocoder = GoogleGeocoder::new(Some("maps-key".into())).with_base_url(base);

        let code = geocoder
            .resolve_region(Location::new(40.015, -105.2705))
            .await
            .unwrap();
        assert_eq!(code.as_str(), "CO");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["latlng"], "40.015,-105.2705");
        assert_eq!(seen[0]["key"], "maps-key");
    }

    #[tokio::test]
    async fn test_zero_results_is_not_found() {
        let seen = Arc::default();
        let base = serve(geocode_router(
            &seen,
            json!({"status": "ZERO_RESULTS", "results": []}),
        ))
        .await;
        let geocoder = GoogleGeocoder::new(Some("k".into())).with_base_url(base);

        let err = geocoder
            .resolve_region(Location::new(0.0, -160.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RegionalError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_state_component_is_not_found() {
        let seen = Arc::default();
        let body = json!({"status": "OK", "results": [
            {"address_components": [{"short_name": "Pacific Ocean", "types": ["natural_feature"]}]}
        ]});
        let base = serve(geocode_router(&seen, body)).await;
        let geocoder = GoogleGeocoder::new(Some("k".into())).with_base_url(base);

        let err = geocoder
            .resolve_region(Location::new(10.0, -150.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RegionalError::NotFound(msg) if msg.contains("state")));
    }

    #[tokio::test]
    async fn test_non_two_letter_state_is_not_found() {
        let seen = Arc::default();
        let body = json!({"status": "OK", "results": [
            {"address_components": [
                {"long_name": "New South Wales", "short_name": "NSW",
                 "types": ["administrative_area_level_1", "political"]}
            ]}
        ]});
        let base = serve(geocode_router(&seen, body)).await;
        let geocoder = GoogleGeocoder::new(Some("k".into())).with_base_url(base);

        let err = geocoder
            .resolve_region(Location::new(-33.87, 151.21))
            .await
            .unwrap_err();
        assert!(matches!(err, RegionalError::NotFound(msg) if msg.contains("NSW")));
    }

    #[tokio::test]
    async fn test_denied_request() {
        let seen = Arc::default();
        let body = json!({"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."});
        let base = serve(geocode_router(&seen, body)).await;
        let geocoder = GoogleGeocoder::new(Some("k".into())).with_base_url(base);

        let err = geocoder
            .resolve_region(Location::new(40.0, -105.0))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, RegionalError::ApiRequestFailed(msg) if msg.starts_with("REQUEST_DENIED"))
        );
    }

    #[tokio::test]
    async fn test_invalid_location_is_rejected_locally() {
        let geocoder = GoogleGeocoder::new(Some("k".into())).with_base_url("http://127.0.0.1:9");
        for location in [
            Location::new(f64::NAN, 0.0),
            Location::new(0.0, f64::INFINITY),
            Location::new(91.0, 0.0),
        ] {
            let err = geocoder.resolve_region(location).await.unwrap_err();
            assert!(matches!(err, RegionalError::InvalidLocation { .. }));
        }
    }
}
