//! Engine state shared with the hosting dashboard.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Location {
    /// Create a location.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both coordinates are finite and within geographic range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// State the engine owns and reports to its host.
///
/// The analysis blobs are opaque here; they are produced by analysis
/// collaborators and passed through untouched. The same type doubles as a
/// partial update: `None` fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarEngineState {
    /// Selected location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Selected street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Building analysis for the selected location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_insights: Option<serde_json::Value>,
    /// Solar potential analysis for the selected location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solar_potential: Option<serde_json::Value>,
}

impl SolarEngineState {
    /// Empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the building insights blob.
    #[must_use]
    pub fn with_building_insights(mut self, insights: serde_json::Value) -> Self {
        self.building_insights = Some(insights);
        self
    }

    /// Set the solar potential blob.
    #[must_use]
    pub fn with_solar_potential(mut self, potential: serde_json::Value) -> Self {
        self.solar_potential = Some(potential);
        self
    }

    /// Shallow merge: every field present in `partial` replaces the current
    /// value, every absent field is kept.
    ///
    /// `None` means "not mentioned", so a merge can never clear a field.
    /// Start from [`SolarEngineState::default`] to drop values.
    pub fn merge(&mut self, partial: Self) {
        if partial.location.is_some() {
            self.location = partial.location;
        }
        if partial.address.is_some() {
            self.address = partial.address;
        }
        if partial.building_insights.is_some() {
            self.building_insights = partial.building_insights;
        }
        if partial.solar_potential.is_some() {
            self.solar_potential = partial.solar_potential;
        }
    }

    /// No field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.address.is_none()
            && self.building_insights.is_none()
            && self.solar_potential.is_none()
    }
}
