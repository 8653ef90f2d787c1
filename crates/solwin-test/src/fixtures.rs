//! Test fixtures for common protocol values.

use serde_json::{Value, json};

use solwin_core::{Location, SolarEngineState};

/// Origin used for host documents in tests.
pub const HOST_ORIGIN: &str = "https://host.example";

/// Origin used for engine documents in tests.
pub const ENGINE_ORIGIN: &str = "https://engine.example";

/// A location in Boulder, Colorado.
#[must_use]
pub fn test_location() -> Location {
    Location::new(40.0150, -105.2705)
}

/// A fully populated engine state.
#[must_use]
pub fn test_state() -> SolarEngineState {
    SolarEngineState::new()
        .with_location(test_location())
        .with_address("303 S Technology Ct")
        .with_building_insights(json!({"name": "buildings/abc", "imageryQuality": "HIGH"}))
        .with_solar_potential(json!({"maxArrayPanelsCount": 42}))
}

/// Wire form of an `ENGINE_READY` envelope.
#[must_use]
pub fn engine_ready_value() -> Value {
    json!({
        "type": "ENGINE_READY",
        "payload": {"version": "1.0.0", "capabilities": ["solar-analysis", "map-interaction"]},
        "timestamp": 1_700_000_000_000_i64
    })
}

/// Wire form of a `STATE_UPDATE` envelope carrying `state`.
#[must_use]
pub fn state_update_value(state: &SolarEngineState) -> Value {
    json!({
        "type": "STATE_UPDATE",
        "payload": state,
        "timestamp": 1_700_000_000_001_i64
    })
}

/// Wire form of an `INTERACTION` envelope.
#[must_use]
pub fn interaction_value(action: &str) -> Value {
    json!({
        "type": "INTERACTION",
        "payload": {"action": action, "timestamp": 1_700_000_000_002_i64},
        "timestamp": 1_700_000_000_002_i64
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use solwin_core::EngineEnvelope;

    #[test]
    fn test_fixture_envelopes_parse() {
        assert!(EngineEnvelope::from_value(&engine_ready_value()).is_ok());
        assert!(EngineEnvelope::from_value(&state_update_value(&test_state())).is_ok());
        assert!(EngineEnvelope::from_value(&interaction_value("click")).is_ok());
    }
}
