//! Engine channel settings.

use std::time::Duration;

use solwin_core::{ENGINE_CAPABILITIES, ENGINE_VERSION, READY_DELAY_MS, ReadyPayload};

/// Settings for an [`EngineChannel`](crate::EngineChannel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Delay between `initialize` and the `ENGINE_READY` announcement.
    pub ready_delay: Duration,
    /// Version announced in `ENGINE_READY`.
    pub version: String,
    /// Capabilities announced in `ENGINE_READY`.
    pub capabilities: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ready_delay: Duration::from_millis(READY_DELAY_MS),
            version: ENGINE_VERSION.to_owned(),
            capabilities: ENGINE_CAPABILITIES.iter().map(|c| (*c).to_owned()).collect(),
        }
    }
}

impl EngineConfig {
    /// Override the readiness delay.
    #[must_use]
    pub fn with_ready_delay(mut self, delay: Duration) -> Self {
        self.ready_delay = delay;
        self
    }

    /// Payload announced once the delay elapses.
    #[must_use]
    pub fn ready_payload(&self) -> ReadyPayload {
        ReadyPayload::new(self.version.clone(), self.capabilities.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.ready_delay, Duration::from_secs(1));
        assert_eq!(config.version, "1.0.0");
        assert_eq!(
            config.ready_payload().capabilities,
            vec!["solar-analysis", "map-interaction"]
        );
    }
}
