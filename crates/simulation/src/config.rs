//! Simulation configuration.

use crate::event::DEFAULT_ZONE_DURATION_MINUTES;
use crate::feed::DEFAULT_FEED_CAPACITY;
use crate::price_path::{DEFAULT_STEP_SECONDS, validate_step_seconds};
use crate::zones::ZoneResolution;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use volsim_domain::{DomainError, DomainResult};

/// Errors raised while loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The contents are not valid JSON for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(#[from] DomainError),
}

/// Configuration for a simulation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of candles kept in the visible window.
    pub history_len: usize,
    /// Candle width in seconds.
    pub step_seconds: i64,
    /// Wall-clock period between ticks.
    pub tick_interval_ms: u64,
    /// Lifetime of an injected volatility zone.
    pub zone_duration_minutes: u32,
    /// Maximum number of driver-feed entries kept.
    pub feed_capacity: usize,
    /// How overlapping zones combine.
    pub zone_resolution: ZoneResolution,
    /// Fixed RNG seed; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Symbol selected at start-up.
    pub default_symbol: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            history_len: 1000,
            step_seconds: DEFAULT_STEP_SECONDS,
            tick_interval_ms: 1000,
            zone_duration_minutes: DEFAULT_ZONE_DURATION_MINUTES,
            feed_capacity: DEFAULT_FEED_CAPACITY,
            zone_resolution: ZoneResolution::MaxSeverity,
            seed: None,
            default_symbol: "BTC/USD".to_string(),
        }
    }
}

impl SimulationConfig {
    /// Creates a config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed JSON and
    /// [`ConfigError::Invalid`] when a value fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// as [`SimulationConfig::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Sets the visible window length.
    #[must_use]
    pub fn with_history_len(mut self, history_len: usize) -> Self {
        self.history_len = history_len;
        self
    }

    /// Sets the candle width.
    #[must_use]
    pub fn with_step_seconds(mut self, step_seconds: i64) -> Self {
        self.step_seconds = step_seconds;
        self
    }

    /// Sets the tick period.
    #[must_use]
    pub fn with_tick_interval_ms(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms;
        self
    }

    /// Sets the zone lifetime.
    #[must_use]
    pub fn with_zone_duration_minutes(mut self, minutes: u32) -> Self {
        self.zone_duration_minutes = minutes;
        self
    }

    /// Sets the feed capacity.
    #[must_use]
    pub fn with_feed_capacity(mut self, capacity: usize) -> Self {
        self.feed_capacity = capacity;
        self
    }

    /// Sets the overlap policy.
    #[must_use]
    pub fn with_zone_resolution(mut self, resolution: ZoneResolution) -> Self {
        self.zone_resolution = resolution;
        self
    }

    /// Fixes the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the start-up symbol.
    #[must_use]
    pub fn with_default_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.default_symbol = symbol.into();
        self
    }

    /// Tick period as a [`Duration`].
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Checks every length and interval is non-zero and the candle width is
    /// at most one day.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> DomainResult<()> {
        if self.history_len == 0 {
            return Err(DomainError::invalid(
                "history_len",
                "must be greater than zero",
            ));
        }
        validate_step_seconds(self.step_seconds)?;
        if self.tick_interval_ms == 0 {
            return Err(DomainError::invalid(
                "tick_interval_ms",
                "must be greater than zero",
            ));
        }
        if self.zone_duration_minutes == 0 {
            return Err(DomainError::invalid(
                "zone_duration_minutes",
                "must be greater than zero",
            ));
        }
        if self.feed_capacity == 0 {
            return Err(DomainError::invalid(
                "feed_capacity",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
