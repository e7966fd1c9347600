//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `WELLNESS` prefix and
//! nested values are separated by a double underscore. Every section has
//! defaults, so an empty environment yields a runnable configuration.
//!
//! # Example
//!
//! ```no_run
//! use caregiver_wellness::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod features;
mod scoring;
mod server;
mod spike;

pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use scoring::ScoringConfig;
pub use server::{Environment, ServerConfig};
pub use spike::{AggregatorConfig, SpikeConfig};

use serde::Deserialize;

use crate::domain::wellness::SpikePolicy;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Answer parsing rules
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Spike detector thresholds
    #[serde(default)]
    pub spike: SpikeConfig,

    /// Profile merge retry settings
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// Feature flags
    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `WELLNESS__*` variables:
    ///
    /// - `WELLNESS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `WELLNESS__SPIKE__DELTA_THRESHOLD=25` -> `spike.delta_threshold = 25`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("WELLNESS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("scoring.skip_tokens")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.scoring.validate()?;
        self.spike.validate()?;
        self.aggregator.validate()?;
        Ok(())
    }

    /// Spike policy with the feature flag applied.
    pub fn spike_policy(&self) -> SpikePolicy {
        self.spike.policy(self.features.enable_spike_follow_ups)
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
