//! Application configuration
//!
//! Loaded from an optional `config.toml` in the working directory (or an
//! explicit path), then overridden by `STOPFINDER_*` environment variables
//! using `__` between sections, e.g. `STOPFINDER_MAPBOX__ACCESS_TOKEN`.

use std::path::Path;

use integration_transit::{MapboxConfig, TransitConfig};
use serde::Deserialize;
use tracing::debug;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "STOPFINDER";

/// Top-level configuration for the CLI
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Mapbox geocoding settings
    pub mapbox: MapboxConfig,

    /// MBTA stops API settings
    pub mbta: TransitConfig,
}

impl AppConfig {
    /// Load configuration from the given file (or `./config.*`) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Load configuration, reading overrides from `env` instead of the process
    /// environment when provided
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., STOPFINDER_MBTA__API_KEY)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> Result<(), String> {
        self.mapbox.validate()?;
        self.mbta.validate()
    }
}
