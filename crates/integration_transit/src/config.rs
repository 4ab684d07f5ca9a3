//! Transit service configuration

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Upper bound for `page[limit]` on nearby-stop queries
pub(crate) const MAX_RESULTS_LIMIT: u8 = 50;

/// Configuration for the MBTA v3 stops API
#[derive(Clone, Deserialize)]
pub struct TransitConfig {
    /// MBTA API key (sensitive - uses SecretString)
    pub api_key: SecretString,

    /// Base URL for the MBTA v3 API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default number of stops returned by nearby-stop queries
    #[serde(default = "default_max_results")]
    pub max_results: u8,

    /// Search radius in degrees around the coordinate (API default when unset)
    #[serde(default)]
    pub radius_degrees: Option<f64>,
}

impl fmt::Debug for TransitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_results", &self.max_results)
            .field("radius_degrees", &self.radius_degrees)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://api-v3.mbta.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_results() -> u8 {
    5
}

impl TransitConfig {
    /// Create a configuration with default endpoints for the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
            radius_degrees: None,
        }
    }

    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            max_results: 2,
            ..Self::new("test-api-key")
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err("mbta.api_key must not be empty".to_string());
        }

        if self.base_url.is_empty() {
            return Err("mbta.base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("mbta.timeout_secs must be greater than 0".to_string());
        }

        if self.max_results == 0 {
            return Err("mbta.max_results must be greater than 0".to_string());
        }

        if self.max_results > MAX_RESULTS_LIMIT {
            return Err(format!(
                "mbta.max_results must be {MAX_RESULTS_LIMIT} or less"
            ));
        }

        if self
            .radius_degrees
            .is_some_and(|radius| !(radius.is_finite() && radius > 0.0))
        {
            return Err("mbta.radius_degrees must be a positive number".to_string());
        }

        Ok(())
    }
}
