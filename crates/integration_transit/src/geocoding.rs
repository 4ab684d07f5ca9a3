//! Mapbox geocoding client
//!
//! Converts free-form place names to geographic coordinates using the
//! [Mapbox Geocoding API](https://docs.mapbox.com/api/search/geocoding/).
//! Mapbox reports feature centers as `[longitude, latitude]`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use domain::GeoLocation;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// Configuration for the Mapbox geocoding service
#[derive(Clone, Deserialize)]
pub struct MapboxConfig {
    /// Mapbox access token (sensitive - uses SecretString)
    pub access_token: SecretString,

    /// Base URL of the `mapbox.places` endpoint
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_geocoding_timeout_secs")]
    pub timeout_secs: u64,

    /// Feature types filter (e.g. "poi", "address,poi"); empty to disable
    #[serde(default = "default_types")]
    pub types: String,

    /// Maximum number of features requested
    #[serde(default = "default_limit")]
    pub limit: u8,
}

impl fmt::Debug for MapboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapboxConfig")
            .field("access_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("types", &self.types)
            .field("limit", &self.limit)
            .finish()
    }
}

fn default_geocoding_base_url() -> String {
    "https://api.mapbox.com/geocoding/v5/mapbox.places".to_string()
}

const fn default_geocoding_timeout_secs() -> u64 {
    5
}

fn default_types() -> String {
    "poi".to_string()
}

const fn default_limit() -> u8 {
    1
}

impl MapboxConfig {
    /// Create a configuration with default endpoints for the given token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            base_url: default_geocoding_base_url(),
            timeout_secs: default_geocoding_timeout_secs(),
            types: default_types(),
            limit: default_limit(),
        }
    }

    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self::new("pk.test-token")
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.access_token.expose_secret().trim().is_empty() {
            return Err("mapbox.access_token must not be empty".to_string());
        }

        if self.base_url.is_empty() {
            return Err("mapbox.base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("mapbox.timeout_secs must be greater than 0".to_string());
        }

        // Mapbox caps forward geocoding at 10 results
        if self.limit == 0 || self.limit > 10 {
            return Err("mapbox.limit must be between 1 and 10".to_string());
        }

        Ok(())
    }
}

/// Errors that can occur during geocoding
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// Connection to geocoding service failed
    #[error("Geocoding connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to geocoding service failed
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    /// The access token was rejected
    #[error("Geocoding unauthorized: the access token was rejected")]
    Unauthorized,

    /// Failed to parse geocoding response
    #[error("Geocoding parse error: {0}")]
    ParseError(String),

    /// The place name matched no features
    #[error("No geocoding results for: {0}")]
    NoResults(String),

    /// Client configuration is unusable
    #[error("Geocoding configuration error: {0}")]
    ConfigurationError(String),

    /// Request timeout
    #[error("Geocoding request timed out")]
    Timeout,
}

impl GeocodingError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::RequestFailed(_) | Self::Timeout
        )
    }
}

/// A geocoded place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    /// Coordinates of the feature center
    pub location: GeoLocation,
    /// Full display name (e.g. "Babson College, 231 Forest St, Wellesley, ...")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    /// Street address, when Mapbox has one for the feature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Trait for geocoding clients
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Resolve a free-form place name to the best-matching place
    async fn geocode(&self, place_name: &str) -> Result<GeocodedPlace, GeocodingError>;
}

/// Mapbox forward-geocoding client
#[derive(Debug)]
pub struct MapboxGeocodingClient {
    client: Client,
    config: MapboxConfig,
}

impl MapboxGeocodingClient {
    /// Create a new Mapbox geocoding client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &MapboxConfig) -> Result<Self, GeocodingError> {
        config
            .validate()
            .map_err(GeocodingError::ConfigurationError)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("stopfinder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeocodingError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Build `{base_url}/{place_name}.json` with the name as one escaped segment
    fn place_url(&self, place_name: &str) -> Result<Url, GeocodingError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GeocodingError::ConfigurationError(format!("invalid base_url: {e}")))?;

        url.path_segments_mut()
            .map_err(|()| {
                GeocodingError::ConfigurationError("base_url cannot carry a path".to_string())
            })?
            .pop_if_empty()
            .push(&format!("{place_name}.json"));

        Ok(url)
    }

    /// Query parameters for a forward-geocoding request
    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (
                "access_token",
                self.config.access_token.expose_secret().to_string(),
            ),
            ("limit", self.config.limit.to_string()),
        ];

        if !self.config.types.is_empty() {
            params.push(("types", self.config.types.clone()));
        }

        params
    }

    /// Parse the raw feature collection and take the first feature
    fn parse_response(place_name: &str, body: &str) -> Result<GeocodedPlace, GeocodingError> {
        let collection: RawFeatureCollection =
            serde_json::from_str(body).map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        let Some(feature) = collection.features.into_iter().next() else {
            return Err(GeocodingError::NoResults(place_name.to_string()));
        };

        let [longitude, latitude] = match feature.center.as_slice() {
            [lon, lat, ..] => [*lon, *lat],
            _ => {
                return Err(GeocodingError::ParseError(
                    "Feature center must hold longitude and latitude".to_string(),
                ));
            },
        };

        let location = GeoLocation::new(latitude, longitude)
            .map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        Ok(GeocodedPlace {
            location,
            place_name: feature.place_name,
            address: feature.properties.and_then(|p| p.address),
        })
    }
}

#[async_trait]
impl GeocodingClient for MapboxGeocodingClient {
    #[instrument(skip(self))]
    async fn geocode(&self, place_name: &str) -> Result<GeocodedPlace, GeocodingError> {
        let place_name = place_name.trim();
        if place_name.is_empty() {
            return Err(GeocodingError::NoResults(
                "Place name must not be empty".to_string(),
            ));
        }

        let url = self.place_url(place_name)?;
        debug!(path = url.path(), "Geocoding place");

        let response = self
            .client
            .get(url)
            .query(&self.query_params())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodingError::Timeout
                } else {
                    GeocodingError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(GeocodingError::Unauthorized);
        }

        if !status.is_success() {
            return Err(GeocodingError::RequestFailed(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        let place = Self::parse_response(place_name, &body).inspect_err(|e| {
            if matches!(e, GeocodingError::NoResults(_)) {
                warn!("No geocoding results");
            }
        })?;

        debug!(location = %place.location, "Geocoded place");
        Ok(place)
    }
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawFeatureCollection {
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    center: Vec<f64>,
    place_name: Option<String>,
    properties: Option<RawProperties>,
}

#[derive(Debug, Deserialize)]
struct RawProperties {
    address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BABSON_JSON: &str = r#"{
        "type": "FeatureCollection",
        "query": ["babson", "college"],
        "features": [{
            "id": "poi.558345748727",
            "type": "Feature",
            "place_type": ["poi"],
            "text": "Babson College",
            "place_name": "Babson College, 231 Forest St, Wellesley, Massachusetts 02457, United States",
            "center": [-71.263746, 42.297226],
            "properties": { "address": "231 Forest St", "category": "college, university" }
        }]
    }"#;

    #[test]
    fn test_mapbox_config_new() {
        let config = MapboxConfig::new("pk.abc");
        assert_eq!(config.access_token.expose_secret(), "pk.abc");
        assert_eq!(
            config.base_url,
            "https://api.mapbox.com/geocoding/v5/mapbox.places"
        );
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.types, "poi");
        assert_eq!(config.limit, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mapbox_config_debug_redacts_token() {
        let debug = format!("{:?}", MapboxConfig::new("pk.very-secret"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("pk.very-secret"));
    }

    #[test]
    fn test_mapbox_config_validation() {
        assert!(MapboxConfig::new("").validate().is_err());

        let zero_timeout = MapboxConfig {
            timeout_secs: 0,
            ..MapboxConfig::for_testing()
        };
        assert!(zero_timeout.validate().is_err());

        let too_many = MapboxConfig {
            limit: 11,
            ..MapboxConfig::for_testing()
        };
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_geocoding_error_display() {
        let err = GeocodingError::NoResults("Nowhere Special".to_string());
        assert!(err.to_string().contains("Nowhere Special"));

        let err = GeocodingError::Timeout;
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_geocoding_error_retryable() {
        assert!(GeocodingError::Timeout.is_retryable());
        assert!(GeocodingError::ConnectionFailed("x".to_string()).is_retryable());
        assert!(!GeocodingError::NoResults("x".to_string()).is_retryable());
        assert!(!GeocodingError::Unauthorized.is_retryable());
    }

    #[test]
    fn test_parse_response_swaps_center_order() {
        let place = MapboxGeocodingClient::parse_response("Babson College", BABSON_JSON).unwrap();
        assert!((place.location.latitude() - 42.297_226).abs() < 1e-9);
        assert!((place.location.longitude() - -71.263_746).abs() < 1e-9);
        assert_eq!(place.address.as_deref(), Some("231 Forest St"));
        assert!(place.place_name.unwrap().starts_with("Babson College"));
    }

    #[test]
    fn test_parse_response_empty_features() {
        let json = r#"{ "type": "FeatureCollection", "features": [] }"#;
        let result = MapboxGeocodingClient::parse_response("Atlantis", json);
        assert!(matches!(result, Err(GeocodingError::NoResults(name)) if name == "Atlantis"));
    }

    #[test]
    fn test_parse_response_short_center() {
        let json = r#"{ "features": [{ "center": [-71.2] }] }"#;
        let result = MapboxGeocodingClient::parse_response("x", json);
        assert!(matches!(result, Err(GeocodingError::ParseError(_))));
    }

    #[test]
    fn test_parse_response_out_of_range_center() {
        let json = r#"{ "features": [{ "center": [-71.2, 142.3] }] }"#;
        let result = MapboxGeocodingClient::parse_response("x", json);
        assert!(matches!(result, Err(GeocodingError::ParseError(_))));
    }

    #[test]
    fn test_parse_response_malformed() {
        let result = MapboxGeocodingClient::parse_response("x", "<html>");
        assert!(matches!(result, Err(GeocodingError::ParseError(_))));
    }

    #[test]
    fn test_place_url_escapes_name() {
        let client = MapboxGeocodingClient::new(&MapboxConfig::for_testing()).unwrap();
        let url = client.place_url("Koko FitClub of Needham").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/Koko%20FitClub%20of%20Needham.json"
        );

        let url = client.place_url("A/B").unwrap();
        assert!(url.path().ends_with("/A%2FB.json"));
    }

    #[test]
    fn test_place_url_trailing_slash_base() {
        let config = MapboxConfig {
            base_url: "http://localhost:9999/places/".to_string(),
            ..MapboxConfig::for_testing()
        };
        let client = MapboxGeocodingClient::new(&config).unwrap();
        let url = client.place_url("Needham").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9999/places/Needham.json");
    }

    #[test]
    fn test_query_params() {
        let client = MapboxGeocodingClient::new(&MapboxConfig::for_testing()).unwrap();
        let params = client.query_params();
        assert!(params.contains(&("access_token", "pk.test-token".to_string())));
        assert!(params.contains(&("types", "poi".to_string())));
        assert!(params.contains(&("limit", "1".to_string())));

        let config = MapboxConfig {
            types: String::new(),
            ..MapboxConfig::for_testing()
        };
        let client = MapboxGeocodingClient::new(&config).unwrap();
        assert!(!client.query_params().iter().any(|(key, _)| *key == "types"));
    }
}
