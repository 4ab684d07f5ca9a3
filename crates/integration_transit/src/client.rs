//! MBTA transit client via the v3 stops API
//!
//! Looks up stops sorted by distance from a coordinate using
//! [api-v3.mbta.com](https://api-v3.mbta.com/docs/swagger/index.html).

use std::time::Duration;

use async_trait::async_trait;
use domain::{GeoLocation, NearestStop, WheelchairBoarding};
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::{MAX_RESULTS_LIMIT, TransitConfig};
use crate::error::TransitError;
use crate::models::Stop;

/// Trait for transit service clients
#[async_trait]
pub trait TransitClient: Send + Sync {
    /// Find the single stop closest to a location
    async fn nearest_stop(&self, location: GeoLocation) -> Result<NearestStop, TransitError>;

    /// Find up to `max_results` stops near a location, closest first
    async fn nearby_stops(
        &self,
        location: GeoLocation,
        max_results: u8,
    ) -> Result<Vec<Stop>, TransitError>;
}

/// Transit client backed by the MBTA v3 API
#[derive(Debug)]
pub struct MbtaTransitClient {
    client: Client,
    config: TransitConfig,
}

impl MbtaTransitClient {
    /// Create a new MBTA transit client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &TransitConfig) -> Result<Self, TransitError> {
        config
            .validate()
            .map_err(TransitError::ConfigurationError)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("stopfinder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransitError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Query parameters for a distance-sorted stop search
    fn stop_query_params(&self, location: GeoLocation, limit: u8) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("api_key", self.config.api_key.expose_secret().to_string()),
            ("sort", "distance".to_string()),
            ("filter[latitude]", location.latitude().to_string()),
            ("filter[longitude]", location.longitude().to_string()),
            ("page[limit]", limit.to_string()),
        ];

        if let Some(radius) = self.config.radius_degrees {
            params.push(("filter[radius]", radius.to_string()));
        }

        params
    }

    /// Issue a GET against `/stops` and return the raw body
    async fn fetch_stops(&self, location: GeoLocation, limit: u8) -> Result<String, TransitError> {
        let url = format!("{}/stops", self.config.base_url.trim_end_matches('/'));

        debug!(?url, %location, limit, "Searching stops by distance");

        let response = self
            .client
            .get(&url)
            .query(&self.stop_query_params(location, limit))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransitError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    }
                } else {
                    TransitError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TransitError::RateLimitExceeded {
                retry_after_secs: response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok()),
            });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TransitError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            return Err(TransitError::RequestFailed(format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| TransitError::ParseError(e.to_string()))
    }

    /// Parse the raw JSON:API stops response into typed stops
    fn parse_stops_response(body: &str) -> Result<Vec<Stop>, TransitError> {
        let raw: RawStopsResponse =
            serde_json::from_str(body).map_err(|e| TransitError::ParseError(e.to_string()))?;

        Ok(raw.data.into_iter().map(Self::convert_stop).collect())
    }

    /// Convert a raw stop resource to a typed stop
    fn convert_stop(raw: RawStopResource) -> Stop {
        let attributes = raw.attributes;
        Stop {
            id: raw.id,
            name: attributes.name,
            wheelchair_boarding: WheelchairBoarding::from_code(attributes.wheelchair_boarding),
            latitude: attributes.latitude,
            longitude: attributes.longitude,
            municipality: attributes.municipality,
        }
    }
}

#[async_trait]
impl TransitClient for MbtaTransitClient {
    #[instrument(skip(self))]
    async fn nearest_stop(&self, location: GeoLocation) -> Result<NearestStop, TransitError> {
        let body = self.fetch_stops(location, 1).await?;

        let Some(stop) = Self::parse_stops_response(&body)?.into_iter().next() else {
            warn!("No stops found");
            return Err(TransitError::NoStopsFound {
                latitude: location.latitude(),
                longitude: location.longitude(),
            });
        };

        debug!(
            stop = %stop.name,
            wheelchair_boarding = stop.wheelchair_boarding.code(),
            "Nearest stop found"
        );
        Ok(stop.into())
    }

    #[instrument(skip(self))]
    async fn nearby_stops(
        &self,
        location: GeoLocation,
        max_results: u8,
    ) -> Result<Vec<Stop>, TransitError> {
        if max_results == 0 {
            return Err(TransitError::InvalidRequest(
                "max_results must be greater than 0".to_string(),
            ));
        }

        if max_results > MAX_RESULTS_LIMIT {
            return Err(TransitError::InvalidRequest(format!(
                "max_results must be {MAX_RESULTS_LIMIT} or less"
            )));
        }

        let body = self.fetch_stops(location, max_results).await?;
        let stops = Self::parse_stops_response(&body)?;

        if stops.is_empty() {
            warn!("No stops found");
        }

        debug!(count = stops.len(), "Nearby stops found");
        Ok(stops)
    }
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawStopsResponse {
    data: Vec<RawStopResource>,
}

#[derive(Debug, Deserialize)]
struct RawStopResource {
    id: String,
    attributes: RawStopAttributes,
}

#[derive(Debug, Deserialize)]
struct RawStopAttributes {
    name: String,
    wheelchair_boarding: u8,
    latitude: Option<f64>,
    longitude: Option<f64>,
    municipality: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stops_response() {
        let json = r#"{
            "data": [
                {
                    "id": "place-NB-0120",
                    "type": "stop",
                    "attributes": {
                        "name": "Needham Heights",
                        "wheelchair_boarding": 1,
                        "latitude": 42.293139,
                        "longitude": -71.235087,
                        "municipality": "Needham",
                        "location_type": 1
                    }
                },
                {
                    "id": "1894",
                    "type": "stop",
                    "attributes": {
                        "name": "Highland Ave @ Hunnewell St",
                        "wheelchair_boarding": 0,
                        "latitude": 42.29,
                        "longitude": -71.23,
                        "municipality": null
                    }
                }
            ],
            "links": {}
        }"#;

        let stops = MbtaTransitClient::parse_stops_response(json).unwrap();
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].id, "place-NB-0120");
        assert_eq!(stops[0].name, "Needham Heights");
        assert_eq!(stops[0].wheelchair_boarding.code(), 1);
        assert_eq!(stops[0].municipality.as_deref(), Some("Needham"));
        assert_eq!(stops[1].wheelchair_boarding.code(), 0);
        assert!(stops[1].municipality.is_none());
    }

    #[test]
    fn test_parse_empty_data() {
        let stops = MbtaTransitClient::parse_stops_response(r#"{ "data": [] }"#).unwrap();
        assert!(stops.is_empty());
    }

    #[test]
    fn test_parse_missing_wheelchair_boarding() {
        let json = r#"{ "data": [{ "id": "1", "attributes": { "name": "Somewhere" } }] }"#;
        let result = MbtaTransitClient::parse_stops_response(json);
        assert!(matches!(result, Err(TransitError::ParseError(_))));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = MbtaTransitClient::parse_stops_response("not json");
        assert!(matches!(result, Err(TransitError::ParseError(_))));
    }

    #[test]
    fn test_stop_query_params() {
        let client = MbtaTransitClient::new(&TransitConfig::for_testing()).unwrap();
        let location = GeoLocation::new(42.2809, -71.2376).unwrap();
        let params = client.stop_query_params(location, 1);

        assert!(params.contains(&("sort", "distance".to_string())));
        assert!(params.contains(&("filter[latitude]", "42.2809".to_string())));
        assert!(params.contains(&("filter[longitude]", "-71.2376".to_string())));
        assert!(params.contains(&("page[limit]", "1".to_string())));
        assert!(params.contains(&("api_key", "test-api-key".to_string())));
        assert!(!params.iter().any(|(key, _)| *key == "filter[radius]"));
    }

    #[test]
    fn test_stop_query_params_with_radius() {
        let config = TransitConfig {
            radius_degrees: Some(0.05),
            ..TransitConfig::for_testing()
        };
        let client = MbtaTransitClient::new(&config).unwrap();
        let location = GeoLocation::new(42.2809, -71.2376).unwrap();
        let params = client.stop_query_params(location, 3);

        assert!(params.contains(&("filter[radius]", "0.05".to_string())));
    }

    #[tokio::test]
    async fn test_nearby_stops_rejects_limit_above_cap() {
        let client = MbtaTransitClient::new(&TransitConfig::for_testing()).unwrap();
        let location = GeoLocation::new(42.2809, -71.2376).unwrap();

        let result = client.nearby_stops(location, MAX_RESULTS_LIMIT + 1).await;
        assert!(
            matches!(result, Err(TransitError::InvalidRequest(ref msg)) if msg.contains("50 or less"))
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = TransitConfig::new("");
        let result = MbtaTransitClient::new(&config);
        assert!(matches!(result, Err(TransitError::ConfigurationError(_))));
    }
}
