//! Place name to nearest stop pipeline

use std::fmt;
use std::sync::Arc;

use domain::NearestStop;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::client::{MbtaTransitClient, TransitClient};
use crate::config::TransitConfig;
use crate::error::TransitError;
use crate::geocoding::{
    GeocodedPlace, GeocodingClient, GeocodingError, MapboxConfig, MapboxGeocodingClient,
};
use crate::models::Stop;

/// Errors from either stage of the pipeline, passed through unchanged
#[derive(Debug, Error)]
pub enum FinderError {
    /// The place name could not be geocoded
    #[error(transparent)]
    Geocoding(#[from] GeocodingError),

    /// The stop lookup failed
    #[error(transparent)]
    Lookup(#[from] TransitError),
}

impl FinderError {
    /// Returns true if the underlying error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Geocoding(e) => e.is_retryable(),
            Self::Lookup(e) => e.is_retryable(),
        }
    }
}

/// Geocoded place together with the stop found nearest to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopSearchResult {
    /// The place the name resolved to
    pub place: GeocodedPlace,
    /// The nearest stop to that place
    pub stop: NearestStop,
}

/// Chains a geocoder and a transit client
pub struct StopFinder {
    geocoder: Arc<dyn GeocodingClient>,
    transit: Arc<dyn TransitClient>,
}

impl fmt::Debug for StopFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopFinder").finish_non_exhaustive()
    }
}

impl StopFinder {
    /// Create a finder over arbitrary client implementations
    pub fn new(geocoder: Arc<dyn GeocodingClient>, transit: Arc<dyn TransitClient>) -> Self {
        Self { geocoder, transit }
    }

    /// Create a finder backed by Mapbox and the MBTA API
    ///
    /// # Errors
    ///
    /// Returns an error if either client rejects its configuration.
    pub fn from_configs(
        mapbox: &MapboxConfig,
        transit: &TransitConfig,
    ) -> Result<Self, FinderError> {
        let geocoder = MapboxGeocodingClient::new(mapbox)?;
        let transit = MbtaTransitClient::new(transit)?;
        Ok(Self::new(Arc::new(geocoder), Arc::new(transit)))
    }

    /// Resolve a place name to its nearest stop and accessibility status
    #[instrument(skip(self))]
    pub async fn find_stop_near(&self, place_name: &str) -> Result<NearestStop, FinderError> {
        Ok(self.search(place_name).await?.stop)
    }

    /// Resolve a place name and keep the geocoded place alongside the stop
    #[instrument(skip(self))]
    pub async fn search(&self, place_name: &str) -> Result<StopSearchResult, FinderError> {
        let place = self.geocoder.geocode(place_name).await?;
        debug!(location = %place.location, "Place resolved, looking up nearest stop");

        let stop = self.transit.nearest_stop(place.location).await?;
        Ok(StopSearchResult { place, stop })
    }

    /// Resolve a place name to up to `max_results` nearby stops, closest first
    #[instrument(skip(self))]
    pub async fn stops_near(
        &self,
        place_name: &str,
        max_results: u8,
    ) -> Result<(GeocodedPlace, Vec<Stop>), FinderError> {
        let place = self.geocoder.geocode(place_name).await?;
        let stops = self.transit.nearby_stops(place.location, max_results).await?;
        Ok((place, stops))
    }
}
