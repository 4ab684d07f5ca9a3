//! Nearest transit stop lookup
//!
//! Resolves a place name to the closest public transit stop and its
//! wheelchair-boarding status. Place names are geocoded through the
//! [Mapbox Geocoding API](https://docs.mapbox.com/api/search/geocoding/),
//! and stops are looked up through the [MBTA v3 API](https://api-v3.mbta.com)
//! sorted by distance from the geocoded point.
//!
//! # Architecture
//!
//! Each external service sits behind a client trait: [`GeocodingClient`]
//! (implemented by [`MapboxGeocodingClient`]) and [`TransitClient`]
//! (implemented by [`MbtaTransitClient`]). [`StopFinder`] chains the two.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_transit::{MapboxConfig, StopFinder, TransitConfig};
//!
//! let finder = StopFinder::from_configs(
//!     &MapboxConfig::new("pk.mapbox-token"),
//!     &TransitConfig::new("mbta-api-key"),
//! )?;
//!
//! let stop = finder.find_stop_near("Babson College").await?;
//! println!("{} - {}", stop.name, stop.wheelchair_boarding.label());
//! ```

mod client;
mod config;
mod error;
mod finder;
mod geocoding;
mod models;

pub use client::{MbtaTransitClient, TransitClient};
pub use config::TransitConfig;
pub use error::TransitError;
pub use finder::{FinderError, StopFinder, StopSearchResult};
pub use geocoding::{
    GeocodedPlace, GeocodingClient, GeocodingError, MapboxConfig, MapboxGeocodingClient,
};
pub use models::Stop;
