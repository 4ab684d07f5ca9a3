//! Transit data models

use std::fmt;

use domain::{GeoLocation, NearestStop, WheelchairBoarding};
use serde::{Deserialize, Serialize};

/// A transit stop as returned by the MBTA stops API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stop {
    /// Unique stop identifier (e.g. `place-sstat`)
    pub id: String,
    /// Human-readable stop name
    pub name: String,
    /// Accessibility code as reported by the API
    pub wheelchair_boarding: WheelchairBoarding,
    /// Latitude coordinate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude coordinate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Municipality the stop belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
}

impl Stop {
    /// Location of the stop, if the API returned valid coordinates
    #[must_use]
    pub fn location(&self) -> Option<GeoLocation> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => GeoLocation::new(lat, lon).ok(),
            _ => None,
        }
    }

    /// Great-circle distance from `origin` in kilometers
    #[must_use]
    pub fn distance_km_from(&self, origin: &GeoLocation) -> Option<f64> {
        self.location().map(|loc| origin.distance_km(&loc))
    }

    /// Format as a compact one-line summary
    #[must_use]
    pub fn format_summary(&self) -> String {
        let place = self
            .municipality
            .as_deref()
            .map(|m| format!(", {m}"))
            .unwrap_or_default();
        format!(
            "{}{place} [{}]",
            self.name,
            self.wheelchair_boarding.label()
        )
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}

impl From<Stop> for NearestStop {
    fn from(stop: Stop) -> Self {
        Self::new(stop.name, stop.wheelchair_boarding)
    }
}
