//! Nearest stop result

use serde::{Deserialize, Serialize};
use std::fmt;

use super::WheelchairBoarding;

/// The stop closest to a queried location, with its accessibility status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearestStop {
    /// Human-readable stop name
    pub name: String,
    /// Accessibility code as reported by the transit API
    pub wheelchair_boarding: WheelchairBoarding,
}

impl NearestStop {
    /// Create a new result
    pub fn new(name: impl Into<String>, wheelchair_boarding: WheelchairBoarding) -> Self {
        Self {
            name: name.into(),
            wheelchair_boarding,
        }
    }
}

impl fmt::Display for NearestStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.wheelchair_boarding.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_name_and_label() {
        let stop = NearestStop::new("Wellesley Farms", WheelchairBoarding::INACCESSIBLE);
        assert_eq!(
            stop.to_string(),
            "Wellesley Farms (Not wheelchair accessible)"
        );
    }

    #[test]
    fn serializes_raw_code() {
        let stop = NearestStop::new("Needham Center", WheelchairBoarding::ACCESSIBLE);
        let json = serde_json::to_value(&stop).expect("serialize");
        assert_eq!(json["name"], "Needham Center");
        assert_eq!(json["wheelchair_boarding"], 1);
    }
}
