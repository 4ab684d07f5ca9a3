//! Wheelchair boarding status value object
//!
//! Carries the accessibility code exactly as the transit API reports it.
//! The code is never remapped; [`WheelchairBoarding::label`] only describes
//! the standard GTFS meanings for display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw GTFS `wheelchair_boarding` status code of a stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WheelchairBoarding(u8);

impl WheelchairBoarding {
    /// Code for "no accessibility information"
    pub const NO_INFORMATION: Self = Self(0);
    /// Code for "accessible"
    pub const ACCESSIBLE: Self = Self(1);
    /// Code for "not accessible"
    pub const INACCESSIBLE: Self = Self(2);

    /// Wrap a status code as returned by the API
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        Self(code)
    }

    /// The status code as returned by the API
    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Whether the stop reports step-free boarding
    #[must_use]
    pub const fn is_accessible(self) -> bool {
        self.0 == Self::ACCESSIBLE.0
    }

    /// Human-readable description of the code
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self.0 {
            0 => "No accessibility information",
            1 => "Wheelchair accessible",
            2 => "Not wheelchair accessible",
            _ => "Unknown accessibility status",
        }
    }
}

impl fmt::Display for WheelchairBoarding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.0)
    }
}
