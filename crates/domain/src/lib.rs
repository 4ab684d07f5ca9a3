//! Domain layer for the stop finder
//!
//! Value objects shared by the geocoding and transit clients: validated
//! coordinates, the nearest-stop result, and the raw wheelchair-boarding
//! status code reported by the transit API. No I/O lives here.

pub mod value_objects;

pub use value_objects::*;
