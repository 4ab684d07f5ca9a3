//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod nearest_stop;
mod wheelchair_boarding;

pub use geo_location::{GeoLocation, InvalidCoordinates};
pub use nearest_stop::NearestStop;
pub use wheelchair_boarding::WheelchairBoarding;
