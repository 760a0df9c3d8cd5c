mod distance_filter;
mod place_finder_types;

pub use distance_filter::DistanceFilter;
pub use place_finder_types::{
    Candidate, Coordinate, CoordinateError, FinderConfig, PlaceDistance, DEFAULT_RADIUS_KM,
    DEFAULT_REFERENCE_LAT, DEFAULT_REFERENCE_LNG, MEAN_EARTH_RADIUS_KM,
};
