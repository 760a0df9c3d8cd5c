use failure::Fail;

pub const DEFAULT_REFERENCE_LAT: f64 = 48.471207;
pub const DEFAULT_REFERENCE_LNG: f64 = 35.038810;
pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const MEAN_EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude and longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Fail, PartialEq)]
pub enum CoordinateError {
    #[fail(display = "Latitude {} is outside [-90, 90]", _0)]
    LatitudeOutOfRange(f64),
    #[fail(display = "Longitude {} is outside [-180, 180]", _0)]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Coordinate {
        Coordinate { lat, lng }
    }

    /// Like `new`, but rejects NaN, infinities and values outside the valid ranges.
    pub fn validated(lat: f64, lng: f64) -> Result<Coordinate, CoordinateError> {
        if !lat.is_finite() || lat < -90.0 || lat > 90.0 {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !lng.is_finite() || lng < -180.0 || lng > 180.0 {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        Ok(Coordinate { lat, lng })
    }
}

/// A named place loaded from the data source.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub coordinate: Coordinate,
}

#[cfg(test)]
impl Candidate {
    pub fn new<S: Into<String>>(name: S, lat: f64, lng: f64) -> Candidate {
        Candidate {
            name: name.into(),
            coordinate: Coordinate::new(lat, lng),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct PlaceDistance<'a> {
    pub name: &'a str,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderConfig {
    pub reference: Coordinate,
    pub radius_km: f64,
    pub earth_radius_km: f64,
}

impl Default for FinderConfig {
    fn default() -> FinderConfig {
        FinderConfig {
            reference: Coordinate::new(DEFAULT_REFERENCE_LAT, DEFAULT_REFERENCE_LNG),
            radius_km: DEFAULT_RADIUS_KM,
            earth_radius_km: MEAN_EARTH_RADIUS_KM,
        }
    }
}
