use std::convert::TryInto;
use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::path::Path;
use std::str::FromStr;

use failure::Fail;
use geojson::Error as GeoJsonError;
use geojson::GeoJson;
use log::info;
use serde::Deserialize;

use super::place_finder::{Candidate, Coordinate, CoordinateError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    Json,
    Csv,
    GeoJson,
}

impl InputFormat {
    /// Guess the format from the file extension. Unknown extensions are read as JSON.
    pub fn from_path(path: &Path) -> InputFormat {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_ref()
            .map(String::as_str)
        {
            Some("csv") => InputFormat::Csv,
            Some("geojson") => InputFormat::GeoJson,
            _ => InputFormat::Json,
        }
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<InputFormat, String> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(InputFormat::Json),
            "csv" => Ok(InputFormat::Csv),
            "geojson" => Ok(InputFormat::GeoJson),
            other => Err(format!("Unknown input format '{}'", other)),
        }
    }
}

#[derive(Debug, Fail)]
pub enum PlacesLoaderError {
    #[fail(display = "Data file not found: {}", _0)]
    NotFound(String),
    #[fail(display = "I/O error: {}", _0)]
    Io(io::Error),
    #[fail(display = "JSON error: {}", _0)]
    Json(serde_json::Error),
    #[fail(display = "Csv error: {}", _0)]
    Csv(csv::Error),
    #[fail(display = "GeoJSON error: {}", _0)]
    GeoJson(GeoJsonError),
    #[fail(display = "Feature collection not found")]
    FeatureCollectionNotFound,
    #[fail(display = "Invalid feature: {}", _0)]
    InvalidFeature(String),
    #[fail(display = "Invalid coordinate for '{}': {}", name, reason)]
    InvalidCoordinate { name: String, reason: CoordinateError },
}

impl From<io::Error> for PlacesLoaderError {
    fn from(err: io::Error) -> PlacesLoaderError {
        PlacesLoaderError::Io(err)
    }
}

impl From<serde_json::Error> for PlacesLoaderError {
    fn from(err: serde_json::Error) -> PlacesLoaderError {
        PlacesLoaderError::Json(err)
    }
}

impl From<csv::Error> for PlacesLoaderError {
    fn from(err: csv::Error) -> PlacesLoaderError {
        PlacesLoaderError::Csv(err)
    }
}

impl From<GeoJsonError> for PlacesLoaderError {
    fn from(err: GeoJsonError) -> PlacesLoaderError {
        PlacesLoaderError::GeoJson(err)
    }
}

// Places API shaped document: {"candidates": [{"name", "geometry": {"location": {"lat", "lng"}}}]}
#[derive(Deserialize)]
struct PlacesDocument {
    candidates: Vec<PlaceRecord>,
}

#[derive(Deserialize)]
struct PlaceRecord {
    name: String,
    geometry: PlaceGeometry,
}

#[derive(Deserialize)]
struct PlaceGeometry {
    location: PlaceLocation,
}

#[derive(Deserialize)]
struct PlaceLocation {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct CsvRecord {
    name: String,
    lat: f64,
    lng: f64,
}

fn validated_candidate(name: String, lat: f64, lng: f64) -> Result<Candidate, PlacesLoaderError> {
    match Coordinate::validated(lat, lng) {
        Ok(coordinate) => Ok(Candidate { name, coordinate }),
        Err(reason) => Err(PlacesLoaderError::InvalidCoordinate { name, reason }),
    }
}

pub fn parse_json(json_str: &str) -> Result<Vec<Candidate>, PlacesLoaderError> {
    let document: PlacesDocument = serde_json::from_str(json_str)?;

    document
        .candidates
        .into_iter()
        .map(|place| {
            let location = place.geometry.location;
            validated_candidate(place.name, location.lat, location.lng)
        })
        .collect()
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Candidate>, PlacesLoaderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut candidates = Vec::new();
    for record in csv_reader.deserialize() {
        let record: CsvRecord = record?;
        candidates.push(validated_candidate(record.name, record.lat, record.lng)?);
    }

    Ok(candidates)
}

fn candidate_from_feature(feature: geojson::Feature) -> Result<Candidate, PlacesLoaderError> {
    let name = match feature
        .properties
        .as_ref()
        .and_then(|props| props.get("name"))
    {
        Some(serde_json::Value::String(name)) => name.clone(),
        Some(other) => {
            return Err(PlacesLoaderError::InvalidFeature(format!(
                "name is not a string: {}",
                other
            )))
        }
        None => {
            return Err(PlacesLoaderError::InvalidFeature(
                "missing name property".to_owned(),
            ))
        }
    };

    let geometry = feature.geometry.ok_or_else(|| {
        PlacesLoaderError::InvalidFeature(format!("'{}' has no geometry", name))
    })?;

    let point: geo_types::Point<f64> = match geometry.value {
        geojson::Value::Point(_) => geometry.value.try_into()?,
        _ => {
            return Err(PlacesLoaderError::InvalidFeature(format!(
                "'{}' is not a point",
                name
            )))
        }
    };

    // GeoJSON positions are [longitude, latitude].
    validated_candidate(name, point.y(), point.x())
}

pub fn parse_geojson(geo_json_str: &str) -> Result<Vec<Candidate>, PlacesLoaderError> {
    let geo_json = geo_json_str.parse::<GeoJson>()?;

    let feature_collection = if let GeoJson::FeatureCollection(ctn) = geo_json {
        ctn
    } else {
        return Err(PlacesLoaderError::FeatureCollectionNotFound);
    };

    feature_collection
        .features
        .into_iter()
        .map(candidate_from_feature)
        .collect()
}

/// Read every candidate from `path`, in file order.
pub fn load_places(path: &Path, format: InputFormat) -> Result<Vec<Candidate>, PlacesLoaderError> {
    let mut file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => PlacesLoaderError::NotFound(path.display().to_string()),
        _ => PlacesLoaderError::Io(err),
    })?;

    info!("Reading {:?} places from {}", format, path.display());

    match format {
        InputFormat::Csv => parse_csv(io::BufReader::new(file)),
        InputFormat::Json | InputFormat::GeoJson => {
            let mut file_contents = String::new();
            file.read_to_string(&mut file_contents)?;

            if format == InputFormat::Json {
                parse_json(&file_contents)
            } else {
                parse_geojson(&file_contents)
            }
        }
    }
}
