#[macro_use]
extern crate clap;
use clap::{App, Arg, ArgMatches};

use failure::{Error, Fail};

use log::{error, info};
use simplelog;
use std::env;
use std::io;
use std::path::Path;

mod cli_utils;
mod place_finder;
mod places_loader;
mod report;

use chrono::offset::Local;

use place_finder::{
    Coordinate, CoordinateError, DistanceFilter, FinderConfig, DEFAULT_RADIUS_KM,
    DEFAULT_REFERENCE_LAT, DEFAULT_REFERENCE_LNG, MEAN_EARTH_RADIUS_KM,
};
use places_loader::InputFormat;
use report::OutputFormat;

const DEFAULT_ORIGIN_LABEL: &str = "Apriorit office";

#[derive(Debug, Fail)]
pub enum ConfigError {
    #[fail(display = "Radius must be a non-negative number of kilometers, got {}", _0)]
    InvalidRadius(f64),
    #[fail(display = "Earth radius must be a positive number of kilometers, got {}", _0)]
    InvalidEarthRadius(f64),
    #[fail(display = "Invalid reference point: {}", _0)]
    InvalidReference(CoordinateError),
    #[fail(display = "{}", _0)]
    InvalidFormat(String),
}

fn main() {
    let matches = build_app().get_matches();

    let log_level = if matches.is_present("verbose") {
        simplelog::LevelFilter::Debug
    } else if matches.is_present("quiet") {
        simplelog::LevelFilter::Warn
    } else {
        simplelog::LevelFilter::Info
    };
    init_logging(log_level);

    std::process::exit(exit_code(do_main(&matches)));
}

fn log_config() -> simplelog::Config {
    let local_time = Local::now();
    let time_offset = local_time.offset();
    simplelog::Config {
        offset: time_offset.clone(),
        ..simplelog::Config::default()
    }
}

/// TermLogger needs terminfo. Without TERM, or with a dumb one, it either fails
/// to start or truncates its lines.
fn is_capable_terminal(term: Option<&str>) -> bool {
    match term {
        Some(name) => !name.is_empty() && name != "dumb",
        None => cfg!(windows),
    }
}

fn init_logging(log_level: simplelog::LevelFilter) {
    let term = env::var("TERM").ok();
    let term_logger_ready = is_capable_terminal(term.as_ref().map(String::as_str))
        && simplelog::TermLogger::init(log_level, log_config(), simplelog::TerminalMode::Stderr)
            .is_ok();

    if !term_logger_ready {
        simplelog::WriteLogger::init(log_level, log_config(), io::stderr()).ok();
    }
}

fn exit_code(outcome: Result<(), Error>) -> i32 {
    match outcome {
        Ok(_) => {
            info!("Process finished OK");
            0
        }
        Err(err) => {
            error!("Process finished with an error: {}", err);
            1
        }
    }
}

fn build_app() -> App<'static, 'static> {
    App::new("places_near_me")
        .version("0.1.0")
        .author("Gustavo Ajzenman")
        .about("Lists the places within a radius of a reference point, nearest first")
        .arg(Arg::with_name("data")
            .short("d")
            .long("data")
            .help("Path of the places file")
            .takes_value(true)
            .default_value("data.json")
        )
        .arg(Arg::with_name("format")
            .short("f")
            .long("format")
            .help("Format of the places file. Guessed from the extension if omitted.")
            .takes_value(true)
            .possible_values(&["json", "csv", "geojson"])
        )
        .arg(Arg::with_name("radius")
            .short("r")
            .long("radius")
            .help("Search radius in kilometers")
            .takes_value(true)
            .allow_hyphen_values(true)
            .default_value("5.0")
        )
        .arg(Arg::with_name("lat")
            .long("lat")
            .help("Latitude of the reference point, decimal degrees")
            .takes_value(true)
            .allow_hyphen_values(true)
        )
        .arg(Arg::with_name("lng")
            .long("lng")
            .help("Longitude of the reference point, decimal degrees")
            .takes_value(true)
            .allow_hyphen_values(true)
        )
        .arg(Arg::with_name("earth-radius")
            .long("earth-radius")
            .help("Sphere radius used for distances, in kilometers")
            .takes_value(true)
            .default_value("6371.0")
        )
        .arg(Arg::with_name("label")
            .long("label")
            .help("Name of the reference point used in the report header. \
                   Defaults to the office for the default point, to the coordinates otherwise.")
            .takes_value(true)
        )
        .arg(Arg::with_name("output")
            .short("o")
            .long("output")
            .help("Report format")
            .takes_value(true)
            .possible_values(&["text", "csv"])
            .default_value("text")
        )
        .arg(Arg::with_name("quiet")
            .short("q")
            .long("quiet")
            .help("Only log warnings and errors. No spinner.")
            .conflicts_with("verbose")
        )
        .arg(Arg::with_name("verbose")
            .short("v")
            .long("verbose")
            .help("Log the distance of every candidate")
        )
}

fn finder_config(matches: &ArgMatches) -> Result<FinderConfig, Error> {
    let radius_km = match matches.value_of("radius") {
        Some(_) => value_t!(matches, "radius", f64)?,
        None => DEFAULT_RADIUS_KM,
    };
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(ConfigError::InvalidRadius(radius_km).into());
    }

    let earth_radius_km = match matches.value_of("earth-radius") {
        Some(_) => value_t!(matches, "earth-radius", f64)?,
        None => MEAN_EARTH_RADIUS_KM,
    };
    if !earth_radius_km.is_finite() || earth_radius_km <= 0.0 {
        return Err(ConfigError::InvalidEarthRadius(earth_radius_km).into());
    }

    let lat = match matches.value_of("lat") {
        Some(_) => value_t!(matches, "lat", f64)?,
        None => DEFAULT_REFERENCE_LAT,
    };
    let lng = match matches.value_of("lng") {
        Some(_) => value_t!(matches, "lng", f64)?,
        None => DEFAULT_REFERENCE_LNG,
    };
    let reference = Coordinate::validated(lat, lng).map_err(ConfigError::InvalidReference)?;

    Ok(FinderConfig {
        reference,
        radius_km,
        earth_radius_km,
    })
}

fn find_command(
    filter: &DistanceFilter,
    data_path: &Path,
    input_format: InputFormat,
    origin_label: &str,
    output_format: OutputFormat,
    quiet: bool,
    output_file: &mut dyn io::Write,
) -> Result<(), Error> {
    let spinner = cli_utils::create_spinner(quiet, &format!("Loading {}...", data_path.display()));
    spinner.enable_steady_tick(100);
    let load_result = places_loader::load_places(data_path, input_format);
    spinner.finish_and_clear();

    let candidates = load_result?;
    info!("Loaded {} places from {}", candidates.len(), data_path.display());

    let config = filter.config();
    let results = filter.find_within_radius(&candidates);
    info!(
        "{} of {} places within {} km of ({}, {})",
        results.len(),
        candidates.len(),
        config.radius_km,
        config.reference.lat,
        config.reference.lng
    );

    report::write_report(output_file, &results, config.radius_km, origin_label, output_format)?;

    Ok(())
}

fn do_main(matches: &ArgMatches) -> Result<(), Error> {
    let config = finder_config(matches)?;

    let data_path = Path::new(matches.value_of("data").unwrap_or_default());

    let input_format = match matches.value_of("format") {
        Some(name) => name.parse::<InputFormat>().map_err(ConfigError::InvalidFormat)?,
        None => InputFormat::from_path(data_path),
    };
    let output_format = matches
        .value_of("output")
        .unwrap_or_default()
        .parse::<OutputFormat>()
        .map_err(ConfigError::InvalidFormat)?;

    let origin_label = origin_label(matches, &config);

    let stdout = io::stdout();
    let mut output_file = stdout.lock();

    return find_command(
        &DistanceFilter::new(config),
        data_path,
        input_format,
        &origin_label,
        output_format,
        matches.is_present("quiet"),
        &mut output_file,
    );
}

fn origin_label(matches: &ArgMatches, config: &FinderConfig) -> String {
    match matches.value_of("label") {
        Some(label) => label.to_owned(),
        None if config.reference == FinderConfig::default().reference => {
            DEFAULT_ORIGIN_LABEL.to_owned()
        }
        None => format!("({}, {})", config.reference.lat, config.reference.lng),
    }
}
