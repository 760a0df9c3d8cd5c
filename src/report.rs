use std::io;
use std::str::FromStr;

use failure::Fail;

use super::place_finder::PlaceDistance;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<OutputFormat, String> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format '{}'", other)),
        }
    }
}

#[derive(Debug, Fail)]
pub enum ReportError {
    #[fail(display = "I/O error: {}", _0)]
    Io(io::Error),
    #[fail(display = "Csv error: {}", _0)]
    Csv(csv::Error),
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> ReportError {
        ReportError::Io(err)
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> ReportError {
        ReportError::Csv(err)
    }
}

fn write_text<W: io::Write + ?Sized>(
    output: &mut W,
    results: &[PlaceDistance],
    radius_km: f64,
    origin_label: &str,
) -> io::Result<()> {
    // {:?} keeps the decimal point on whole radii ("5.0", not "5").
    if results.is_empty() {
        return writeln!(output, "No places found within {:?} km.", radius_km);
    }

    writeln!(output, "Places within {:?} km from {}:", radius_km, origin_label)?;
    for result in results {
        writeln!(output, "{}: {:.2} km", result.name, result.distance_km)?;
    }

    Ok(())
}

fn write_csv<W: io::Write + ?Sized>(output: &mut W, results: &[PlaceDistance]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(output);

    csv_writer.write_record(&["name", "distance_km"])?;
    for result in results {
        csv_writer.write_record(&[
            result.name.to_owned(),
            format!("{:.2}", result.distance_km),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_report<W: io::Write + ?Sized>(
    output: &mut W,
    results: &[PlaceDistance],
    radius_km: f64,
    origin_label: &str,
    format: OutputFormat,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Text => write_text(output, results, radius_km, origin_label)?,
        OutputFormat::Csv => write_csv(output, results)?,
    }
    Ok(())
}
