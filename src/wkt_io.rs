//! Line based WKT reading and writing of street networks.

use std::{
    fs::{File, OpenOptions},
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use geo::{Geometry, LineString};
use log::{info, warn};
use streetmend_core::prelude::*;
use wkt::TryFromWkt;

/// Separator written before a block appended to an existing file
const APPEND_SEPARATOR: &str = "\n\n\n";

fn add_line_string(network: &mut StreetNetwork, line: &LineString<f64>) -> Option<StreetId> {
    if line.0.is_empty() {
        return None;
    }
    Some(network.add_polyline(line.coords().map(|c| (c.x, c.y))))
}

fn add_geometry(network: &mut StreetNetwork, geometry: &Geometry<f64>, line_no: usize) -> usize {
    match geometry {
        Geometry::LineString(line) => usize::from(add_line_string(network, line).is_some()),
        Geometry::MultiLineString(lines) => lines
            .iter()
            .filter_map(|line| add_line_string(network, line))
            .count(),
        Geometry::GeometryCollection(collection) => collection
            .iter()
            .map(|member| add_geometry(network, member, line_no))
            .sum(),
        _ => {
            warn!("Line {line_no}: ignoring geometry that is not a line string");
            0
        }
    }
}

fn paren_balance(text: &str) -> i64 {
    text.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}

/// Reads one street per `LINESTRING` (one per member of a
/// `MULTILINESTRING`). Geometries may span several lines.
///
/// Coordinates closer than `tolerance` to an already known point reuse
/// that landmark. Street ids are assigned in reading order starting at 0.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] naming the first line of a geometry that
/// cannot be parsed.
pub fn read_wkt<R: BufRead>(source: R, tolerance: f64) -> Result<StreetNetwork, Error> {
    let mut network = StreetNetwork::with_tolerance(tolerance);
    let mut pending = String::new();
    let mut pending_start = 0;

    for (index, line) in source.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() && pending.is_empty() {
            continue;
        }

        if pending.is_empty() {
            pending_start = index + 1;
        } else {
            pending.push(' ');
        }
        pending.push_str(trimmed);

        if paren_balance(&pending) > 0 {
            continue;
        }

        let geometry = Geometry::<f64>::try_from_wkt_str(&pending).map_err(|e| {
            Error::InvalidData(format!("Line {pending_start}: invalid WKT geometry: {e}"))
        })?;
        add_geometry(&mut network, &geometry, pending_start);
        pending.clear();
    }

    if !pending.is_empty() {
        return Err(Error::InvalidData(format!(
            "Line {pending_start}: unterminated WKT geometry"
        )));
    }

    info!(
        "Parsing wkt found {} streets and {} landmarks",
        network.street_count(),
        network.landmark_count()
    );
    Ok(network)
}

pub fn read_wkt_str(text: &str, tolerance: f64) -> Result<StreetNetwork, Error> {
    read_wkt(text.as_bytes(), tolerance)
}

pub fn read_wkt_file<P: AsRef<Path>>(path: P, tolerance: f64) -> Result<StreetNetwork, Error> {
    let path = path.as_ref();
    info!("Reading WKT from {}", path.display());
    read_wkt(BufReader::new(File::open(path)?), tolerance)
}

/// Writes one `LINESTRING (x y, x y, ...)` line per street in id order
pub fn write_wkt<W: Write>(network: &StreetNetwork, mut writer: W) -> Result<(), Error> {
    for street in network.streets.iter() {
        let coords = network.street_coords(street)?;
        let points = coords
            .iter()
            .map(|c| format!("{} {}", c.x, c.y))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(writer, "LINESTRING ({points})")?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the network to `path`, replacing the file unless `append` is set.
/// An appended block is separated from the existing content by blank lines.
pub fn write_wkt_file<P: AsRef<Path>>(
    network: &StreetNetwork,
    path: P,
    append: bool,
) -> Result<(), Error> {
    let path = path.as_ref();
    info!(
        "Writing {} streets as WKT to {}{}",
        network.street_count(),
        path.display(),
        if append { " (appending)" } else { "" }
    );

    let file = if append {
        OpenOptions::new().create(true).append(true).open(path)?
    } else {
        File::create(path)?
    };
    let mut writer = BufWriter::new(file);
    if append {
        writer.write_all(APPEND_SEPARATOR.as_bytes())?;
    }
    write_wkt(network, writer)
}
