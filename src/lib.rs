//! Readers, writers and exports around the `streetmend_core` pipeline.

use std::path::Path;

pub mod export;
pub mod geometry_dump;
pub mod osm_xml;
pub mod projection;
pub mod wkt_io;

pub use export::GraphExport;
pub use geometry_dump::GeometryFormat;
pub use streetmend_core::prelude::*;

/// Input file kind, decided by the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `OpenStreetMap` XML with geographic coordinates
    Osm,
    /// Planar `LINESTRING` geometries
    Wkt,
}

impl InputFormat {
    /// Recognizes `.osm` and `.wkt` regardless of case
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "osm" => Some(Self::Osm),
            "wkt" => Some(Self::Wkt),
            _ => None,
        }
    }

    /// Planar input gets a second repair after the bogus edge filter unless
    /// the configuration already decided
    pub fn apply_defaults(self, config: &mut PipelineConfig) {
        config
            .repair_after_filter
            .get_or_insert(matches!(self, Self::Wkt));
    }
}

/// Reads `path` into a planar street network.
///
/// OSM input is projected onto the plane right away.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_network(
    path: &Path,
    format: InputFormat,
    tolerance: f64,
) -> Result<StreetNetwork, Error> {
    match format {
        InputFormat::Osm => {
            let mut network = osm_xml::read_osm_file(path, tolerance)?;
            projection::project_to_plane(&mut network)?;
            Ok(network)
        }
        InputFormat::Wkt => wkt_io::read_wkt_file(path, tolerance),
    }
}
