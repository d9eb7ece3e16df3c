//! `OpenStreetMap` XML reader.
//!
//! Only `<node>` and `<way>` elements are of interest. Nodes become
//! landmarks carrying their geographic origin, ways become streets
//! referencing them by OSM id. Planar positions are assigned later by
//! [`project_to_plane`](crate::projection::project_to_plane).

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{info, warn};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use streetmend_core::prelude::*;

const TAG_OSM: &[u8] = b"osm";
const TAG_NODE: &[u8] = b"node";
const TAG_WAY: &[u8] = b"way";
const TAG_ND: &[u8] = b"nd";

fn xml_error(err: impl std::fmt::Display) -> Error {
    Error::XmlError(err.to_string())
}

fn attr_value(event: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, Error> {
    for attr in event.attributes().with_checks(false) {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value().map_err(xml_error)?.to_string()));
        }
    }
    Ok(None)
}

fn parsed_attr<T: std::str::FromStr>(
    event: &BytesStart<'_>,
    key: &[u8],
) -> Result<Option<T>, Error> {
    Ok(attr_value(event, key)?.and_then(|value| value.parse::<T>().ok()))
}

/// Way under construction, `None` id means the way is skipped
struct PendingWay {
    id: Option<StreetId>,
    refs: Vec<LandmarkId>,
}

#[derive(Default)]
struct OsmCollector {
    network: StreetNetwork,
    current_way: Option<PendingWay>,
    skipped_nodes: usize,
    skipped_ways: usize,
}

impl OsmCollector {
    fn node(&mut self, event: &BytesStart<'_>) -> Result<(), Error> {
        let id = parsed_attr::<LandmarkId>(event, b"id")?;
        let lat = parsed_attr::<f64>(event, b"lat")?;
        let lon = parsed_attr::<f64>(event, b"lon")?;

        if let (Some(id), Some(lat), Some(lon)) = (id, lat, lon) {
            self.network
                .landmarks
                .insert(Landmark::with_origin(id, lat, lon));
        } else {
            warn!("Missing or invalid attribute in node {id:?}, skipping");
            self.skipped_nodes += 1;
        }
        Ok(())
    }

    fn start_way(&mut self, event: &BytesStart<'_>) -> Result<(), Error> {
        let id = parsed_attr::<StreetId>(event, b"id")?;
        if id.is_none() {
            warn!("Missing or invalid id attribute in way, skipping");
        }
        self.current_way = Some(PendingWay {
            id,
            refs: Vec::new(),
        });
        Ok(())
    }

    fn nd(&mut self, event: &BytesStart<'_>) -> Result<(), Error> {
        let Some(way) = self.current_way.as_mut() else {
            return Ok(());
        };
        match parsed_attr::<LandmarkId>(event, b"ref")? {
            Some(reference) => way.refs.push(reference),
            None => warn!("Missing or invalid ref attribute in way {:?}", way.id),
        }
        Ok(())
    }

    fn end_way(&mut self) {
        let Some(way) = self.current_way.take() else {
            return;
        };
        match way.id {
            Some(id) if !way.refs.is_empty() => {
                self.network.streets.insert(Street::new(id, way.refs));
            }
            Some(id) => {
                warn!("Found no landmark references for way {id}, skipping");
                self.skipped_ways += 1;
            }
            None => self.skipped_ways += 1,
        }
    }
}

/// Reads nodes and ways from an OSM XML document.
///
/// # Errors
///
/// Returns [`Error::XmlError`] on malformed XML and [`Error::InvalidData`]
/// if the root element is not `osm`.
pub fn read_osm<R: BufRead>(source: R, tolerance: f64) -> Result<StreetNetwork, Error> {
    let mut reader = Reader::from_reader(source);
    reader.trim_text(true);

    let mut collector = OsmCollector {
        network: StreetNetwork::with_tolerance(tolerance),
        ..OsmCollector::default()
    };
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(xml_error)?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = e.name().as_ref().to_vec();
                if !seen_root {
                    if name != TAG_OSM {
                        return Err(Error::InvalidData(format!(
                            "Invalid osm file, root element is {} but should be osm",
                            String::from_utf8_lossy(&name)
                        )));
                    }
                    seen_root = true;
                }

                let empty = matches!(event, Event::Empty(_));
                match name.as_slice() {
                    TAG_NODE => collector.node(e)?,
                    TAG_WAY => {
                        collector.start_way(e)?;
                        if empty {
                            collector.end_way();
                        }
                    }
                    TAG_ND => collector.nd(e)?,
                    _ => {}
                }
            }
            Event::End(ref e) => {
                if e.name().as_ref() == TAG_WAY {
                    collector.end_way();
                }
            }
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(Error::InvalidData(
            "Invalid osm file, no root element found".to_string(),
        ));
    }

    info!(
        "Parsing osm found {} streets and {} landmarks ({} nodes and {} ways skipped)",
        collector.network.street_count(),
        collector.network.landmark_count(),
        collector.skipped_nodes,
        collector.skipped_ways
    );

    Ok(collector.network)
}

pub fn read_osm_str(document: &str, tolerance: f64) -> Result<StreetNetwork, Error> {
    read_osm(document.as_bytes(), tolerance)
}

pub fn read_osm_file<P: AsRef<Path>>(path: P, tolerance: f64) -> Result<StreetNetwork, Error> {
    let path = path.as_ref();
    info!("Reading OpenStreetMap XML from {}", path.display());
    let file = File::open(path)?;
    read_osm(BufReader::new(file), tolerance)
}
