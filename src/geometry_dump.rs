//! Writers for the repaired street geometry.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    str::FromStr,
};

use geo::LineString;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use log::info;
use serde_json::json;
use streetmend_core::prelude::*;

use crate::wkt_io;

/// Output format of the street geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryFormat {
    #[default]
    Wkt,
    GeoJson,
}

impl FromStr for GeometryFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "wkt" => Ok(Self::Wkt),
            "geojson" | "json" => Ok(Self::GeoJson),
            other => Err(Error::InvalidData(format!(
                "Unknown geometry format '{other}', expected wkt or geojson"
            ))),
        }
    }
}

impl GeometryFormat {
    /// Writes the geometry of every street to `path`.
    ///
    /// `append` only applies to WKT, a GeoJSON document is always replaced.
    pub fn write_file<P: AsRef<Path>>(
        self,
        network: &StreetNetwork,
        path: P,
        append: bool,
    ) -> Result<(), Error> {
        match self {
            Self::Wkt => wkt_io::write_wkt_file(network, path, append),
            Self::GeoJson => {
                let path = path.as_ref();
                info!(
                    "Writing {} streets as GeoJSON to {}",
                    network.street_count(),
                    path.display()
                );
                let mut writer = BufWriter::new(File::create(path)?);
                writer.write_all(to_geojson_string(network)?.as_bytes())?;
                writer.flush()?;
                Ok(())
            }
        }
    }
}

fn street_feature(network: &StreetNetwork, street: &Street) -> Result<Feature, Error> {
    let line = LineString::new(network.street_coords(street)?);
    let geometry = Geometry::new(GeoJsonValue::from(&line));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "street_id": street.id,
            "landmarks": street.landmarks,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

/// Converts every street to a `LineString` feature
pub fn to_geojson(network: &StreetNetwork) -> Result<FeatureCollection, Error> {
    let features = network
        .streets
        .iter()
        .map(|street| street_feature(network, street))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

pub fn to_geojson_string(network: &StreetNetwork) -> Result<String, Error> {
    serde_json::to_string(&to_geojson(network)?).map_err(|e| Error::GeoJsonError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_per_street() {
        let mut network = StreetNetwork::default();
        network.add_polyline([(0.0, 0.0), (5.0, 5.0)]);
        network.add_polyline([(5.0, 5.0), (10.0, 0.0)]);

        let collection = to_geojson(&network).unwrap();
        assert_eq!(collection.features.len(), 2);

        let second = &collection.features[1];
        assert_eq!(second.property("street_id"), Some(&json!(1)));
        assert_eq!(second.property("landmarks"), Some(&json!([2, 3])));
        let geometry = serde_json::to_value(second.geometry.as_ref().unwrap()).unwrap();
        assert_eq!(geometry["type"], json!("LineString"));
        assert_eq!(geometry["coordinates"], json!([[5.0, 5.0], [10.0, 0.0]]));
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("WKT".parse::<GeometryFormat>().unwrap(), GeometryFormat::Wkt);
        assert_eq!(
            "geojson".parse::<GeometryFormat>().unwrap(),
            GeometryFormat::GeoJson
        );
        assert!("shp".parse::<GeometryFormat>().is_err());
    }
}
