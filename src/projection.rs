//! Planar projection of geographic landmarks

use log::info;
use streetmend_core::prelude::*;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in meters, rounded to [`DEFAULT_PRECISION`] decimals
pub fn haversine_distance(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let delta_lat = (lat2_deg - lat1_deg).to_radians();
    let delta_lon = (lon2_deg - lon1_deg).to_radians();

    let a =
        (delta_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_half_up(EARTH_RADIUS_KM * c * 1000.0, DEFAULT_PRECISION)
}

/// Assigns planar positions to every landmark with a geographic origin.
///
/// The origin of the plane is the south-west corner of the landmark
/// extent: `x` is the distance to the western edge along the landmark's
/// parallel, `y` the distance to the southern edge along its meridian.
/// Landmarks without a geographic origin keep their position.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] if no landmark carries a geographic origin.
pub fn project_to_plane(network: &mut StreetNetwork) -> Result<GeoBounds, Error> {
    let bounds = network.landmarks.bounding_box().ok_or_else(|| {
        Error::InvalidData("No landmark with geographic coordinates to project".to_string())
    })?;

    info!(
        "Transforming coordinates, latitude from {} to {}, longitude from {} to {}",
        bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon
    );
    let width = haversine_distance(bounds.min_lat, bounds.min_lon, bounds.min_lat, bounds.max_lon);
    let height = haversine_distance(bounds.min_lat, bounds.min_lon, bounds.max_lat, bounds.min_lon);
    info!("Map area is {width}m wide and {height}m high");

    network.landmarks.reposition(|landmark| match landmark.origin {
        Some(GeoOrigin { lat, lon }) => geo::Coord {
            x: haversine_distance(lat, lon, lat, bounds.min_lon),
            y: haversine_distance(lat, lon, bounds.min_lat, lon),
        },
        None => landmark.position,
    });

    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude() {
        let distance = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((distance - 111_194.927).abs() < 1e-3);
        assert_eq!(haversine_distance(10.0, 20.0, 10.0, 20.0), 0.0);
    }

    #[test]
    fn south_west_corner_is_origin() {
        let mut network = StreetNetwork::default();
        network.landmarks.insert(Landmark::with_origin(1, 52.0, 13.0));
        network.landmarks.insert(Landmark::with_origin(2, 52.01, 13.0));
        network.landmarks.insert(Landmark::with_origin(3, 52.0, 13.01));

        let bounds = project_to_plane(&mut network).unwrap();
        assert_eq!(bounds.min_lat, 52.0);
        assert_eq!(bounds.max_lon, 13.01);

        assert_eq!(network.landmarks.position(1), Some(geo::Coord { x: 0.0, y: 0.0 }));

        let north = network.landmarks.position(2).unwrap();
        assert_eq!(north.x, 0.0);
        assert!((north.y - 1111.949).abs() < 1e-3);

        let east = network.landmarks.position(3).unwrap();
        assert_eq!(east.y, 0.0);
        assert!(east.x > 680.0 && east.x < 690.0);

        // the spatial index follows the new positions
        assert_eq!(network.landmarks.find_near(north.x, north.y), Some(2));
    }

    #[test]
    fn nothing_to_project() {
        let mut network = StreetNetwork::default();
        network.add_polyline([(0.0, 0.0), (1.0, 1.0)]);
        assert!(matches!(
            project_to_plane(&mut network),
            Err(Error::InvalidData(_))
        ));
    }
}
