//! Landmarks (street network points) and their coordinate based identity

use std::collections::BTreeMap;

use geo::Coord;
use rstar::{AABB, RTree, primitives::GeomWithData};
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_TOLERANCE, LandmarkId};

/// Geographic position a landmark was projected from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoOrigin {
    pub lat: f64,
    pub lon: f64,
}

/// Geographic extent of all landmarks carrying a [`GeoOrigin`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Street network point
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub id: LandmarkId,
    /// Planar coordinates in meters
    pub position: Coord<f64>,
    /// Kept only for traceability, never used by the topology algorithms
    pub origin: Option<GeoOrigin>,
}

impl Landmark {
    pub fn new(id: LandmarkId, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Coord { x, y },
            origin: None,
        }
    }

    pub fn with_origin(id: LandmarkId, lat: f64, lon: f64) -> Self {
        Self {
            id,
            position: Coord { x: 0.0, y: 0.0 },
            origin: Some(GeoOrigin { lat, lon }),
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }
}

/// Landmark position indexed in the R-tree
pub type IndexedLandmark = GeomWithData<[f64; 2], LandmarkId>;

/// Owner of all landmarks.
///
/// Landmarks closer than the tolerance in both axes are treated as the same
/// point by [`LandmarkStore::insert_or_get`]. The relation is not transitive:
/// with chains of near points the result depends on which landmarks already
/// exist, ties are resolved towards the smallest id.
#[derive(Debug, Clone)]
pub struct LandmarkStore {
    landmarks: BTreeMap<LandmarkId, Landmark>,
    index: RTree<IndexedLandmark>,
    tolerance: f64,
}

impl Default for LandmarkStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl LandmarkStore {
    pub fn new(tolerance: f64) -> Self {
        Self {
            landmarks: BTreeMap::new(),
            index: RTree::new(),
            tolerance,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn contains(&self, id: LandmarkId) -> bool {
        self.landmarks.contains_key(&id)
    }

    pub fn get(&self, id: LandmarkId) -> Option<&Landmark> {
        self.landmarks.get(&id)
    }

    pub fn position(&self, id: LandmarkId) -> Option<Coord<f64>> {
        self.landmarks.get(&id).map(|landmark| landmark.position)
    }

    /// Landmarks in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = LandmarkId> + '_ {
        self.landmarks.keys().copied()
    }

    /// Smallest unused positive id not below the current landmark count
    pub fn next_id(&self) -> LandmarkId {
        let mut candidate = (self.landmarks.len() as LandmarkId).max(1);
        while self.landmarks.contains_key(&candidate) {
            candidate += 1;
        }
        candidate
    }

    /// Smallest id among the landmarks within tolerance of `(x, y)`
    pub fn find_near(&self, x: f64, y: f64) -> Option<LandmarkId> {
        let tolerance = self.tolerance;
        let envelope =
            AABB::from_corners([x - tolerance, y - tolerance], [x + tolerance, y + tolerance]);

        self.index
            .locate_in_envelope(&envelope)
            .filter(|entry| {
                let [ex, ey] = *entry.geom();
                (ex - x).abs() < tolerance && (ey - y).abs() < tolerance
            })
            .map(|entry| entry.data)
            .min()
    }

    /// Id of an existing landmark at `(x, y)` or of a newly allocated one
    pub fn insert_or_get(&mut self, x: f64, y: f64) -> LandmarkId {
        if let Some(existing) = self.find_near(x, y) {
            return existing;
        }

        let id = self.next_id();
        self.insert(Landmark::new(id, x, y));
        id
    }

    /// Inserts a landmark under its own id without tolerance matching.
    ///
    /// Returns the landmark previously stored under that id.
    pub fn insert(&mut self, landmark: Landmark) -> Option<Landmark> {
        self.index.insert(IndexedLandmark::new(
            [landmark.position.x, landmark.position.y],
            landmark.id,
        ));
        let previous = self.landmarks.insert(landmark.id, landmark);
        if let Some(old) = &previous {
            self.index
                .remove(&IndexedLandmark::new([old.position.x, old.position.y], old.id));
        }
        previous
    }

    /// Removes a landmark. Removing an absent id is a no-op.
    ///
    /// Streets still referencing the id are left untouched.
    pub fn remove(&mut self, id: LandmarkId) -> Option<Landmark> {
        let removed = self.landmarks.remove(&id)?;
        self.index.remove(&IndexedLandmark::new(
            [removed.position.x, removed.position.y],
            removed.id,
        ));
        Some(removed)
    }

    pub fn bounding_box(&self) -> Option<GeoBounds> {
        self.landmarks
            .values()
            .filter_map(|landmark| landmark.origin)
            .fold(None, |bounds: Option<GeoBounds>, origin| {
                Some(match bounds {
                    None => GeoBounds {
                        min_lat: origin.lat,
                        max_lat: origin.lat,
                        min_lon: origin.lon,
                        max_lon: origin.lon,
                    },
                    Some(b) => GeoBounds {
                        min_lat: b.min_lat.min(origin.lat),
                        max_lat: b.max_lat.max(origin.lat),
                        min_lon: b.min_lon.min(origin.lon),
                        max_lon: b.max_lon.max(origin.lon),
                    },
                })
            })
    }

    /// Recomputes every planar position and rebuilds the spatial index
    pub fn reposition<F>(&mut self, mut position: F)
    where
        F: FnMut(&Landmark) -> Coord<f64>,
    {
        for landmark in self.landmarks.values_mut() {
            landmark.position = position(landmark);
        }
        self.rebuild_index();
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.reposition(|landmark| Coord {
            x: landmark.position.x + dx,
            y: landmark.position.y + dy,
        });
    }

    fn rebuild_index(&mut self) {
        let entries = self
            .landmarks
            .values()
            .map(|landmark| {
                IndexedLandmark::new([landmark.position.x, landmark.position.y], landmark.id)
            })
            .collect();
        self.index = RTree::bulk_load(entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_within_tolerance_gets_same_id() {
        let mut store = LandmarkStore::default();
        let first = store.insert_or_get(10.0, 20.0);
        let second = store.insert_or_get(10.00005, 19.99995);
        let third = store.insert_or_get(10.0, 20.0);

        assert_eq!(first, second);
        assert_eq!(first, third);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn tolerance_is_strict() {
        let mut store = LandmarkStore::default();
        let first = store.insert_or_get(0.0, 0.0);
        let second = store.insert_or_get(0.0002, 0.0);

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn ids_start_at_one_and_skip_used_ones() {
        let mut store = LandmarkStore::default();
        assert_eq!(store.insert_or_get(0.0, 0.0), 1);
        assert_eq!(store.insert_or_get(1.0, 0.0), 2);

        store.insert(Landmark::new(3, 5.0, 5.0));
        assert_eq!(store.next_id(), 4);

        store.remove(1);
        // two landmarks left, 2 and 3 are taken
        assert_eq!(store.next_id(), 4);
    }

    #[test]
    fn near_match_prefers_smallest_id() {
        let mut store = LandmarkStore::default();
        store.insert(Landmark::new(7, 0.00008, 0.0));
        store.insert(Landmark::new(3, -0.00008, 0.0));

        assert_eq!(store.find_near(0.0, 0.0), Some(3));
    }

    #[test]
    fn remove_is_idempotent_and_updates_index() {
        let mut store = LandmarkStore::default();
        let id = store.insert_or_get(1.0, 1.0);

        assert!(store.remove(id).is_some());
        assert!(store.remove(id).is_none());
        assert_eq!(store.find_near(1.0, 1.0), None);
    }

    #[test]
    fn replacing_landmark_moves_index_entry() {
        let mut store = LandmarkStore::default();
        store.insert(Landmark::new(1, 0.0, 0.0));
        let previous = store.insert(Landmark::new(1, 5.0, 5.0));

        assert_eq!(previous.map(|l| l.position), Some(Coord { x: 0.0, y: 0.0 }));
        assert_eq!(store.find_near(0.0, 0.0), None);
        assert_eq!(store.find_near(5.0, 5.0), Some(1));
    }

    #[test]
    fn bounding_box_covers_geographic_origins() {
        let mut store = LandmarkStore::default();
        assert!(store.bounding_box().is_none());

        store.insert(Landmark::with_origin(1, 49.0, 8.4));
        store.insert(Landmark::with_origin(2, 49.1, 8.3));
        store.insert(Landmark::new(3, 1.0, 1.0));

        let bounds = store.bounding_box().unwrap();
        assert_eq!(bounds.min_lat, 49.0);
        assert_eq!(bounds.max_lat, 49.1);
        assert_eq!(bounds.min_lon, 8.3);
        assert_eq!(bounds.max_lon, 8.4);
    }

    #[test]
    fn translate_keeps_lookup_consistent() {
        let mut store = LandmarkStore::default();
        let id = store.insert_or_get(1.0, 2.0);
        store.translate(10.0, -2.0);

        assert_eq!(store.position(id), Some(Coord { x: 11.0, y: 0.0 }));
        assert_eq!(store.find_near(11.0, 0.0), Some(id));
        assert_eq!(store.find_near(1.0, 2.0), None);
    }
}
