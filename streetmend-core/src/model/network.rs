use geo::Coord;

use super::{LandmarkStore, Street, StreetTopology};
use crate::{Error, LandmarkId};

/// Landmarks and streets of one map, the input and output of every
/// topology algorithm.
#[derive(Debug, Clone, Default)]
pub struct StreetNetwork {
    pub landmarks: LandmarkStore,
    pub streets: StreetTopology,
}

impl StreetNetwork {
    pub fn new(landmarks: LandmarkStore, streets: StreetTopology) -> Self {
        Self { landmarks, streets }
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            landmarks: LandmarkStore::new(tolerance),
            streets: StreetTopology::new(),
        }
    }

    /// Adds a street through `points`, deduplicating them against the
    /// existing landmarks
    pub fn add_polyline<I>(&mut self, points: I) -> crate::StreetId
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let landmarks = points
            .into_iter()
            .map(|(x, y)| self.landmarks.insert_or_get(x, y))
            .collect();
        self.streets.push(landmarks)
    }

    /// Referential integrity check, every street reference must resolve
    pub fn verify(&self) -> Result<(), Error> {
        self.streets.verify_references(&self.landmarks)
    }

    pub fn position(&self, id: LandmarkId) -> Result<Coord<f64>, Error> {
        self.landmarks
            .position(id)
            .ok_or(Error::InvalidLandmark(id))
    }

    /// Planar coordinates of a street's landmarks in order
    pub fn street_coords(&self, street: &Street) -> Result<Vec<Coord<f64>>, Error> {
        street
            .landmarks
            .iter()
            .map(|&id| {
                self.landmarks
                    .position(id)
                    .ok_or(Error::MissingLandmark {
                        street: street.id,
                        landmark: id,
                    })
            })
            .collect()
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        log::info!("Translating map by x={dx} and y={dy}");
        self.landmarks.translate(dx, dy);
    }

    pub fn landmark_count(&self) -> usize {
        self.landmarks.len()
    }

    pub fn street_count(&self) -> usize {
        self.streets.len()
    }
}
