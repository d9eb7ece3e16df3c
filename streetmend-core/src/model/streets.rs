//! Streets as ordered sequences of landmark references

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use super::LandmarkStore;
use crate::{Error, LandmarkId, StreetId};

/// Polyline over landmarks. Consecutive references form segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Street {
    pub id: StreetId,
    pub landmarks: Vec<LandmarkId>,
}

impl Street {
    pub fn new(id: StreetId, landmarks: Vec<LandmarkId>) -> Self {
        Self { id, landmarks }
    }

    pub fn contains(&self, landmark: LandmarkId) -> bool {
        self.landmarks.contains(&landmark)
    }

    /// Consecutive landmark pairs, empty for streets with fewer than two references
    pub fn segments(&self) -> impl Iterator<Item = (LandmarkId, LandmarkId)> + '_ {
        self.landmarks.iter().copied().tuple_windows()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StreetTopology {
    streets: BTreeMap<StreetId, Street>,
}

impl StreetTopology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.streets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streets.is_empty()
    }

    pub fn get(&self, id: StreetId) -> Option<&Street> {
        self.streets.get(&id)
    }

    /// Streets in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Street> {
        self.streets.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = StreetId> + '_ {
        self.streets.keys().copied()
    }

    /// Inserts a street under its own id, returning the replaced one
    pub fn insert(&mut self, street: Street) -> Option<Street> {
        self.streets.insert(street.id, street)
    }

    /// Adds a street under the next free id
    pub fn push(&mut self, landmarks: Vec<LandmarkId>) -> StreetId {
        let id = self
            .streets
            .last_key_value()
            .map_or(0, |(last, _)| last + 1);
        self.streets.insert(id, Street::new(id, landmarks));
        id
    }

    /// Inserts `landmark` before position `index` of the street.
    ///
    /// Returns `Ok(false)` without modification when the street already
    /// references the landmark anywhere.
    pub fn insert_landmark_at(
        &mut self,
        street: StreetId,
        index: usize,
        landmark: LandmarkId,
    ) -> Result<bool, Error> {
        let target = self
            .streets
            .get_mut(&street)
            .ok_or(Error::InvalidStreet(street))?;

        if index > target.landmarks.len() {
            return Err(Error::InvalidData(format!(
                "Insertion index {index} out of range for street {street} with {} landmarks",
                target.landmarks.len()
            )));
        }

        if target.contains(landmark) {
            return Ok(false);
        }

        target.landmarks.insert(index, landmark);
        Ok(true)
    }

    /// Removing an absent street is a no-op
    pub fn remove(&mut self, id: StreetId) -> Option<Street> {
        self.streets.remove(&id)
    }

    /// Drops every street referencing `landmark` as a whole.
    ///
    /// Returns the number of removed streets.
    pub fn remove_streets_referencing(&mut self, landmark: LandmarkId) -> usize {
        let before = self.streets.len();
        self.streets.retain(|_, street| !street.contains(landmark));
        before - self.streets.len()
    }

    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Street) -> bool,
    {
        let before = self.streets.len();
        self.streets.retain(|_, street| keep(street));
        before - self.streets.len()
    }

    pub fn referenced_landmarks(&self) -> BTreeSet<LandmarkId> {
        self.streets
            .values()
            .flat_map(|street| street.landmarks.iter().copied())
            .collect()
    }

    pub fn segment_count(&self) -> usize {
        self.streets
            .values()
            .map(|street| street.len().saturating_sub(1))
            .sum()
    }

    /// Fails on the first reference to a landmark missing from `landmarks`
    pub fn verify_references(&self, landmarks: &LandmarkStore) -> Result<(), Error> {
        for street in self.streets.values() {
            if let Some(&missing) = street.landmarks.iter().find(|&&id| !landmarks.contains(id)) {
                return Err(Error::MissingLandmark {
                    street: street.id,
                    landmark: missing,
                });
            }
        }
        Ok(())
    }
}
