//! Completeness repair: inserts the landmarks missing where street
//! segments cross each other.
//!
//! Every pass scans all street pairs without touching the network and
//! buffers the crossings it finds. The buffer is then applied in one go and
//! the next pass starts from the updated topology, until a pass inserts
//! nothing.

use std::collections::BTreeMap;

use geo::{Coord, Rect};
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::crossing::crossing_point;
use crate::{DEFAULT_PRECISION, Error, LandmarkId, StreetId, StreetNetwork};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Decimal places of crossing coordinates
    pub precision: u32,
    /// Stop after this many passes even if the last one still changed something
    pub max_passes: Option<usize>,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            max_passes: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepairReport {
    /// Passes run, including the final one without changes
    pub passes: usize,
    /// Landmark references added to streets
    pub inserted_references: usize,
    /// Landmarks created at crossings that had no landmark yet
    pub added_landmarks: Vec<LandmarkId>,
    /// `false` when the pass budget ran out first
    pub converged: bool,
}

/// Planar snapshot of one street taken at the start of a pass
struct StreetGeometry {
    id: StreetId,
    coords: Vec<Coord<f64>>,
    extent: Option<Rect<f64>>,
}

impl StreetGeometry {
    fn overlaps(&self, other: &StreetGeometry) -> bool {
        match (self.extent, other.extent) {
            (Some(a), Some(b)) => {
                a.min().x <= b.max().x
                    && b.min().x <= a.max().x
                    && a.min().y <= b.max().y
                    && b.min().y <= a.max().y
            }
            _ => false,
        }
    }
}

/// Crossing between segment `segment_a` of street `street_a` and segment
/// `segment_b` of street `street_b` (indices into the pass snapshot)
#[derive(Debug, Clone, Copy)]
struct Finding {
    street_a: usize,
    segment_a: usize,
    street_b: usize,
    segment_b: usize,
    point: Coord<f64>,
}

/// Inserts landmarks at every crossing of two street segments until the
/// topology reaches a fixed point.
///
/// # Errors
///
/// Returns [`Error::MissingLandmark`] if a street references a landmark that
/// does not exist. Nothing is repaired in that case.
pub fn repair_crossings(
    network: &mut StreetNetwork,
    config: &RepairConfig,
) -> Result<RepairReport, Error> {
    network.verify()?;
    info!(
        "Checking {} streets for missing landmarks at crossing street parts",
        network.street_count()
    );

    let mut report = RepairReport::default();

    loop {
        if let Some(max_passes) = config.max_passes
            && report.passes >= max_passes
        {
            warn!(
                "Crossing repair stopped after {max_passes} passes without reaching a fixed point"
            );
            break;
        }

        report.passes += 1;
        let inserted = run_pass(network, config.precision, &mut report.added_landmarks)?;
        debug!("Repair pass {} inserted {inserted} landmark references", report.passes);

        if inserted == 0 {
            report.converged = true;
            break;
        }
        report.inserted_references += inserted;
    }

    info!(
        "Inserted {} missing landmarks ({} references) in {} passes, now have {} landmarks",
        report.added_landmarks.len(),
        report.inserted_references,
        report.passes,
        network.landmark_count()
    );

    Ok(report)
}

fn snapshot(network: &StreetNetwork) -> Result<Vec<StreetGeometry>, Error> {
    network
        .streets
        .iter()
        .map(|street| {
            let coords = network.street_coords(street)?;
            let extent = extent_of(&coords);
            Ok(StreetGeometry {
                id: street.id,
                coords,
                extent,
            })
        })
        .collect()
}

fn extent_of(coords: &[Coord<f64>]) -> Option<Rect<f64>> {
    let first = *coords.first()?;
    let (min, max) = coords.iter().fold((first, first), |(min, max), c| {
        (
            Coord {
                x: min.x.min(c.x),
                y: min.y.min(c.y),
            },
            Coord {
                x: max.x.max(c.x),
                y: max.y.max(c.y),
            },
        )
    });
    Some(Rect::new(min, max))
}

/// All crossings of street `index` with the streets after it
fn scan_street(geometries: &[StreetGeometry], index: usize, precision: u32) -> Vec<Finding> {
    let street_a = &geometries[index];
    let mut findings = Vec::new();

    for (offset, street_b) in geometries[index + 1..].iter().enumerate() {
        if !street_a.overlaps(street_b) {
            continue;
        }

        for (segment_a, a) in street_a.coords.windows(2).enumerate() {
            for (segment_b, b) in street_b.coords.windows(2).enumerate() {
                if let Some(point) = crossing_point(a[0], a[1], b[0], b[1], precision) {
                    findings.push(Finding {
                        street_a: index,
                        segment_a,
                        street_b: index + 1 + offset,
                        segment_b,
                        point,
                    });
                }
            }
        }
    }

    findings
}

fn squared_distance(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    dx * dx + dy * dy
}

/// One scan and apply round, returns the number of inserted references
fn run_pass(
    network: &mut StreetNetwork,
    precision: u32,
    added_landmarks: &mut Vec<LandmarkId>,
) -> Result<usize, Error> {
    let geometries = snapshot(network)?;

    let findings: Vec<Finding> = (0..geometries.len())
        .into_par_iter()
        .map(|index| scan_street(&geometries, index, precision))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    // Resolve crossings to landmarks in scan order and group them per segment
    let mut pending: BTreeMap<(usize, usize), Vec<(f64, LandmarkId)>> = BTreeMap::new();
    for finding in &findings {
        let known = network.landmarks.len();
        let landmark = network
            .landmarks
            .insert_or_get(finding.point.x, finding.point.y);
        if network.landmarks.len() > known {
            trace!(
                "New landmark {landmark} at ({}, {})",
                finding.point.x, finding.point.y
            );
            added_landmarks.push(landmark);
        }

        for (street, segment) in [
            (finding.street_a, finding.segment_a),
            (finding.street_b, finding.segment_b),
        ] {
            let start = geometries[street].coords[segment];
            pending
                .entry((street, segment))
                .or_default()
                .push((squared_distance(start, finding.point), landmark));
        }
    }

    // Highest segment first, so indices of pending segments stay valid
    let mut inserted = 0;
    for ((street, segment), mut candidates) in pending.into_iter().rev() {
        let street_id = geometries[street].id;
        candidates.sort_by(|l, r| l.0.total_cmp(&r.0).then(l.1.cmp(&r.1)));

        // Farthest first, each insertion pushes the previous one right
        for (_, landmark) in candidates.into_iter().rev() {
            if network
                .streets
                .insert_landmark_at(street_id, segment + 1, landmark)?
            {
                trace!("Inserted landmark {landmark} into street {street_id}");
                inserted += 1;
            }
        }
    }

    Ok(inserted)
}
