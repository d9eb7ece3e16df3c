//! Removal of edges whose weight is a construction artifact.
//!
//! Rounding and segments between almost coincident landmarks leave edges of
//! weight zero, and repeated insertion leaves edges of exactly one unit.
//! Neither reflects real geometry.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::WeightedGraph;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BogusEdgeConfig {
    /// Weights closer than this to `1.0` are bogus
    pub unit_tolerance: f64,
    /// Weights at or below this are bogus
    pub zero_threshold: f64,
}

impl Default for BogusEdgeConfig {
    fn default() -> Self {
        Self {
            unit_tolerance: 1e-4,
            zero_threshold: 1e-9,
        }
    }
}

impl BogusEdgeConfig {
    pub fn is_bogus(&self, weight: f64) -> bool {
        (weight - 1.0).abs() < self.unit_tolerance || weight <= self.zero_threshold
    }
}

/// Drops bogus edges from the weighted view and returns how many were removed.
///
/// The street network itself is not touched, callers re-run partitioning
/// afterwards because the view may have fallen apart.
pub fn remove_bogus_edges(graph: &mut WeightedGraph, config: &BogusEdgeConfig) -> usize {
    let before = graph.edge_count();
    let removed = graph.remove_edges_where(|weight| {
        let bogus = config.is_bogus(weight);
        if bogus {
            debug!("Edge with bogus weight {weight}");
        }
        bogus
    });

    info!(
        "Removed {removed} bogus edges, weighted graph went from {before} to {} edges",
        graph.edge_count()
    );
    removed
}
