//! Graph views derived from a [`StreetNetwork`](crate::StreetNetwork)

mod bogus;
mod multigraph;
mod weighted;

pub use bogus::{BogusEdgeConfig, remove_bogus_edges};
pub use multigraph::StreetMultigraph;
pub use weighted::{WeightedEdge, WeightedGraph};

use crate::LandmarkId;

/// Sorts every partition by id and orders them largest first.
///
/// Equally sized partitions are ordered by their smallest landmark id, so
/// the first partition is a deterministic choice of "the largest".
pub(crate) fn order_partitions(mut partitions: Vec<Vec<LandmarkId>>) -> Vec<Vec<LandmarkId>> {
    for partition in &mut partitions {
        partition.sort_unstable();
    }
    partitions.retain(|partition| !partition.is_empty());
    partitions.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
    partitions
}
