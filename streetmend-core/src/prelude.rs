pub use crate::{DEFAULT_PRECISION, DEFAULT_TOLERANCE, MAX_SIMPLIFY_RUNS};

// Re-export key components
pub use crate::algo::crossing::{crossing_point, detect_crossing, round_half_up};
pub use crate::algo::partition::{
    PartitionConfig, PartitionReport, PruneOutcome, connected_partitions, prune_to_largest_partition,
    simplify_network,
};
pub use crate::algo::repair::{RepairConfig, RepairReport, repair_crossings};
pub use crate::graph::{
    BogusEdgeConfig, StreetMultigraph, WeightedEdge, WeightedGraph, remove_bogus_edges,
};
pub use crate::pipeline::{PipelineConfig, PipelineOutcome, PipelineReport, run_pipeline};

// Core types for the street network
pub use crate::model::{
    GeoBounds, GeoOrigin, Landmark, LandmarkStore, Street, StreetNetwork, StreetTopology,
};
pub use crate::{Error, LandmarkId, StreetId};
