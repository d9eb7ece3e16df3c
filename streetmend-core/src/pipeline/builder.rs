use log::{info, warn};
use serde::Serialize;

use super::config::PipelineConfig;
use crate::{
    Error, StreetNetwork,
    algo::{
        partition::{PartitionReport, simplify_network},
        repair::{RepairReport, repair_crossings},
    },
    graph::{WeightedGraph, remove_bogus_edges},
};

/// What every stage of [`run_pipeline`] did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub input_landmarks: usize,
    pub input_streets: usize,
    pub repair: Option<RepairReport>,
    pub simplify: PartitionReport,
    pub translation: (i64, i64),
    pub bogus_edges_removed: usize,
    pub repair_after_filter: Option<RepairReport>,
    pub simplify_after_filter: PartitionReport,
    /// Weighted graph was built again because the topology changed after filtering
    pub graph_rebuilt: bool,
    pub landmarks: usize,
    pub streets: usize,
    pub vertices: usize,
    pub edges: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub network: StreetNetwork,
    pub graph: WeightedGraph,
    pub report: PipelineReport,
}

/// Repairs, prunes and translates the network and derives the filtered
/// weighted graph from it.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a street references
/// a landmark that does not exist. The network is consumed either way.
#[allow(clippy::cast_precision_loss)]
pub fn run_pipeline(
    mut network: StreetNetwork,
    config: &PipelineConfig,
) -> Result<PipelineOutcome, Error> {
    config.validate()?;
    network.verify()?;

    if (network.landmarks.tolerance() - config.tolerance).abs() > f64::EPSILON {
        warn!(
            "Network was built with landmark tolerance {}, configuration says {}",
            network.landmarks.tolerance(),
            config.tolerance
        );
    }

    let mut report = PipelineReport {
        input_landmarks: network.landmark_count(),
        input_streets: network.street_count(),
        translation: (config.translate_x, config.translate_y),
        ..PipelineReport::default()
    };
    info!(
        "Starting with {} streets built upon {} landmarks",
        report.input_streets, report.input_landmarks
    );

    let repair = config.repair();

    if config.repair_crossings {
        report.repair = Some(repair_crossings(&mut network, &repair)?);
    } else {
        info!("Crossing repair disabled");
    }

    report.simplify = simplify_network(&mut network, &config.partition)?;
    network.translate(config.translate_x as f64, config.translate_y as f64);

    let mut graph = WeightedGraph::build(&network, config.precision)?;
    report.bogus_edges_removed = remove_bogus_edges(&mut graph, &config.bogus);

    if config.repair_crossings && config.repair_after_filter.unwrap_or(false) {
        report.repair_after_filter = Some(repair_crossings(&mut network, &repair)?);
    }
    report.simplify_after_filter = simplify_network(&mut network, &config.partition)?;

    if needs_rebuild(
        report.repair_after_filter.as_ref(),
        &report.simplify_after_filter,
    ) {
        info!("Topology changed after filtering, rebuilding weighted graph");
        graph = WeightedGraph::build(&network, config.precision)?;
        report.bogus_edges_removed = remove_bogus_edges(&mut graph, &config.bogus);
        report.graph_rebuilt = true;
    }

    report.landmarks = network.landmark_count();
    report.streets = network.street_count();
    report.vertices = graph.vertex_count();
    report.edges = graph.edge_count();

    info!(
        "Finished with {} streets built upon {} landmarks, weighted graph has {} edges",
        report.streets, report.landmarks, report.edges
    );

    Ok(PipelineOutcome {
        network,
        graph,
        report,
    })
}

fn needs_rebuild(repair: Option<&RepairReport>, simplify: &PartitionReport) -> bool {
    repair.is_some_and(|repair| repair.inserted_references > 0) || simplify.changed_topology()
}
