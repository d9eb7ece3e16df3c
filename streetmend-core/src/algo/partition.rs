//! Connectivity based pruning: keeps the largest connected part of the
//! street network and drops everything else.

use fixedbitset::FixedBitSet;
use hashbrown::HashSet;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{Error, LandmarkId, MAX_SIMPLIFY_RUNS, StreetNetwork, graph::StreetMultigraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Maximum pruning runs
    pub max_runs: usize,
    /// Only analyze and report when `false`
    pub prune: bool,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            max_runs: MAX_SIMPLIFY_RUNS,
            prune: true,
        }
    }
}

/// Result of a single pruning run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PruneOutcome {
    /// Sizes of all partitions found, largest (the kept one) first
    pub partition_sizes: Vec<usize>,
    pub removed_landmarks: usize,
    pub removed_streets: usize,
}

impl PruneOutcome {
    pub fn was_connected(&self) -> bool {
        self.partition_sizes.len() <= 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartitionReport {
    pub runs: Vec<PruneOutcome>,
    /// Whether the last run found a single partition
    pub connected: bool,
}

impl PartitionReport {
    pub fn removed_landmarks(&self) -> usize {
        self.runs.iter().map(|run| run.removed_landmarks).sum()
    }

    pub fn removed_streets(&self) -> usize {
        self.runs.iter().map(|run| run.removed_streets).sum()
    }

    pub fn changed_topology(&self) -> bool {
        self.removed_landmarks() > 0 || self.removed_streets() > 0
    }
}

/// Connected components of the unweighted street graph.
///
/// Each partition is sorted by id; partitions are ordered largest first
/// with ties going to the one containing the smallest landmark id.
pub fn connected_partitions(network: &StreetNetwork) -> Result<Vec<Vec<LandmarkId>>, Error> {
    Ok(StreetMultigraph::from_network(network)?.partitions())
}

/// Removes every landmark outside the largest partition, together with
/// every street referencing one of them.
pub fn prune_to_largest_partition(network: &mut StreetNetwork) -> Result<PruneOutcome, Error> {
    analyze(network, true)
}

fn analyze(network: &mut StreetNetwork, prune: bool) -> Result<PruneOutcome, Error> {
    let multigraph = StreetMultigraph::from_network(network)?;
    let partitions = multigraph.partitions();

    let mut outcome = PruneOutcome {
        partition_sizes: partitions.iter().map(Vec::len).collect(),
        ..PruneOutcome::default()
    };

    if outcome.was_connected() {
        info!("Graph is connected, nothing to simplify");
        return Ok(outcome);
    }

    let kept = partitions[0].len();
    info!(
        "Graph is not connected, found {} partitions {:?}. Selecting largest partition of {kept} landmarks, {} landmarks are outside",
        partitions.len(),
        outcome.partition_sizes,
        network.landmark_count() - kept
    );

    if !prune {
        info!("Pruning disabled, keeping all partitions");
        return Ok(outcome);
    }

    let mut keep = FixedBitSet::with_capacity(multigraph.node_count());
    for &landmark in &partitions[0] {
        if let Some(node) = multigraph.node_index(landmark) {
            keep.insert(node.index());
        }
    }

    let doomed: HashSet<LandmarkId> = multigraph
        .graph
        .node_indices()
        .filter(|node| !keep.contains(node.index()))
        .map(|node| multigraph.graph[node])
        .collect();
    debug!("Analyzed {} landmarks to remove", doomed.len());

    for &landmark in &doomed {
        if network.landmarks.remove(landmark).is_some() {
            outcome.removed_landmarks += 1;
        }
    }
    outcome.removed_streets = network
        .streets
        .retain(|street| !street.landmarks.iter().any(|id| doomed.contains(id)));

    info!(
        "Removed {} unconnected streets and {} unconnected landmarks, now have {} streets built upon {} landmarks",
        outcome.removed_streets,
        outcome.removed_landmarks,
        network.street_count(),
        network.landmark_count()
    );

    Ok(outcome)
}

/// Prunes repeatedly until the street graph is connected or the run budget
/// is used up. Removing streets can split what was left, hence the repetition.
pub fn simplify_network(
    network: &mut StreetNetwork,
    config: &PartitionConfig,
) -> Result<PartitionReport, Error> {
    let mut report = PartitionReport::default();

    for run in 1..=config.max_runs {
        info!("Simplification run {run} of max {}", config.max_runs);
        let outcome = analyze(network, config.prune)?;
        let connected = outcome.was_connected();
        let stalled = !config.prune;
        report.runs.push(outcome);
        report.connected = connected;

        if connected || stalled {
            break;
        }
    }

    Ok(report)
}
