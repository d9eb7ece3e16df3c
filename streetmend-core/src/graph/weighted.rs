use geo::{Distance, Euclidean, Point};
use hashbrown::{HashMap, HashSet};
use log::{debug, info};
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    stable_graph::StableUnGraph,
    visit::{EdgeRef, IntoEdgeReferences},
};
use rustworkx_core::connectivity::connected_components;
use serde::Serialize;

use super::order_partitions;
use crate::{Error, LandmarkId, StreetNetwork, algo::crossing::round_half_up};

/// Edge of the weighted view as `(source, target, weight)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedEdge {
    pub source: LandmarkId,
    pub target: LandmarkId,
    pub weight: f64,
}

/// Weighted undirected street graph with at most one edge per landmark pair.
///
/// Weights are planar distances rounded to a fixed number of decimals.
/// Edges can be removed (see [`remove_bogus_edges`](super::remove_bogus_edges))
/// without invalidating the remaining indices.
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    graph: StableUnGraph<LandmarkId, f64>,
    nodes: HashMap<LandmarkId, NodeIndex>,
    skipped_duplicates: usize,
}

impl WeightedGraph {
    /// Builds the view from the current topology.
    ///
    /// A segment whose unordered landmark pair already has an edge is
    /// skipped, the first occurrence decides the weight.
    pub fn build(network: &StreetNetwork, precision: u32) -> Result<Self, Error> {
        let mut graph = StableUnGraph::with_capacity(
            network.landmark_count(),
            network.streets.segment_count(),
        );
        let mut nodes = HashMap::with_capacity(network.landmark_count());
        for id in network.landmarks.ids() {
            nodes.insert(id, graph.add_node(id));
        }

        let mut added: HashSet<(LandmarkId, LandmarkId)> = HashSet::new();
        let mut skipped_duplicates = 0;

        for street in network.streets.iter() {
            for (last, current) in street.segments() {
                let key = (last.min(current), last.max(current));
                if !added.insert(key) {
                    skipped_duplicates += 1;
                    continue;
                }

                let (from, to) = match (
                    network.landmarks.position(last),
                    network.landmarks.position(current),
                ) {
                    (Some(from), Some(to)) => (from, to),
                    (None, _) => {
                        return Err(Error::MissingLandmark {
                            street: street.id,
                            landmark: last,
                        });
                    }
                    (_, None) => {
                        return Err(Error::MissingLandmark {
                            street: street.id,
                            landmark: current,
                        });
                    }
                };

                let weight = round_half_up(
                    Euclidean.distance(Point::from(from), Point::from(to)),
                    precision,
                );
                graph.add_edge(nodes[&last], nodes[&current], weight);
            }
        }

        if skipped_duplicates > 0 {
            debug!("Skipped {skipped_duplicates} segments whose landmark pair already had an edge");
        }
        info!(
            "Weighted graph has {} vertices and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self {
            graph,
            nodes,
            skipped_duplicates,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Segments left out because their landmark pair was already connected
    pub fn skipped_duplicates(&self) -> usize {
        self.skipped_duplicates
    }

    /// Landmark ids in ascending order
    pub fn vertices(&self) -> impl Iterator<Item = LandmarkId> + '_ {
        self.graph.node_indices().map(|node| self.graph[node])
    }

    pub fn edges(&self) -> impl Iterator<Item = WeightedEdge> + '_ {
        self.graph.edge_references().map(|edge| WeightedEdge {
            source: self.graph[edge.source()],
            target: self.graph[edge.target()],
            weight: *edge.weight(),
        })
    }

    fn find_edge(&self, a: LandmarkId, b: LandmarkId) -> Option<EdgeIndex> {
        let (a, b) = (self.nodes.get(&a)?, self.nodes.get(&b)?);
        self.graph.find_edge(*a, *b)
    }

    pub fn edge_weight(&self, a: LandmarkId, b: LandmarkId) -> Option<f64> {
        self.find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
            .copied()
    }

    /// Number of edges between `a` and `b`, never more than one after [`WeightedGraph::build`]
    pub fn edge_multiplicity(&self, a: LandmarkId, b: LandmarkId) -> usize {
        let (Some(&na), Some(&nb)) = (self.nodes.get(&a), self.nodes.get(&b)) else {
            return 0;
        };
        self.graph
            .edge_references()
            .filter(|edge| {
                let (s, t) = (edge.source(), edge.target());
                (s == na && t == nb) || (s == nb && t == na)
            })
            .count()
    }

    /// Overrides the weight of the edge between `a` and `b`, returns `false` if there is none
    pub fn set_edge_weight(&mut self, a: LandmarkId, b: LandmarkId, weight: f64) -> bool {
        match self
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight_mut(edge))
        {
            Some(current) => {
                *current = weight;
                true
            }
            None => false,
        }
    }

    /// Removes every edge whose weight matches `predicate`, returns the count
    pub fn remove_edges_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(f64) -> bool,
    {
        let doomed: Vec<EdgeIndex> = self
            .graph
            .edge_indices()
            .filter(|&edge| predicate(self.graph[edge]))
            .collect();

        for &edge in &doomed {
            self.graph.remove_edge(edge);
        }
        doomed.len()
    }

    /// Connected components of the view, largest first
    pub fn partitions(&self) -> Vec<Vec<LandmarkId>> {
        let components = connected_components(&self.graph)
            .into_iter()
            .map(|component| component.into_iter().map(|node| self.graph[node]).collect())
            .collect();
        order_partitions(components)
    }

    pub fn partition_count(&self) -> usize {
        self.partitions().len()
    }
}
