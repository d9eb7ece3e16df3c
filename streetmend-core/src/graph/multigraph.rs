use hashbrown::HashMap;
use petgraph::graph::{NodeIndex, UnGraph};
use rustworkx_core::connectivity::connected_components;

use super::order_partitions;
use crate::{Error, LandmarkId, StreetId, StreetNetwork};

/// Unweighted street graph used for connectivity analysis.
///
/// Every landmark is a vertex, every street segment an edge carrying the
/// street id. Parallel edges and self loops are kept.
#[derive(Debug, Clone)]
pub struct StreetMultigraph {
    pub graph: UnGraph<LandmarkId, StreetId>,
    nodes: HashMap<LandmarkId, NodeIndex>,
}

impl StreetMultigraph {
    pub fn from_network(network: &StreetNetwork) -> Result<Self, Error> {
        let mut graph =
            UnGraph::with_capacity(network.landmark_count(), network.streets.segment_count());
        let mut nodes = HashMap::with_capacity(network.landmark_count());

        for id in network.landmarks.ids() {
            nodes.insert(id, graph.add_node(id));
        }

        for street in network.streets.iter() {
            for (last, current) in street.segments() {
                let node = |landmark: LandmarkId| {
                    nodes.get(&landmark).copied().ok_or(Error::MissingLandmark {
                        street: street.id,
                        landmark,
                    })
                };
                graph.add_edge(node(last)?, node(current)?, street.id);
            }
        }

        Ok(Self { graph, nodes })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_index(&self, landmark: LandmarkId) -> Option<NodeIndex> {
        self.nodes.get(&landmark).copied()
    }

    /// Connected components, largest first
    pub fn partitions(&self) -> Vec<Vec<LandmarkId>> {
        let components = connected_components(&self.graph)
            .into_iter()
            .map(|component| component.into_iter().map(|node| self.graph[node]).collect())
            .collect();
        order_partitions(components)
    }

    pub fn is_connected(&self) -> bool {
        self.partitions().len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Landmark, Street};

    #[test]
    fn keeps_parallel_edges() {
        let mut network = StreetNetwork::default();
        network.add_polyline([(0.0, 0.0), (1.0, 0.0)]);
        network.add_polyline([(1.0, 0.0), (0.0, 0.0)]);
        network.add_polyline([(5.0, 5.0), (6.0, 5.0)]);

        let multigraph = StreetMultigraph::from_network(&network).unwrap();
        assert_eq!(multigraph.node_count(), 4);
        assert_eq!(multigraph.edge_count(), 3);

        let partitions = multigraph.partitions();
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0].len(), 2);
        assert!(!multigraph.is_connected());
    }

    #[test]
    fn unreferenced_landmarks_are_isolated_vertices() {
        let mut network = StreetNetwork::default();
        network.add_polyline([(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        network.landmarks.insert(Landmark::new(100, 50.0, 50.0));

        let partitions = StreetMultigraph::from_network(&network)
            .unwrap()
            .partitions();
        assert_eq!(partitions, vec![vec![1, 2, 3], vec![100]]);
    }

    #[test]
    fn missing_landmark_is_reported() {
        let mut network = StreetNetwork::default();
        network.landmarks.insert(Landmark::new(1, 0.0, 0.0));
        network.streets.insert(Street::new(4, vec![1, 9]));

        assert!(matches!(
            StreetMultigraph::from_network(&network),
            Err(Error::MissingLandmark {
                street: 4,
                landmark: 9
            })
        ));
    }
}
