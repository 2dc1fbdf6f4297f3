//! Graph builder for random contact graphs.
//!
//! Construction happens in two passes:
//! 1. Generate and sort the node store
//! 2. Draw a random out-degree for every node and wire up random edges

use crate::edge::EdgeIndex;
use crate::error::{GraphError, Result};
use crate::graph::SocialGraph;
use crate::node::{NodeId, NodeStore, PhoneNumber, DEFAULT_PREFIX};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Builds a random `SocialGraph`.
///
/// Every node gets an out-degree drawn uniformly from `[0, 2 * mean_degree]`.
/// Each edge points at a node drawn uniformly from `[0, node_count - 1)`, so
/// the last node in sorted order never receives a generated edge. Self-loops
/// and parallel edges are kept.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    node_count: usize,
    mean_degree: usize,
    prefix: String,
    seed: Option<u64>,
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new(node_count: usize, mean_degree: usize) -> Self {
        Self {
            node_count,
            mean_degree,
            prefix: DEFAULT_PREFIX.to_string(),
            seed: None,
        }
    }

    /// Fixes the random seed so the edge multiset is reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the phone number prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Builds the graph with the chosen edge strategy.
    pub fn build<E: EdgeIndex>(&self) -> Result<SocialGraph<E>> {
        let start = Instant::now();
        let max_degree = self
            .mean_degree
            .checked_mul(2)
            .ok_or(GraphError::InvalidMeanDegree(self.mean_degree))?;

        let prefix = self.prefix.as_str();
        let nodes = NodeStore::build(self.node_count, |i| PhoneNumber::generate(prefix, i))?;
        let mut graph = SocialGraph::<E>::with_nodes(nodes);

        let seed = self.seed.unwrap_or_else(rand::random);
        debug!("building edges with seed {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);

        // Destinations come from [0, node_count - 1), empty below two nodes
        let destinations = self.node_count.saturating_sub(1);
        if destinations == 0 {
            if self.node_count > 0 {
                warn!("graph has a single node, no edges can be generated");
            }
        } else {
            for source in 0..self.node_count {
                let degree = rng.gen_range(0..=max_degree);
                for _ in 0..degree {
                    let destination = rng.gen_range(0..destinations);
                    graph.edges.add_edge(
                        NodeId::new(source as u32),
                        NodeId::new(destination as u32),
                    )?;
                }
            }
        }

        info!(
            "Built {} graph: {} nodes, {} edges in {}ms",
            E::STRATEGY,
            graph.node_count(),
            graph.edge_count(),
            start.elapsed().as_millis()
        );

        Ok(graph)
    }

    /// Builds a graph from explicit phone numbers and edges.
    ///
    /// Edges are added in slice order, which fixes neighbor order for the
    /// linked strategy.
    pub fn from_edges<E: EdgeIndex>(
        numbers: Vec<PhoneNumber>,
        edges: &[(&str, &str)],
    ) -> Result<SocialGraph<E>> {
        let nodes = NodeStore::from_numbers(numbers)?;
        let mut graph = SocialGraph::<E>::with_nodes(nodes);

        for (source, destination) in edges {
            let from = resolve(&graph.nodes, source)?;
            let to = resolve(&graph.nodes, destination)?;
            graph.edges.add_edge(from, to)?;
        }

        Ok(graph)
    }
}

fn resolve(nodes: &NodeStore, number: &str) -> Result<NodeId> {
    nodes
        .find(number)
        .ok_or_else(|| GraphError::UnknownIdentity(number.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{FlatEdges, LinkedEdges};

    fn edge_multiset<E: EdgeIndex>(graph: &SocialGraph<E>) -> Vec<(NodeId, NodeId)> {
        let mut edges: Vec<(NodeId, NodeId)> = graph
            .nodes()
            .node_ids()
            .flat_map(move |source| {
                graph
                    .forward_neighbors(source)
                    .map(move |dest| (source, dest))
            })
            .collect();
        edges.sort();
        edges
    }

    #[test]
    fn test_builder_adds_nodes() {
        let graph: SocialGraph = GraphBuilder::new(50, 3).seed(1).build().unwrap();

        assert_eq!(graph.node_count(), 50);
        assert_eq!(graph.phone_number(NodeId::new(0)).as_str(), "+330000000000");
        assert_eq!(graph.phone_number(NodeId::new(49)).as_str(), "+330000000049");
    }

    #[test]
    fn test_seed_is_reproducible() {
        let builder = GraphBuilder::new(200, 4).seed(7);
        let first: SocialGraph = builder.build().unwrap();
        let second: SocialGraph = builder.build().unwrap();

        assert_eq!(edge_multiset(&first), edge_multiset(&second));
    }

    #[test]
    fn test_same_seed_same_edges_across_strategies() {
        let builder = GraphBuilder::new(200, 4).seed(99);
        let linked: SocialGraph<LinkedEdges> = builder.build().unwrap();
        let flat: SocialGraph<FlatEdges> = builder.build().unwrap();

        assert_eq!(edge_multiset(&linked), edge_multiset(&flat));
    }

    #[test]
    fn test_degree_within_bounds() {
        let mean = 5;
        let graph: SocialGraph = GraphBuilder::new(1_000, mean).seed(3).build().unwrap();

        for node in graph.nodes().node_ids() {
            assert!(graph.forward_neighbors(node).count() <= 2 * mean);
        }
    }

    #[test]
    fn test_empirical_mean_degree() {
        let mean = 10;
        let graph: SocialGraph = GraphBuilder::new(20_000, mean).seed(11).build().unwrap();

        let observed = graph.stats().mean_degree();
        assert!(
            (observed - mean as f64).abs() < 0.25,
            "mean degree {} too far from {}",
            observed,
            mean
        );
    }

    #[test]
    fn test_last_node_never_a_destination() {
        let graph: SocialGraph = GraphBuilder::new(30, 8).seed(5).build().unwrap();
        let last = graph.phone_number(NodeId::new(29)).clone();

        assert!(graph.reverse_lookup(last.as_str()).is_empty());
        assert!(graph.edge_count() > 0);
    }

    #[test]
    fn test_empty_graph() {
        let graph: SocialGraph = GraphBuilder::new(0, 50).build().unwrap();

        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.lookup("+330000000000").is_empty());
    }

    #[test]
    fn test_single_node_has_no_edges() {
        let graph: SocialGraph = GraphBuilder::new(1, 50).seed(1).build().unwrap();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_zero_mean_degree() {
        let graph: SocialGraph = GraphBuilder::new(100, 0).seed(1).build().unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_mean_degree_overflow() {
        let result = GraphBuilder::new(10, usize::MAX).build::<LinkedEdges>();
        assert_eq!(
            result.unwrap_err(),
            GraphError::InvalidMeanDegree(usize::MAX)
        );
    }

    #[test]
    fn test_custom_prefix() {
        let graph: SocialGraph = GraphBuilder::new(3, 1).prefix("+44").seed(1).build().unwrap();
        assert!(graph.find_node("+440000000002").is_some());
        assert!(graph.find_node("+330000000002").is_none());
    }

    #[test]
    fn test_from_edges_unknown_identity() {
        let result =
            GraphBuilder::from_edges::<FlatEdges>(vec!["a".into(), "b".into()], &[("a", "c")]);
        assert_eq!(result.unwrap_err(), GraphError::UnknownIdentity("c".into()));
    }
}
