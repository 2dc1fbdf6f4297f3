//! Core graph data structure.
//!
//! A `SocialGraph` owns the sorted node store and one edge index. It is
//! built once by [`GraphBuilder`](crate::GraphBuilder) and is read-only
//! afterwards, so `&SocialGraph` can be shared freely across threads.

use crate::edge::{EdgeIndex, EdgeStrategy, LinkedEdges};
use crate::node::{NodeId, NodeStore, PhoneNumber};
use serde::Serialize;
use tracing::debug;

/// The contact graph.
#[derive(Debug)]
pub struct SocialGraph<E: EdgeIndex = LinkedEdges> {
    pub(crate) nodes: NodeStore,
    pub(crate) edges: E,
}

impl<E: EdgeIndex> SocialGraph<E> {
    /// Wraps a node store with an empty edge index sized for it.
    pub(crate) fn with_nodes(nodes: NodeStore) -> Self {
        let edges = E::with_node_count(nodes.len());
        Self { nodes, edges }
    }

    /// Resolves a phone number to its node.
    pub fn find_node(&self, number: &str) -> Option<NodeId> {
        self.nodes.find(number)
    }

    /// Direct connections of a phone number.
    ///
    /// Unknown numbers yield an empty list. Order depends on the edge
    /// strategy.
    pub fn lookup(&self, number: &str) -> Vec<NodeId> {
        match self.find_node(number) {
            Some(node) => {
                let children: Vec<NodeId> = self.edges.forward_neighbors(node).collect();
                debug!("lookup {} -> {} nodes", number, children.len());
                children
            }
            None => Vec::new(),
        }
    }

    /// Nodes that have an edge pointing to the phone number.
    pub fn reverse_lookup(&self, number: &str) -> Vec<NodeId> {
        match self.find_node(number) {
            Some(node) => {
                let parents: Vec<NodeId> = self.edges.reverse_neighbors(node).collect();
                debug!("reverse lookup {} -> {} nodes", number, parents.len());
                parents
            }
            None => Vec::new(),
        }
    }

    /// Lazy forward neighbors of a node.
    pub fn forward_neighbors(&self, node: NodeId) -> E::Neighbors<'_> {
        self.edges.forward_neighbors(node)
    }

    /// Lazy reverse neighbors of a node.
    pub fn reverse_neighbors(&self, node: NodeId) -> E::Neighbors<'_> {
        self.edges.reverse_neighbors(node)
    }

    /// Gets the phone number of a node.
    ///
    /// Panics if the node id came from another graph.
    pub fn phone_number(&self, node: NodeId) -> &PhoneNumber {
        self.nodes.phone_number(node)
    }

    /// Maps node ids to their phone numbers.
    pub fn phone_numbers<'a>(&'a self, nodes: &'a [NodeId]) -> Vec<&'a PhoneNumber> {
        nodes.iter().map(|&id| self.phone_number(id)).collect()
    }

    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }

    pub fn strategy(&self) -> EdgeStrategy {
        E::STRATEGY
    }
}

/// Graph statistics for memory reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub strategy: EdgeStrategy,
    /// Approximate heap bytes held by the node store.
    pub node_bytes: usize,
    /// Approximate heap bytes held by the edge index.
    pub edge_bytes: usize,
}

impl GraphStats {
    pub fn mean_degree(&self) -> f64 {
        if self.node_count == 0 {
            return 0.0;
        }
        self.edge_count as f64 / self.node_count as f64
    }
}

impl<E: EdgeIndex> SocialGraph<E> {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            strategy: E::STRATEGY,
            node_bytes: self.nodes.heap_bytes(),
            edge_bytes: self.edges.heap_bytes(),
        }
    }
}
