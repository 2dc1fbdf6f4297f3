//! Edge index strategies.
//!
//! Two adjacency representations sit behind the [`EdgeIndex`] trait:
//!
//! - [`LinkedEdges`]: every edge record lives in one arena and is threaded
//!   onto two singly-linked chains at once, the forward chain of its source
//!   and the reverse chain of its destination. Traversal costs O(degree).
//! - [`FlatEdges`]: one unordered vector of `(source, destination)` pairs.
//!   Smaller, but every traversal scans all edges.
//!
//! Both yield the same neighbor multisets; only the order differs.

use crate::error::{GraphError, Result};
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::mem::size_of;
use std::str::FromStr;

/// Which adjacency representation backs a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStrategy {
    /// Intrusive forward/reverse chains over an edge arena.
    #[default]
    Linked,

    /// Single flat edge list, scanned per query.
    Flat,
}

impl std::fmt::Display for EdgeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Linked => "linked",
            Self::Flat => "flat",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EdgeStrategy {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linked" => Ok(Self::Linked),
            "flat" => Ok(Self::Flat),
            _ => Err(GraphError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Which end of an edge a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Source to destination.
    Forward,
    /// Destination to source.
    Reverse,
}

/// Adjacency storage for a directed multigraph.
///
/// Node ids passed in must belong to the node store the index was sized
/// for. Neighbor iteration order is implementation-defined.
pub trait EdgeIndex {
    const STRATEGY: EdgeStrategy;

    type Neighbors<'a>: Iterator<Item = NodeId>
    where
        Self: 'a;

    /// Creates an empty index for a graph with `node_count` nodes.
    fn with_node_count(node_count: usize) -> Self;

    /// Adds a directed edge. Parallel edges and self-loops are kept.
    fn add_edge(&mut self, source: NodeId, destination: NodeId) -> Result<()>;

    /// Destinations of every edge leaving `node`.
    fn forward_neighbors(&self, node: NodeId) -> Self::Neighbors<'_>;

    /// Sources of every edge entering `node`.
    fn reverse_neighbors(&self, node: NodeId) -> Self::Neighbors<'_>;

    fn edge_count(&self) -> usize;

    /// Approximate heap footprint in bytes.
    fn heap_bytes(&self) -> usize;
}

/// Chain terminator.
const NIL: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct EdgeRecord {
    source: NodeId,
    destination: NodeId,
    next_forward: u32,
    next_reverse: u32,
}

#[derive(Debug, Clone, Copy)]
struct ChainHeads {
    forward: u32,
    reverse: u32,
}

impl Default for ChainHeads {
    fn default() -> Self {
        Self {
            forward: NIL,
            reverse: NIL,
        }
    }
}

/// Intrusive adjacency lists over an edge arena.
///
/// New edges become the head of both chains, so a node's neighbors come
/// back most-recently-added first.
#[derive(Debug, Default, Clone)]
pub struct LinkedEdges {
    heads: Vec<ChainHeads>,
    records: Vec<EdgeRecord>,
}

impl EdgeIndex for LinkedEdges {
    const STRATEGY: EdgeStrategy = EdgeStrategy::Linked;

    type Neighbors<'a> = ChainWalk<'a>;

    fn with_node_count(node_count: usize) -> Self {
        Self {
            heads: vec![ChainHeads::default(); node_count],
            records: Vec::new(),
        }
    }

    fn add_edge(&mut self, source: NodeId, destination: NodeId) -> Result<()> {
        let id = self.records.len();
        if id >= NIL as usize {
            return Err(GraphError::TooManyEdges(NIL as usize));
        }
        let id = id as u32;

        let record = EdgeRecord {
            source,
            destination,
            next_forward: self.heads[source.index()].forward,
            next_reverse: self.heads[destination.index()].reverse,
        };
        self.records.push(record);

        self.heads[source.index()].forward = id;
        self.heads[destination.index()].reverse = id;
        Ok(())
    }

    fn forward_neighbors(&self, node: NodeId) -> ChainWalk<'_> {
        let head = self.heads.get(node.index()).map_or(NIL, |h| h.forward);
        ChainWalk::new(&self.records, head, Direction::Forward)
    }

    fn reverse_neighbors(&self, node: NodeId) -> ChainWalk<'_> {
        let head = self.heads.get(node.index()).map_or(NIL, |h| h.reverse);
        ChainWalk::new(&self.records, head, Direction::Reverse)
    }

    fn edge_count(&self) -> usize {
        self.records.len()
    }

    fn heap_bytes(&self) -> usize {
        self.heads.capacity() * size_of::<ChainHeads>()
            + self.records.capacity() * size_of::<EdgeRecord>()
    }
}

/// Lazy walk along one forward or reverse chain.
#[derive(Debug, Clone)]
pub struct ChainWalk<'a> {
    records: &'a [EdgeRecord],
    cursor: u32,
    direction: Direction,
}

impl<'a> ChainWalk<'a> {
    fn new(records: &'a [EdgeRecord], head: u32, direction: Direction) -> Self {
        Self {
            records,
            cursor: head,
            direction,
        }
    }
}

impl Iterator for ChainWalk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let record = self.records.get(self.cursor as usize)?;
        match self.direction {
            Direction::Forward => {
                self.cursor = record.next_forward;
                Some(record.destination)
            }
            Direction::Reverse => {
                self.cursor = record.next_reverse;
                Some(record.source)
            }
        }
    }
}

/// One global edge list with no cross-links.
#[derive(Debug, Default, Clone)]
pub struct FlatEdges {
    edges: Vec<(NodeId, NodeId)>,
}

impl EdgeIndex for FlatEdges {
    const STRATEGY: EdgeStrategy = EdgeStrategy::Flat;

    type Neighbors<'a> = EdgeScan<'a>;

    fn with_node_count(_node_count: usize) -> Self {
        Self::default()
    }

    fn add_edge(&mut self, source: NodeId, destination: NodeId) -> Result<()> {
        self.edges.push((source, destination));
        Ok(())
    }

    fn forward_neighbors(&self, node: NodeId) -> EdgeScan<'_> {
        EdgeScan::new(&self.edges, node, Direction::Forward)
    }

    fn reverse_neighbors(&self, node: NodeId) -> EdgeScan<'_> {
        EdgeScan::new(&self.edges, node, Direction::Reverse)
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn heap_bytes(&self) -> usize {
        self.edges.capacity() * size_of::<(NodeId, NodeId)>()
    }
}

/// Linear scan of the flat edge list, filtered on one endpoint.
#[derive(Debug, Clone)]
pub struct EdgeScan<'a> {
    edges: std::slice::Iter<'a, (NodeId, NodeId)>,
    node: NodeId,
    direction: Direction,
}

impl<'a> EdgeScan<'a> {
    fn new(edges: &'a [(NodeId, NodeId)], node: NodeId, direction: Direction) -> Self {
        Self {
            edges: edges.iter(),
            node,
            direction,
        }
    }
}

impl Iterator for EdgeScan<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.node;
        match self.direction {
            Direction::Forward => self
                .edges
                .find_map(|&(source, destination)| (source == node).then_some(destination)),
            Direction::Reverse => self
                .edges
                .find_map(|&(source, destination)| (destination == node).then_some(source)),
        }
    }
}
