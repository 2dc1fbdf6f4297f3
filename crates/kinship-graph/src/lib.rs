//! Kinship Graph - in-memory contact graph
//!
//! This crate stores a large directed graph of contacts keyed by phone
//! number and answers three queries over it: direct connections, reverse
//! connections and "people you may know" suggestions.
//!
//! # Architecture
//!
//! Nodes live in one vector sorted by phone number, so a node's position
//! is its id and lookups are a binary search. Edges live behind the
//! [`EdgeIndex`] trait, which has two backends:
//! - [`LinkedEdges`]: intrusive forward/reverse chains, O(degree) per query
//! - [`FlatEdges`]: one flat edge list, O(edges) per query but smaller
//!
//! A graph is built once and never mutated afterwards.
//!
//! # Example
//!
//! ```no_run
//! use kinship_graph::{GraphBuilder, LinkedEdges, SocialGraph};
//!
//! let graph: SocialGraph<LinkedEdges> = GraphBuilder::new(100_000, 50)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let friends = graph.lookup("+330000000000");
//! let suggestions = graph.suggest("+330000000000", 2);
//! ```

mod builder;
mod edge;
mod error;
mod graph;
mod node;
mod suggest;

pub use builder::GraphBuilder;
pub use edge::{ChainWalk, Direction, EdgeIndex, EdgeScan, EdgeStrategy, FlatEdges, LinkedEdges};
pub use error::{GraphError, Result};
pub use graph::{GraphStats, SocialGraph};
pub use node::{NodeId, NodeStore, PhoneNumber, DEFAULT_PREFIX, PHONE_DIGITS};
pub use suggest::{Suggestion, DEFAULT_SUGGESTION_DEPTH, DEFAULT_SUGGESTION_LIMIT};
