//! Error types for graph construction.
//!
//! Queries never fail: an unknown phone number yields an empty result.
//! Only building a graph can go wrong.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Too many nodes: {0} exceeds the u32 index space")]
    TooManyNodes(usize),

    #[error("Too many edges: the edge arena is limited to {0} records")]
    TooManyEdges(usize),

    #[error("Duplicate phone number: {0}")]
    DuplicateIdentity(String),

    #[error("Invalid mean degree {0}: 2 * mean degree overflows")]
    InvalidMeanDegree(usize),

    #[error("Unknown phone number in edge list: {0}")]
    UnknownIdentity(String),

    #[error("Unknown edge strategy '{0}' (expected 'linked' or 'flat')")]
    UnknownStrategy(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
