//! Common types for physical cable topologies.
//!
//! This crate provides the vocabulary shared by the tracer, its storage
//! adapters and the command line tool:
//!
//! - [`NodeKind`] / [`EndpointKind`]: the closed set of cable terminations
//! - [`NodeRef`]: stable `(kind, id)` identity of a node
//! - [`Node`]: a node record (endpoint, front port, rear port, circuit termination)
//! - [`Cable`]: an undirected edge between two node references
//! - [`TermSide`]: the `A`/`Z` side of a circuit

mod cable;
mod node;

pub use cable::{Cable, CableStatus};
pub use node::{
    CircuitTermination, EndpointKind, FrontPort, Node, NodeKind, NodeRef, RearPort, TermSide,
};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid node kind: {0}")]
    InvalidNodeKind(String),

    #[error("invalid node reference: {0} (expected kind:id)")]
    InvalidNodeRef(String),

    #[error("invalid circuit termination side: {0} (must be A or Z)")]
    InvalidTermSide(String),
}
