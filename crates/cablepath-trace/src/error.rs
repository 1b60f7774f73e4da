//! Error types for topology access and path tracing.
//!
//! Expected outcomes of a trace (splits, cycles, dangling lookups) are not
//! errors; they are reported through [`crate::Trace`]. The errors below are
//! either accessor failures or integrity violations that make a single
//! endpoint's result untrustworthy.

use cablepath_types::{NodeKind, NodeRef, TermSide};
use thiserror::Error;

/// Result type alias for topology accessor operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Result type alias for trace, resolve and reconcile operations.
pub type TraceResult<T> = Result<T, TraceError>;

/// Errors raised by a topology or endpoint state accessor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeRef),

    #[error("Cable {0} not found")]
    CableNotFound(u64),

    #[error("Node {0} already exists")]
    DuplicateNode(NodeRef),

    #[error("Cable {0} already exists")]
    DuplicateCable(u64),

    #[error("Node {node} is already attached to cable {cable}")]
    AlreadyCabled { node: NodeRef, cable: u64 },

    #[error("Circuit {circuit} already has an {side} side termination")]
    DuplicateCircuitSide { circuit: u64, side: TermSide },

    #[error("Lookup for {expected} returned {found}")]
    KindMismatch { expected: NodeKind, found: NodeRef },

    #[error("Rear port {0} has no positions")]
    NoPositions(u64),

    #[error("Front port {front_port} references missing rear port {rear_port}")]
    MissingRearPort { front_port: u64, rear_port: u64 },

    #[error("Front port {front_port} uses position {position} of rear port {rear_port} ({positions} positions)")]
    PositionOutOfRange {
        front_port: u64,
        rear_port: u64,
        position: u16,
        positions: u16,
    },

    #[error("Position {position} of rear port {rear_port} is claimed by front ports {first} and {second}")]
    PositionConflict {
        rear_port: u64,
        position: u16,
        first: u64,
        second: u64,
    },

    #[error("{0} is not an endpoint")]
    NotAnEndpoint(NodeRef),

    /// Failure reported by an external storage backend.
    #[error("Backend error: {operation}: {message}")]
    Backend { operation: String, message: String },
}

impl TopologyError {
    /// Creates a backend error.
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error only says a looked-up record is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TopologyError::NodeNotFound(_) | TopologyError::CableNotFound(_)
        )
    }
}

/// Errors that abort the trace of a single endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// A front port on the position stack points outside its rear port.
    #[error("Invalid position for {rear_port} ({positions} positions): {position}")]
    InvalidPosition {
        rear_port: NodeRef,
        positions: u16,
        position: u16,
    },

    /// A pass-through port ended up as the origin or answer of a trace.
    #[error("{node} is not a connectable endpoint")]
    NonTerminalEndpoint { node: NodeRef },

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

impl TraceError {
    pub fn non_terminal(node: NodeRef) -> Self {
        Self::NonTerminalEndpoint { node }
    }

    /// Returns true if the error indicates corrupt topology data rather
    /// than an accessor failure.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            TraceError::InvalidPosition { .. } | TraceError::NonTerminalEndpoint { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TraceError::InvalidPosition {
            rear_port: NodeRef::new(NodeKind::RearPort, 4),
            positions: 2,
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "Invalid position for rear-port:4 (2 positions): 3"
        );

        let err = TraceError::from(TopologyError::NodeNotFound(NodeRef::new(
            NodeKind::Interface,
            9,
        )));
        assert_eq!(err.to_string(), "Node interface:9 not found");
    }

    #[test]
    fn test_integrity_classification() {
        assert!(TraceError::non_terminal(NodeRef::new(NodeKind::FrontPort, 1))
            .is_integrity_violation());
        assert!(!TraceError::from(TopologyError::backend("get", "timeout"))
            .is_integrity_violation());
        assert!(TopologyError::CableNotFound(1).is_not_found());
        assert!(!TopologyError::NoPositions(1).is_not_found());
    }
}
