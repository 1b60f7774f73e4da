//! Read-only access to nodes, cables and pass-through wiring.

use cablepath_types::{
    Cable, CircuitTermination, EndpointKind, FrontPort, Node, NodeKind, NodeRef, RearPort,
    TermSide,
};

use crate::error::{TopologyError, TopologyResult};

/// Lookup operations the tracer needs from the topology store.
///
/// Implementations own persistence; the tracer only reads through this
/// trait and never caches what it gets back, so every call should reflect
/// the current state of the store.
pub trait Topology {
    /// Fetches a node by identity.
    ///
    /// Returns [`TopologyError::NodeNotFound`] if no such node exists.
    fn node(&self, node: NodeRef) -> TopologyResult<Node>;

    /// Returns the cable attached to `node` at either end, if any.
    fn find_cable(&self, node: NodeRef) -> TopologyResult<Option<Cable>>;

    /// Returns every front port wired to the given rear port, ordered by
    /// rear port position.
    fn front_ports_of(&self, rear_port: u64) -> TopologyResult<Vec<FrontPort>>;

    /// Returns the circuit termination on `side` of `circuit`, if any.
    fn circuit_termination(
        &self,
        circuit: u64,
        side: TermSide,
    ) -> TopologyResult<Option<CircuitTermination>>;

    /// Returns every node of the given endpoint kind, in ascending id order.
    fn endpoints(&self, kind: EndpointKind) -> TopologyResult<Vec<NodeRef>>;

    /// Returns the front port wired to `position` of the given rear port.
    fn front_port_at(&self, rear_port: u64, position: u16) -> TopologyResult<Option<FrontPort>> {
        Ok(self
            .front_ports_of(rear_port)?
            .into_iter()
            .find(|fp| fp.rear_port_position == position))
    }

    /// Fetches a rear port by id.
    fn rear_port(&self, id: u64) -> TopologyResult<RearPort> {
        let wanted = NodeRef::new(NodeKind::RearPort, id);
        match self.node(wanted)? {
            Node::RearPort(rear) => Ok(rear),
            other => Err(TopologyError::KindMismatch {
                expected: NodeKind::RearPort,
                found: other.node_ref(),
            }),
        }
    }

    /// Returns true if the node exists.
    fn contains(&self, node: NodeRef) -> TopologyResult<bool> {
        match self.node(node) {
            Ok(_) => Ok(true),
            Err(TopologyError::NodeNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
