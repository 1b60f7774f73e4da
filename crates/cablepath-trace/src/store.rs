//! In-memory topology and endpoint state store.
//!
//! [`MemoryTopology`] implements both accessor traits over plain maps and
//! keeps secondary indexes for the lookups the tracer performs: cable by
//! end, front ports by rear port, and circuit terminations by side. It is
//! loaded from and saved to a [`TopologySnapshot`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use cablepath_types::{
    Cable, CableStatus, CircuitTermination, EndpointKind, FrontPort, Node, NodeKind, NodeRef,
    TermSide,
};
use serde::{Deserialize, Serialize};

use crate::endpoint_state::{EndpointRecord, EndpointStore, LinkField};
use crate::error::{TopologyError, TopologyResult};
use crate::topology::Topology;

/// Serializable form of a whole topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub cables: Vec<Cable>,
    #[serde(default)]
    pub endpoint_state: Vec<EndpointStateEntry>,
}

/// Stored state of one endpoint inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointStateEntry {
    pub endpoint: NodeRef,
    #[serde(flatten)]
    pub record: EndpointRecord,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTopology {
    nodes: BTreeMap<NodeRef, Node>,
    cables: BTreeMap<u64, Cable>,
    cable_by_end: HashMap<NodeRef, u64>,
    /// rear port id -> front port ids
    front_ports: HashMap<u64, BTreeSet<u64>>,
    circuit_sides: HashMap<(u64, TermSide), u64>,
    endpoint_state: BTreeMap<NodeRef, EndpointRecord>,
}

impl MemoryTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a snapshot, rejecting duplicate nodes, cables
    /// attached to missing nodes and nodes with more than one cable.
    ///
    /// Pass-through wiring is not checked here; see [`Self::validate`].
    pub fn from_snapshot(snapshot: TopologySnapshot) -> TopologyResult<Self> {
        let (topo, problems) = Self::from_snapshot_lenient(snapshot);
        match problems.into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(topo),
        }
    }

    /// Builds a store from a snapshot, skipping every node, cable and
    /// endpoint entry that cannot be added and returning why.
    pub fn from_snapshot_lenient(snapshot: TopologySnapshot) -> (Self, Vec<TopologyError>) {
        let mut topo = Self::new();
        let mut problems = Vec::new();
        for node in snapshot.nodes {
            if let Err(e) = topo.add_node(node) {
                problems.push(e);
            }
        }
        for cable in snapshot.cables {
            if let Err(e) = topo.add_cable(cable) {
                problems.push(e);
            }
        }
        for entry in snapshot.endpoint_state {
            if let Err(e) = topo.save_endpoint_record(entry.endpoint, entry.record) {
                problems.push(e);
            }
        }
        (topo, problems)
    }

    /// Returns a snapshot with nodes and cables in identity order.
    pub fn to_snapshot(&self) -> TopologySnapshot {
        TopologySnapshot {
            nodes: self.nodes.values().copied().collect(),
            cables: self.cables.values().cloned().collect(),
            endpoint_state: self
                .endpoint_state
                .iter()
                .filter(|(_, record)| **record != EndpointRecord::default())
                .map(|(endpoint, record)| EndpointStateEntry {
                    endpoint: *endpoint,
                    record: record.clone(),
                })
                .collect(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn cable_count(&self) -> usize {
        self.cables.len()
    }

    pub fn cables(&self) -> impl Iterator<Item = &Cable> {
        self.cables.values()
    }

    /// Adds a node.
    pub fn add_node(&mut self, node: impl Into<Node>) -> TopologyResult<NodeRef> {
        let node = node.into();
        let node_ref = node.node_ref();
        if self.nodes.contains_key(&node_ref) {
            return Err(TopologyError::DuplicateNode(node_ref));
        }

        match node {
            Node::FrontPort(front) => {
                self.front_ports
                    .entry(front.rear_port)
                    .or_default()
                    .insert(front.id);
            }
            Node::CircuitTermination(ct) => {
                let key = (ct.circuit, ct.term_side);
                if self.circuit_sides.contains_key(&key) {
                    return Err(TopologyError::DuplicateCircuitSide {
                        circuit: ct.circuit,
                        side: ct.term_side,
                    });
                }
                self.circuit_sides.insert(key, ct.id);
            }
            _ => {}
        }

        self.nodes.insert(node_ref, node);
        Ok(node_ref)
    }

    /// Adds a cable between two existing, uncabled nodes.
    pub fn add_cable(&mut self, cable: Cable) -> TopologyResult<()> {
        if self.cables.contains_key(&cable.id) {
            return Err(TopologyError::DuplicateCable(cable.id));
        }
        for end in [cable.termination_a, cable.termination_b] {
            if !self.nodes.contains_key(&end) {
                return Err(TopologyError::NodeNotFound(end));
            }
            if let Some(existing) = self.cable_by_end.get(&end) {
                return Err(TopologyError::AlreadyCabled {
                    node: end,
                    cable: *existing,
                });
            }
        }
        if cable.termination_a == cable.termination_b {
            return Err(TopologyError::AlreadyCabled {
                node: cable.termination_a,
                cable: cable.id,
            });
        }

        self.cable_by_end.insert(cable.termination_a, cable.id);
        self.cable_by_end.insert(cable.termination_b, cable.id);
        self.cables.insert(cable.id, cable);
        Ok(())
    }

    /// Removes a cable, returning it.
    pub fn remove_cable(&mut self, id: u64) -> TopologyResult<Cable> {
        let cable = self
            .cables
            .remove(&id)
            .ok_or(TopologyError::CableNotFound(id))?;
        self.cable_by_end.remove(&cable.termination_a);
        self.cable_by_end.remove(&cable.termination_b);
        Ok(cable)
    }

    pub fn set_cable_status(&mut self, id: u64, status: impl Into<CableStatus>) -> TopologyResult<()> {
        let cable = self
            .cables
            .get_mut(&id)
            .ok_or(TopologyError::CableNotFound(id))?;
        cable.status = status.into();
        Ok(())
    }

    /// Checks the pass-through wiring the tracer relies on.
    ///
    /// Returns every problem found rather than stopping at the first one.
    pub fn validate(&self) -> Vec<TopologyError> {
        let mut problems = Vec::new();

        for node in self.nodes.values() {
            if let Node::RearPort(rear) = node {
                if rear.positions == 0 {
                    problems.push(TopologyError::NoPositions(rear.id));
                }
            }
        }

        let mut claimed: HashMap<(u64, u16), u64> = HashMap::new();
        for node in self.nodes.values() {
            let Node::FrontPort(front) = node else {
                continue;
            };
            let rear = match self.nodes.get(&front.rear_port_ref()) {
                Some(Node::RearPort(rear)) => rear,
                _ => {
                    problems.push(TopologyError::MissingRearPort {
                        front_port: front.id,
                        rear_port: front.rear_port,
                    });
                    continue;
                }
            };
            if !rear.has_position(front.rear_port_position) {
                problems.push(TopologyError::PositionOutOfRange {
                    front_port: front.id,
                    rear_port: rear.id,
                    position: front.rear_port_position,
                    positions: rear.positions,
                });
            }
            let key = (rear.id, front.rear_port_position);
            match claimed.get(&key) {
                Some(first) => problems.push(TopologyError::PositionConflict {
                    rear_port: rear.id,
                    position: front.rear_port_position,
                    first: *first,
                    second: front.id,
                }),
                None => {
                    claimed.insert(key, front.id);
                }
            }
        }

        problems
    }

    fn front_port(&self, id: u64) -> Option<FrontPort> {
        match self.nodes.get(&NodeRef::new(NodeKind::FrontPort, id)) {
            Some(Node::FrontPort(front)) => Some(*front),
            _ => None,
        }
    }

    fn kind_range(kind: NodeKind) -> std::ops::RangeInclusive<NodeRef> {
        NodeRef::new(kind, 0)..=NodeRef::new(kind, u64::MAX)
    }
}

impl Topology for MemoryTopology {
    fn node(&self, node: NodeRef) -> TopologyResult<Node> {
        self.nodes
            .get(&node)
            .copied()
            .ok_or(TopologyError::NodeNotFound(node))
    }

    fn find_cable(&self, node: NodeRef) -> TopologyResult<Option<Cable>> {
        Ok(self
            .cable_by_end
            .get(&node)
            .and_then(|id| self.cables.get(id))
            .cloned())
    }

    fn front_ports_of(&self, rear_port: u64) -> TopologyResult<Vec<FrontPort>> {
        let mut ports: Vec<FrontPort> = self
            .front_ports
            .get(&rear_port)
            .into_iter()
            .flatten()
            .filter_map(|id| self.front_port(*id))
            .collect();
        ports.sort_by_key(|fp| (fp.rear_port_position, fp.id));
        Ok(ports)
    }

    fn circuit_termination(
        &self,
        circuit: u64,
        side: TermSide,
    ) -> TopologyResult<Option<CircuitTermination>> {
        let Some(id) = self.circuit_sides.get(&(circuit, side)) else {
            return Ok(None);
        };
        match self.nodes.get(&NodeRef::new(NodeKind::CircuitTermination, *id)) {
            Some(Node::CircuitTermination(ct)) => Ok(Some(*ct)),
            _ => Ok(None),
        }
    }

    fn endpoints(&self, kind: EndpointKind) -> TopologyResult<Vec<NodeRef>> {
        Ok(self
            .nodes
            .range(Self::kind_range(kind.node_kind()))
            .map(|(node_ref, _)| *node_ref)
            .collect())
    }
}

impl EndpointStore for MemoryTopology {
    fn endpoint_record(&self, endpoint: NodeRef) -> TopologyResult<EndpointRecord> {
        if !endpoint.is_endpoint() {
            return Err(TopologyError::NotAnEndpoint(endpoint));
        }
        if !self.nodes.contains_key(&endpoint) {
            return Err(TopologyError::NodeNotFound(endpoint));
        }
        Ok(self
            .endpoint_state
            .get(&endpoint)
            .cloned()
            .unwrap_or_default())
    }

    fn save_endpoint_record(
        &mut self,
        endpoint: NodeRef,
        record: EndpointRecord,
    ) -> TopologyResult<()> {
        if !endpoint.is_endpoint() {
            return Err(TopologyError::NotAnEndpoint(endpoint));
        }
        if !self.nodes.contains_key(&endpoint) {
            return Err(TopologyError::NodeNotFound(endpoint));
        }
        self.endpoint_state.insert(endpoint, record);
        Ok(())
    }

    fn find_link_owner(
        &self,
        owner: EndpointKind,
        field: LinkField,
        target: NodeRef,
    ) -> TopologyResult<Option<NodeRef>> {
        Ok(self
            .endpoint_state
            .range(Self::kind_range(owner.node_kind()))
            .find(|(_, record)| record.link(field) == Some(target))
            .map(|(owner_ref, _)| *owner_ref))
    }
}
