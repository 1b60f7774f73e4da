//! Topology fixtures for tracer and reconciliation tests
//!
//! Builders panic on invalid input: a fixture that cannot be built is a
//! broken test, not a condition to handle.

use cablepath_trace::MemoryTopology;
use cablepath_types::{
    Cable, CableStatus, CircuitTermination, EndpointKind, FrontPort, Node, NodeKind, NodeRef,
    RearPort, TermSide,
};

/// Shorthand node references
pub mod refs {
    use super::*;

    pub fn console_port(id: u64) -> NodeRef {
        NodeRef::new(NodeKind::ConsolePort, id)
    }

    pub fn console_server_port(id: u64) -> NodeRef {
        NodeRef::new(NodeKind::ConsoleServerPort, id)
    }

    pub fn power_port(id: u64) -> NodeRef {
        NodeRef::new(NodeKind::PowerPort, id)
    }

    pub fn power_outlet(id: u64) -> NodeRef {
        NodeRef::new(NodeKind::PowerOutlet, id)
    }

    pub fn power_feed(id: u64) -> NodeRef {
        NodeRef::new(NodeKind::PowerFeed, id)
    }

    pub fn iface(id: u64) -> NodeRef {
        NodeRef::new(NodeKind::Interface, id)
    }

    pub fn circuit_term(id: u64) -> NodeRef {
        NodeRef::new(NodeKind::CircuitTermination, id)
    }

    pub fn front(id: u64) -> NodeRef {
        NodeRef::new(NodeKind::FrontPort, id)
    }

    pub fn rear(id: u64) -> NodeRef {
        NodeRef::new(NodeKind::RearPort, id)
    }
}

/// Fluent builder for a `MemoryTopology`
///
/// Cable ids are assigned sequentially from 1 in the order cables are
/// added.
#[derive(Debug)]
pub struct TopologyBuilder {
    topo: MemoryTopology,
    next_cable: u64,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self {
            topo: MemoryTopology::new(),
            next_cable: 1,
        }
    }

    /// Add a simple endpoint (not a circuit termination)
    pub fn endpoint(mut self, kind: EndpointKind, id: u64) -> Self {
        let node = Node::endpoint(kind, id)
            .unwrap_or_else(|| panic!("use circuit_termination() for {}", kind));
        self.add(node);
        self
    }

    pub fn interface(self, id: u64) -> Self {
        self.endpoint(EndpointKind::Interface, id)
    }

    /// Add several interfaces at once
    pub fn interfaces(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        for id in ids {
            self = self.interface(id);
        }
        self
    }

    pub fn rear_port(mut self, id: u64, positions: u16) -> Self {
        self.add(RearPort { id, positions });
        self
    }

    pub fn front_port(mut self, id: u64, rear_port: u64, position: u16) -> Self {
        self.add(FrontPort {
            id,
            rear_port,
            rear_port_position: position,
        });
        self
    }

    /// Add a rear port together with one front port per position
    ///
    /// Front port ids are `first_front..first_front + positions`, front
    /// port `first_front + n` on position `n + 1`.
    pub fn panel(mut self, rear_id: u64, positions: u16, first_front: u64) -> Self {
        self = self.rear_port(rear_id, positions);
        for position in 1..=positions {
            self = self.front_port(first_front + u64::from(position) - 1, rear_id, position);
        }
        self
    }

    pub fn circuit_termination(mut self, id: u64, circuit: u64, side: TermSide) -> Self {
        self.add(CircuitTermination {
            id,
            circuit,
            term_side: side,
        });
        self
    }

    /// Add both sides of a circuit
    pub fn circuit(self, circuit: u64, a_side: u64, z_side: u64) -> Self {
        self.circuit_termination(a_side, circuit, TermSide::A)
            .circuit_termination(z_side, circuit, TermSide::Z)
    }

    /// Add a connected cable
    pub fn cable(self, a: NodeRef, b: NodeRef) -> Self {
        self.cable_with_status(a, b, CableStatus::Connected)
    }

    pub fn cable_with_status(
        mut self,
        a: NodeRef,
        b: NodeRef,
        status: impl Into<CableStatus>,
    ) -> Self {
        let cable = Cable::new(self.next_cable, a, b).with_status(status);
        self.next_cable += 1;
        if let Err(e) = self.topo.add_cable(cable) {
            panic!("fixture cable {} <-> {}: {}", a, b, e);
        }
        self
    }

    pub fn build(self) -> MemoryTopology {
        self.topo
    }

    fn add(&mut self, node: impl Into<Node>) {
        if let Err(e) = self.topo.add_node(node) {
            panic!("fixture node: {}", e);
        }
    }
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Common scenarios
pub mod scenarios {
    use super::refs::*;
    use super::*;

    /// interface:1 <-> interface:2 over cable 1
    pub fn direct_link() -> MemoryTopology {
        TopologyBuilder::new()
            .interfaces([1, 2])
            .cable(iface(1), iface(2))
            .build()
    }

    /// interface:1 -> front:1 / rear:1 (1 pos) -> rear:2 (1 pos) / front:2 -> interface:2
    pub fn single_position_patch() -> MemoryTopology {
        TopologyBuilder::new()
            .interfaces([1, 2])
            .panel(1, 1, 1)
            .panel(2, 1, 2)
            .cable(iface(1), front(1))
            .cable(rear(1), rear(2))
            .cable(front(2), iface(2))
            .build()
    }

    /// Three interfaces on each side of a 3-position trunk.
    ///
    /// interface:1..3 -> front:1..3 on rear:1, rear:1 <-> rear:2,
    /// front:4..6 on rear:2 -> interface:4..6. Position n on one side
    /// reaches position n on the other.
    pub fn multi_position_trunk() -> MemoryTopology {
        TopologyBuilder::new()
            .interfaces(1..=6)
            .panel(1, 3, 1)
            .panel(2, 3, 4)
            .cable(iface(1), front(1))
            .cable(iface(2), front(2))
            .cable(iface(3), front(3))
            .cable(rear(1), rear(2))
            .cable(front(4), iface(4))
            .cable(front(5), iface(5))
            .cable(front(6), iface(6))
            .build()
    }

    /// interface:1 cabled straight into rear:1, which has 3 positions
    /// (front:1..3, uncabled).
    pub fn split_at_rear_port() -> MemoryTopology {
        TopologyBuilder::new()
            .interface(1)
            .panel(1, 3, 1)
            .cable(iface(1), rear(1))
            .build()
    }

    /// Two single-position panels patched into each other front to front
    /// (cable 1) and rear to rear (cable 2).
    pub fn patch_panel_loop() -> MemoryTopology {
        TopologyBuilder::new()
            .panel(1, 1, 1)
            .panel(2, 1, 2)
            .cable(front(1), front(2))
            .cable(rear(2), rear(1))
            .build()
    }

    /// A 2-position panel whose rear is trunked to a second panel, with
    /// position 1 of the far panel patched back into position 2 of the
    /// first.
    ///
    /// interface:1 -> front:1 / rear:1 -> rear:2 / front:3 -> front:2 /
    /// rear:1 again.
    pub fn folded_trunk_loop() -> MemoryTopology {
        TopologyBuilder::new()
            .interface(1)
            .panel(1, 2, 1)
            .panel(2, 2, 3)
            .cable(iface(1), front(1))
            .cable(rear(1), rear(2))
            .cable(front(3), front(2))
            .build()
    }

    /// interface:1 -> front:1 / rear:1 (connected), rear:1 -> interface:2
    /// (planned).
    pub fn mixed_status_path() -> MemoryTopology {
        TopologyBuilder::new()
            .interfaces([1, 2])
            .panel(1, 1, 1)
            .cable(iface(1), front(1))
            .cable_with_status(rear(1), iface(2), "planned")
            .build()
    }

    /// interface:1 cabled to the A side of circuit 1; the Z side exists but
    /// is not cabled.
    pub fn circuit_dangling() -> MemoryTopology {
        TopologyBuilder::new()
            .interface(1)
            .circuit(1, 1, 2)
            .cable(iface(1), circuit_term(1))
            .build()
    }

    /// interface:1 -> circuit 1 A side ... Z side -> interface:2
    pub fn circuit_end_to_end() -> MemoryTopology {
        TopologyBuilder::new()
            .interfaces([1, 2])
            .circuit(1, 1, 2)
            .cable(iface(1), circuit_term(1))
            .cable(circuit_term(2), iface(2))
            .build()
    }

    /// One link of every endpoint pairing, plus an uncabled interface.
    ///
    /// - console-port:1 <-> console-server-port:1 through a single-position panel pair
    /// - power-port:1 <-> power-outlet:1
    /// - power-port:2 <-> power-feed:1
    /// - interface:1 <-> circuit 1 A side, Z side uncabled
    /// - interface:2 <-> interface:3
    /// - interface:4 uncabled
    pub fn mixed_site() -> MemoryTopology {
        TopologyBuilder::new()
            .endpoint(EndpointKind::ConsolePort, 1)
            .endpoint(EndpointKind::ConsoleServerPort, 1)
            .endpoint(EndpointKind::PowerPort, 1)
            .endpoint(EndpointKind::PowerPort, 2)
            .endpoint(EndpointKind::PowerOutlet, 1)
            .endpoint(EndpointKind::PowerFeed, 1)
            .interfaces(1..=4)
            .circuit(1, 1, 2)
            .panel(1, 1, 1)
            .panel(2, 1, 2)
            .cable(console_port(1), front(1))
            .cable(rear(1), rear(2))
            .cable(front(2), console_server_port(1))
            .cable(power_port(1), power_outlet(1))
            .cable(power_feed(1), power_port(2))
            .cable(iface(1), circuit_term(1))
            .cable(iface(2), iface(3))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::refs::*;
    use super::*;
    use cablepath_trace::Topology;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_panel_assigns_positions() {
        let topo = TopologyBuilder::new().panel(7, 3, 20).build();
        let positions: Vec<(u64, u16)> = topo
            .front_ports_of(7)
            .unwrap()
            .iter()
            .map(|fp| (fp.id, fp.rear_port_position))
            .collect();
        assert_eq!(positions, vec![(20, 1), (21, 2), (22, 3)]);
    }

    #[test]
    fn test_cable_ids_are_sequential() {
        let topo = scenarios::single_position_patch();
        let ids: Vec<u64> = topo.cables().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(topo.find_cable(rear(2)).unwrap().unwrap().id, 2);
    }

    #[test]
    fn test_scenarios_are_well_formed() {
        for topo in [
            scenarios::direct_link(),
            scenarios::single_position_patch(),
            scenarios::multi_position_trunk(),
            scenarios::split_at_rear_port(),
            scenarios::patch_panel_loop(),
            scenarios::folded_trunk_loop(),
            scenarios::mixed_status_path(),
            scenarios::circuit_dangling(),
            scenarios::circuit_end_to_end(),
            scenarios::mixed_site(),
        ] {
            assert!(topo.validate().is_empty());
        }
    }

    #[test]
    #[should_panic(expected = "fixture cable")]
    fn test_double_cabling_panics() {
        TopologyBuilder::new()
            .interfaces([1, 2, 3])
            .cable(iface(1), iface(2))
            .cable(iface(1), iface(3));
    }
}
