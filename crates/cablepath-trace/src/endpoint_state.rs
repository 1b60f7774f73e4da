//! Stored "connected endpoint" links and connection status.
//!
//! Each endpoint kind stores its link differently:
//!
//! | Kind | Link |
//! |------|------|
//! | console port, power feed, circuit termination | own `connected_endpoint` field |
//! | console server port | owned by the console port pointing at it |
//! | power outlet | owned by the power port's `connected_power_outlet` |
//! | power port | `connected_power_outlet` or `connected_power_feed` |
//! | interface | `connected_interface` or `connected_circuit_termination` |
//!
//! A link is stored once, on the owning side. Reading a peer-owned link is
//! a reverse lookup; writing one is a no-op because the owner's own
//! reconciliation writes it.

use std::collections::BTreeMap;

use cablepath_types::{EndpointKind, NodeKind, NodeRef};
use serde::{Deserialize, Serialize};

use crate::error::{TopologyResult, TraceResult};
use crate::topology::Topology;

/// A stored link field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkField {
    ConnectedEndpoint,
    ConnectedPowerOutlet,
    ConnectedPowerFeed,
    ConnectedInterface,
    ConnectedCircuitTermination,
}

/// Stored connection state of one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<LinkField, NodeRef>,
    /// `None` until the endpoint has been traced once.
    #[serde(default)]
    pub connection_status: Option<bool>,
}

impl EndpointRecord {
    pub fn link(&self, field: LinkField) -> Option<NodeRef> {
        self.links.get(&field).copied()
    }

    pub fn set_link(&mut self, field: LinkField, target: Option<NodeRef>) {
        match target {
            Some(target) => {
                self.links.insert(field, target);
            }
            None => {
                self.links.remove(&field);
            }
        }
    }
}

/// Storage for endpoint records.
pub trait EndpointStore {
    /// Returns the record of `endpoint`; an endpoint never written yet has
    /// a default record.
    fn endpoint_record(&self, endpoint: NodeRef) -> TopologyResult<EndpointRecord>;

    /// Replaces the record of `endpoint`.
    fn save_endpoint_record(
        &mut self,
        endpoint: NodeRef,
        record: EndpointRecord,
    ) -> TopologyResult<()>;

    /// Returns the first endpoint of kind `owner` (by id) whose `field`
    /// links to `target`.
    fn find_link_owner(
        &self,
        owner: EndpointKind,
        field: LinkField,
        target: NodeRef,
    ) -> TopologyResult<Option<NodeRef>>;
}

/// How an endpoint kind stores its link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOwnership {
    /// The endpoint owns a single link field.
    Direct(LinkField),
    /// The link lives on an endpoint of kind `owner`, in `field`.
    Reverse { owner: EndpointKind, field: LinkField },
    /// Two mutually exclusive fields, each for one peer kind; read in
    /// declaration order.
    Dual {
        primary: (LinkField, NodeKind),
        secondary: (LinkField, NodeKind),
    },
}

/// Returns how `kind` stores its link.
pub const fn ownership(kind: EndpointKind) -> LinkOwnership {
    match kind {
        EndpointKind::ConsolePort
        | EndpointKind::PowerFeed
        | EndpointKind::CircuitTermination => LinkOwnership::Direct(LinkField::ConnectedEndpoint),
        EndpointKind::ConsoleServerPort => LinkOwnership::Reverse {
            owner: EndpointKind::ConsolePort,
            field: LinkField::ConnectedEndpoint,
        },
        EndpointKind::PowerOutlet => LinkOwnership::Reverse {
            owner: EndpointKind::PowerPort,
            field: LinkField::ConnectedPowerOutlet,
        },
        EndpointKind::PowerPort => LinkOwnership::Dual {
            primary: (LinkField::ConnectedPowerOutlet, NodeKind::PowerOutlet),
            secondary: (LinkField::ConnectedPowerFeed, NodeKind::PowerFeed),
        },
        EndpointKind::Interface => LinkOwnership::Dual {
            primary: (LinkField::ConnectedInterface, NodeKind::Interface),
            secondary: (LinkField::ConnectedCircuitTermination, NodeKind::CircuitTermination),
        },
    }
}

/// Reads the stored far endpoint of `endpoint`.
///
/// Pass-through ports have no stored link and read as `None`. A stored
/// link to a node that no longer exists also reads as `None`.
pub fn get_connected_endpoint<S>(store: &S, endpoint: NodeRef) -> TraceResult<Option<NodeRef>>
where
    S: Topology + EndpointStore + ?Sized,
{
    let Some(kind) = endpoint.kind.as_endpoint() else {
        return Ok(None);
    };

    match ownership(kind) {
        LinkOwnership::Direct(field) => {
            let record = store.endpoint_record(endpoint)?;
            live_link(store, record.link(field))
        }
        LinkOwnership::Reverse { owner, field } => {
            Ok(store.find_link_owner(owner, field, endpoint)?)
        }
        LinkOwnership::Dual { primary, secondary } => {
            let record = store.endpoint_record(endpoint)?;
            if let Some(peer) = live_link(store, record.link(primary.0))? {
                return Ok(Some(peer));
            }
            live_link(store, record.link(secondary.0))
        }
    }
}

/// Writes `peer` as the far endpoint of a `kind` endpoint into `record`.
///
/// Returns false when nothing was written because the link is owned by the
/// peer.
pub fn set_connected_endpoint(
    record: &mut EndpointRecord,
    kind: EndpointKind,
    peer: Option<NodeRef>,
) -> bool {
    match ownership(kind) {
        LinkOwnership::Direct(field) => {
            record.set_link(field, peer);
            true
        }
        LinkOwnership::Reverse { .. } => false,
        LinkOwnership::Dual { primary, secondary } => {
            let peer_kind = peer.map(|p| p.kind);
            let (first, second) = if peer_kind == Some(primary.1) {
                (peer, None)
            } else if peer_kind == Some(secondary.1) {
                (None, peer)
            } else {
                (None, None)
            };
            record.set_link(primary.0, first);
            record.set_link(secondary.0, second);
            true
        }
    }
}

fn live_link<S>(store: &S, link: Option<NodeRef>) -> TraceResult<Option<NodeRef>>
where
    S: Topology + ?Sized,
{
    match link {
        Some(target) if store.contains(target)? => Ok(Some(target)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTopology;
    use cablepath_types::Node;
    use pretty_assertions::assert_eq;

    fn node(kind: NodeKind, id: u64) -> NodeRef {
        NodeRef::new(kind, id)
    }

    fn store_with(nodes: &[Node]) -> MemoryTopology {
        let mut topo = MemoryTopology::new();
        for n in nodes {
            topo.add_node(*n).unwrap();
        }
        topo
    }

    #[test]
    fn test_direct_field_roundtrip() {
        let mut topo = store_with(&[Node::ConsolePort { id: 1 }, Node::ConsoleServerPort { id: 2 }]);
        let cp = node(NodeKind::ConsolePort, 1);
        let csp = node(NodeKind::ConsoleServerPort, 2);

        let mut record = topo.endpoint_record(cp).unwrap();
        assert!(set_connected_endpoint(&mut record, EndpointKind::ConsolePort, Some(csp)));
        topo.save_endpoint_record(cp, record).unwrap();

        assert_eq!(get_connected_endpoint(&topo, cp).unwrap(), Some(csp));
    }

    #[test]
    fn test_reverse_link_read_from_owner() {
        let mut topo = store_with(&[Node::ConsolePort { id: 1 }, Node::ConsoleServerPort { id: 2 }]);
        let cp = node(NodeKind::ConsolePort, 1);
        let csp = node(NodeKind::ConsoleServerPort, 2);

        assert_eq!(get_connected_endpoint(&topo, csp).unwrap(), None);

        let mut record = EndpointRecord::default();
        record.set_link(LinkField::ConnectedEndpoint, Some(csp));
        topo.save_endpoint_record(cp, record).unwrap();

        assert_eq!(get_connected_endpoint(&topo, csp).unwrap(), Some(cp));
    }

    #[test]
    fn test_reverse_link_write_is_noop() {
        let mut record = EndpointRecord::default();
        let written = set_connected_endpoint(
            &mut record,
            EndpointKind::PowerOutlet,
            Some(node(NodeKind::PowerPort, 1)),
        );
        assert!(!written);
        assert!(record.links.is_empty());
    }

    #[test]
    fn test_dual_field_set_clears_other() {
        let mut record = EndpointRecord::default();
        set_connected_endpoint(&mut record, EndpointKind::PowerPort, Some(node(NodeKind::PowerOutlet, 3)));
        assert_eq!(record.link(LinkField::ConnectedPowerOutlet), Some(node(NodeKind::PowerOutlet, 3)));

        set_connected_endpoint(&mut record, EndpointKind::PowerPort, Some(node(NodeKind::PowerFeed, 4)));
        assert_eq!(record.link(LinkField::ConnectedPowerOutlet), None);
        assert_eq!(record.link(LinkField::ConnectedPowerFeed), Some(node(NodeKind::PowerFeed, 4)));

        // A peer of neither kind clears both fields.
        set_connected_endpoint(&mut record, EndpointKind::PowerPort, Some(node(NodeKind::Interface, 1)));
        assert!(record.links.is_empty());
    }

    #[test]
    fn test_dual_field_precedence() {
        let mut topo = store_with(&[
            Node::Interface { id: 1 },
            Node::Interface { id: 2 },
            Node::CircuitTermination(cablepath_types::CircuitTermination {
                id: 3,
                circuit: 1,
                term_side: cablepath_types::TermSide::A,
            }),
        ]);
        let iface = node(NodeKind::Interface, 1);

        // Both fields set directly in storage; the interface field wins.
        let mut record = EndpointRecord::default();
        record.set_link(LinkField::ConnectedInterface, Some(node(NodeKind::Interface, 2)));
        record.set_link(
            LinkField::ConnectedCircuitTermination,
            Some(node(NodeKind::CircuitTermination, 3)),
        );
        topo.save_endpoint_record(iface, record.clone()).unwrap();
        assert_eq!(
            get_connected_endpoint(&topo, iface).unwrap(),
            Some(node(NodeKind::Interface, 2))
        );

        // A link to a vanished node is skipped.
        record.set_link(LinkField::ConnectedInterface, Some(node(NodeKind::Interface, 99)));
        topo.save_endpoint_record(iface, record).unwrap();
        assert_eq!(
            get_connected_endpoint(&topo, iface).unwrap(),
            Some(node(NodeKind::CircuitTermination, 3))
        );
    }

    #[test]
    fn test_pass_through_has_no_link() {
        let topo = MemoryTopology::new();
        assert_eq!(
            get_connected_endpoint(&topo, node(NodeKind::FrontPort, 1)).unwrap(),
            None
        );
    }

    #[test]
    fn test_record_serde() {
        let mut record = EndpointRecord::default();
        record.set_link(LinkField::ConnectedPowerFeed, Some(node(NodeKind::PowerFeed, 2)));
        record.connection_status = Some(true);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["links"]["connected_power_feed"]["id"], 2);
        assert_eq!(json["connection_status"], true);
    }
}
