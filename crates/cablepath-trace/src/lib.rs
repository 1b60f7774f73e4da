//! Cable path tracing for physical topologies.
//!
//! This crate walks cables from an endpoint, through patch panel front and
//! rear ports and across circuits, to find the endpoint at the far end:
//!
//! - [`Topology`]: read access to nodes, cables and pass-through wiring
//! - [`peer_of`]: maps a pass-through port to the other side of its panel
//! - [`trace`]: walks cable by cable, producing a [`Trace`]
//! - [`resolve`]: reduces a trace to a [`Connection`]
//! - [`get_connected_endpoint`] / [`set_connected_endpoint`]: stored links
//! - [`Reconciler`]: sweeps every endpoint and writes back changes
//! - [`MemoryTopology`]: in-memory store implementing both accessors
//!
//! # Architecture
//!
//! 1. The reconciler lists every endpoint of every kind
//! 2. Each endpoint is traced; multi-position rear ports consult a position stack
//! 3. The trace is resolved to a far endpoint and a connected/not-connected status
//! 4. The stored link and status are rewritten only if they differ
//!
//! # Example
//!
//! ```
//! use cablepath_trace::{MemoryTopology, Reconciler, get_connected_endpoint};
//! use cablepath_types::{Cable, Node, NodeKind, NodeRef};
//!
//! let a = NodeRef::new(NodeKind::Interface, 1);
//! let b = NodeRef::new(NodeKind::Interface, 2);
//!
//! let mut topo = MemoryTopology::new();
//! topo.add_node(Node::Interface { id: 1 }).unwrap();
//! topo.add_node(Node::Interface { id: 2 }).unwrap();
//! topo.add_cable(Cable::new(1, a, b)).unwrap();
//!
//! let report = Reconciler::default().run(&mut topo).unwrap();
//! assert_eq!(report.updated(), 2);
//! assert_eq!(get_connected_endpoint(&topo, a).unwrap(), Some(b));
//! ```

mod endpoint_state;
mod error;
mod mapper;
mod reconcile;
mod resolver;
mod store;
mod topology;
mod tracer;

pub use endpoint_state::{
    get_connected_endpoint, ownership, set_connected_endpoint, EndpointRecord, EndpointStore,
    LinkField, LinkOwnership,
};
pub use error::{TopologyError, TopologyResult, TraceError, TraceResult};
pub use mapper::{peer_of, Peer, PositionStack, Split};
pub use reconcile::{
    derive_connection, EndpointChange, EndpointFailure, NoProgress, ProgressSink,
    ReconcileOptions, ReconcileReport, Reconciler,
};
pub use resolver::{resolve, Connection};
pub use store::{EndpointStateEntry, MemoryTopology, TopologySnapshot};
pub use topology::Topology;
pub use tracer::{trace, Segment, Trace};
