//! Cable-by-cable walk from a starting node.

use std::fmt;

use cablepath_types::{Cable, Node, NodeRef};
use tracing::{debug, warn};

use crate::error::{TopologyError, TraceResult};
use crate::mapper::{peer_of, Peer, PositionStack, Split};
use crate::topology::Topology;

/// One hop of a path: the node the walk stood on, the cable it followed and
/// the node found at the cable's other end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub near: Node,
    pub cable: Option<Cable>,
    pub far: Option<Node>,
}

impl Segment {
    /// Returns true if this hop crossed a cable with `connected` status.
    pub fn is_connected(&self) -> bool {
        self.cable
            .as_ref()
            .is_some_and(|cable| cable.status.is_connected())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> ", self.near)?;
        match &self.cable {
            Some(cable) => write!(f, "cable {} [{}] -> ", cable.id, cable.status)?,
            None => write!(f, "(no cable) -> ")?,
        }
        match &self.far {
            Some(far) => write!(f, "{}", far),
            None => write!(f, "(none)"),
        }
    }
}

/// Outcome of tracing from a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// The node the trace started from.
    pub origin: Node,
    pub path: Vec<Segment>,
    /// Set when the walk stopped at a multi-position rear port it could not
    /// map.
    pub split: Option<Split>,
    /// Front ports entered but never left again.
    pub position_stack: PositionStack,
    /// Set when the walk stopped because it was about to re-cross a cable.
    pub looped: bool,
}

impl Trace {
    pub fn last(&self) -> Option<&Segment> {
        self.path.last()
    }

    /// Returns the ids of the cables crossed, in order.
    pub fn cable_ids(&self) -> Vec<u64> {
        self.path
            .iter()
            .filter_map(|segment| segment.cable.as_ref().map(|cable| cable.id))
            .collect()
    }

    fn crossed(&self, cable: &Cable) -> bool {
        self.path
            .iter()
            .any(|segment| segment.cable.as_ref().is_some_and(|c| c.id == cable.id))
    }
}

/// Walks from `start` until it runs out of cable, reaches a node with no
/// peer, splits, or loops.
///
/// Every iteration either stops or appends a segment with a cable not yet
/// in the path, so the walk is bounded by the number of cables.
pub fn trace<T>(topology: &T, start: NodeRef) -> TraceResult<Trace>
where
    T: Topology + ?Sized,
{
    let origin = topology.node(start)?;
    let mut trace = Trace {
        origin,
        path: Vec::new(),
        split: None,
        position_stack: PositionStack::new(),
        looped: false,
    };
    let mut current = origin;

    loop {
        let Some(cable) = topology.find_cable(current.node_ref())? else {
            trace.path.push(Segment {
                near: current,
                cable: None,
                far: None,
            });
            break;
        };

        if trace.crossed(&cable) {
            debug!(origin = %start, cable = cable.id, "Trace loops back onto a crossed cable");
            trace.looped = true;
            break;
        }

        let far = match cable.far_end(current.node_ref()) {
            Some(far_ref) => match topology.node(far_ref) {
                Ok(node) => Some(node),
                Err(TopologyError::NodeNotFound(missing)) => {
                    warn!(cable = cable.id, node = %missing, "Cable terminates at a missing node");
                    None
                }
                Err(e) => return Err(e.into()),
            },
            None => {
                warn!(cable = cable.id, node = %current, "Cable lookup returned a cable not attached to the node");
                None
            }
        };

        debug!(origin = %start, near = %current, cable = cable.id, far = ?far.map(|n| n.node_ref()), "Segment");
        trace.path.push(Segment {
            near: current,
            cable: Some(cable),
            far,
        });

        let Some(far) = far else {
            break;
        };

        match peer_of(topology, &far, &mut trace.position_stack)? {
            Peer::Node(next) => current = next,
            Peer::None => break,
            Peer::Split(split) => {
                trace.split = Some(split);
                break;
            }
        }
    }

    Ok(trace)
}
