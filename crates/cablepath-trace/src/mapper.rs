//! Mapping of pass-through ports to the port on the other side of a panel.
//!
//! A front port always leads to its rear port. A rear port with several
//! positions fans out to several front ports, so the walk has to remember
//! which front port it entered through: entering front→rear pushes the
//! front port onto the [`PositionStack`], leaving rear→front pops it.
//! Single-position rear ports never touch the stack.

use cablepath_types::{FrontPort, Node, RearPort};
use tracing::debug;

use crate::error::{TraceError, TraceResult};
use crate::topology::Topology;

/// LIFO of front ports entered on the way into multi-position rear ports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionStack {
    entries: Vec<FrontPort>,
}

impl PositionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, port: FrontPort) {
        self.entries.push(port);
    }

    pub fn pop(&mut self) -> Option<FrontPort> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates from the bottom of the stack to the top.
    pub fn iter(&self) -> impl Iterator<Item = &FrontPort> {
        self.entries.iter()
    }
}

/// A multi-position rear port reached without a position to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub rear_port: RearPort,
    /// Every front port wired to the rear port.
    pub candidates: Vec<FrontPort>,
}

/// Result of mapping a node across a pass-through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peer {
    /// The walk continues from this node.
    Node(Node),
    /// There is nothing on the other side; the walk ends here.
    None,
    /// The walk cannot continue without knowing where it came from.
    Split(Split),
}

/// Returns the node on the other side of `node`, updating `stack`.
///
/// Fails only with [`TraceError::InvalidPosition`] when a front port on the
/// stack claims a position its rear port does not have, or when the
/// topology accessor itself fails.
pub fn peer_of<T>(topology: &T, node: &Node, stack: &mut PositionStack) -> TraceResult<Peer>
where
    T: Topology + ?Sized,
{
    match node {
        Node::FrontPort(front) => {
            // Re-read the rear port so a stale copy never decides the fan-out.
            let rear = topology.rear_port(front.rear_port)?;
            if rear.is_multi_position() {
                stack.push(*front);
            }
            Ok(Peer::Node(Node::RearPort(rear)))
        }

        Node::RearPort(rear) => {
            let position = if rear.is_multi_position() {
                let Some(entered) = stack.pop() else {
                    let candidates = topology.front_ports_of(rear.id)?;
                    debug!(
                        rear_port = %rear.node_ref(),
                        candidates = candidates.len(),
                        "Trace splits at rear port"
                    );
                    return Ok(Peer::Split(Split {
                        rear_port: *rear,
                        candidates,
                    }));
                };
                if !rear.has_position(entered.rear_port_position) {
                    return Err(TraceError::InvalidPosition {
                        rear_port: rear.node_ref(),
                        positions: rear.positions,
                        position: entered.rear_port_position,
                    });
                }
                entered.rear_port_position
            } else {
                1
            };

            Ok(match topology.front_port_at(rear.id, position)? {
                Some(front) => Peer::Node(Node::FrontPort(front)),
                None => Peer::None,
            })
        }

        Node::CircuitTermination(termination) => {
            let side = termination.term_side.opposite();
            Ok(
                match topology.circuit_termination(termination.circuit, side)? {
                    Some(peer) => Peer::Node(Node::CircuitTermination(peer)),
                    None => Peer::None,
                },
            )
        }

        Node::ConsolePort { .. }
        | Node::ConsoleServerPort { .. }
        | Node::PowerPort { .. }
        | Node::PowerOutlet { .. }
        | Node::PowerFeed { .. }
        | Node::Interface { .. } => Ok(Peer::None),
    }
}
