//! Node kinds and node records.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a cable termination point.
///
/// Declaration order is the order in which endpoints are swept during
/// reconciliation, followed by the two pass-through kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Console port on a device.
    ConsolePort,
    /// Console server port.
    ConsoleServerPort,
    /// Power inlet on a device.
    PowerPort,
    /// Power outlet on a PDU.
    PowerOutlet,
    /// Power feed from a power panel.
    PowerFeed,
    /// Network interface.
    Interface,
    /// One side of a provider circuit.
    CircuitTermination,
    /// Patch panel front port.
    FrontPort,
    /// Patch panel rear port.
    RearPort,
}

impl NodeKind {
    /// Returns the endpoint kind, or `None` for pass-through ports.
    pub const fn as_endpoint(&self) -> Option<EndpointKind> {
        match self {
            NodeKind::ConsolePort => Some(EndpointKind::ConsolePort),
            NodeKind::ConsoleServerPort => Some(EndpointKind::ConsoleServerPort),
            NodeKind::PowerPort => Some(EndpointKind::PowerPort),
            NodeKind::PowerOutlet => Some(EndpointKind::PowerOutlet),
            NodeKind::PowerFeed => Some(EndpointKind::PowerFeed),
            NodeKind::Interface => Some(EndpointKind::Interface),
            NodeKind::CircuitTermination => Some(EndpointKind::CircuitTermination),
            NodeKind::FrontPort | NodeKind::RearPort => None,
        }
    }

    /// Returns true if this kind can be the answer of a trace.
    pub const fn is_endpoint(&self) -> bool {
        self.as_endpoint().is_some()
    }

    /// Returns true for patch panel ports.
    pub const fn is_pass_through(&self) -> bool {
        matches!(self, NodeKind::FrontPort | NodeKind::RearPort)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            NodeKind::ConsolePort => "console-port",
            NodeKind::ConsoleServerPort => "console-server-port",
            NodeKind::PowerPort => "power-port",
            NodeKind::PowerOutlet => "power-outlet",
            NodeKind::PowerFeed => "power-feed",
            NodeKind::Interface => "interface",
            NodeKind::CircuitTermination => "circuit-termination",
            NodeKind::FrontPort => "front-port",
            NodeKind::RearPort => "rear-port",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "console-port" => Ok(NodeKind::ConsolePort),
            "console-server-port" => Ok(NodeKind::ConsoleServerPort),
            "power-port" => Ok(NodeKind::PowerPort),
            "power-outlet" => Ok(NodeKind::PowerOutlet),
            "power-feed" => Ok(NodeKind::PowerFeed),
            "interface" => Ok(NodeKind::Interface),
            "circuit-termination" => Ok(NodeKind::CircuitTermination),
            "front-port" => Ok(NodeKind::FrontPort),
            "rear-port" => Ok(NodeKind::RearPort),
            _ => Err(ParseError::InvalidNodeKind(s.to_string())),
        }
    }
}

/// The terminal endpoint kinds, i.e. every kind except pass-through ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointKind {
    ConsolePort,
    ConsoleServerPort,
    PowerPort,
    PowerOutlet,
    PowerFeed,
    Interface,
    CircuitTermination,
}

impl EndpointKind {
    /// All endpoint kinds in sweep order.
    pub const ALL: [EndpointKind; 7] = [
        EndpointKind::ConsolePort,
        EndpointKind::ConsoleServerPort,
        EndpointKind::PowerPort,
        EndpointKind::PowerOutlet,
        EndpointKind::PowerFeed,
        EndpointKind::Interface,
        EndpointKind::CircuitTermination,
    ];

    pub const fn node_kind(&self) -> NodeKind {
        match self {
            EndpointKind::ConsolePort => NodeKind::ConsolePort,
            EndpointKind::ConsoleServerPort => NodeKind::ConsoleServerPort,
            EndpointKind::PowerPort => NodeKind::PowerPort,
            EndpointKind::PowerOutlet => NodeKind::PowerOutlet,
            EndpointKind::PowerFeed => NodeKind::PowerFeed,
            EndpointKind::Interface => NodeKind::Interface,
            EndpointKind::CircuitTermination => NodeKind::CircuitTermination,
        }
    }
}

impl From<EndpointKind> for NodeKind {
    fn from(kind: EndpointKind) -> Self {
        kind.node_kind()
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.node_kind(), f)
    }
}

/// Stable identity of a node: its kind plus its id within that kind.
///
/// # Examples
///
/// ```
/// use cablepath_types::{NodeKind, NodeRef};
///
/// let node: NodeRef = "interface:7".parse().unwrap();
/// assert_eq!(node, NodeRef::new(NodeKind::Interface, 7));
/// assert_eq!(node.to_string(), "interface:7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub id: u64,
}

impl NodeRef {
    pub const fn new(kind: NodeKind, id: u64) -> Self {
        Self { kind, id }
    }

    pub const fn is_endpoint(&self) -> bool {
        self.kind.is_endpoint()
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for NodeRef {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseError::InvalidNodeRef(s.to_string()))?;
        let kind = kind.parse::<NodeKind>()?;
        let id = id
            .trim()
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidNodeRef(s.to_string()))?;
        Ok(NodeRef::new(kind, id))
    }
}

/// Side of a circuit a termination sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TermSide {
    A,
    Z,
}

impl TermSide {
    /// Returns the other side of the circuit.
    pub const fn opposite(&self) -> TermSide {
        match self {
            TermSide::A => TermSide::Z,
            TermSide::Z => TermSide::A,
        }
    }
}

impl fmt::Display for TermSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermSide::A => write!(f, "A"),
            TermSide::Z => write!(f, "Z"),
        }
    }
}

impl FromStr for TermSide {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(TermSide::A),
            "Z" | "z" => Ok(TermSide::Z),
            _ => Err(ParseError::InvalidTermSide(s.to_string())),
        }
    }
}

/// Patch panel front port, wired to one numbered position of a rear port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrontPort {
    pub id: u64,
    /// Id of the rear port this front port is wired to.
    pub rear_port: u64,
    /// 1-based position on the rear port.
    pub rear_port_position: u16,
}

impl FrontPort {
    pub const fn node_ref(&self) -> NodeRef {
        NodeRef::new(NodeKind::FrontPort, self.id)
    }

    pub const fn rear_port_ref(&self) -> NodeRef {
        NodeRef::new(NodeKind::RearPort, self.rear_port)
    }
}

/// Patch panel rear port with one or more numbered positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RearPort {
    pub id: u64,
    pub positions: u16,
}

impl RearPort {
    pub const fn node_ref(&self) -> NodeRef {
        NodeRef::new(NodeKind::RearPort, self.id)
    }

    /// Returns true if more than one front port can map to this rear port.
    pub const fn is_multi_position(&self) -> bool {
        self.positions > 1
    }

    /// Returns true if `position` is in `1..=positions`.
    pub const fn has_position(&self, position: u16) -> bool {
        position >= 1 && position <= self.positions
    }
}

/// One side of a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CircuitTermination {
    pub id: u64,
    pub circuit: u64,
    pub term_side: TermSide,
}

impl CircuitTermination {
    pub const fn node_ref(&self) -> NodeRef {
        NodeRef::new(NodeKind::CircuitTermination, self.id)
    }
}

/// A node record.
///
/// Simple endpoints carry only their id; their connection fields are owned
/// by the endpoint state store, not by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Node {
    ConsolePort { id: u64 },
    ConsoleServerPort { id: u64 },
    PowerPort { id: u64 },
    PowerOutlet { id: u64 },
    PowerFeed { id: u64 },
    Interface { id: u64 },
    CircuitTermination(CircuitTermination),
    FrontPort(FrontPort),
    RearPort(RearPort),
}

impl Node {
    /// Creates a simple endpoint node of the given kind.
    pub const fn endpoint(kind: EndpointKind, id: u64) -> Option<Node> {
        match kind {
            EndpointKind::ConsolePort => Some(Node::ConsolePort { id }),
            EndpointKind::ConsoleServerPort => Some(Node::ConsoleServerPort { id }),
            EndpointKind::PowerPort => Some(Node::PowerPort { id }),
            EndpointKind::PowerOutlet => Some(Node::PowerOutlet { id }),
            EndpointKind::PowerFeed => Some(Node::PowerFeed { id }),
            EndpointKind::Interface => Some(Node::Interface { id }),
            // Circuit terminations need a circuit and side.
            EndpointKind::CircuitTermination => None,
        }
    }

    pub const fn kind(&self) -> NodeKind {
        match self {
            Node::ConsolePort { .. } => NodeKind::ConsolePort,
            Node::ConsoleServerPort { .. } => NodeKind::ConsoleServerPort,
            Node::PowerPort { .. } => NodeKind::PowerPort,
            Node::PowerOutlet { .. } => NodeKind::PowerOutlet,
            Node::PowerFeed { .. } => NodeKind::PowerFeed,
            Node::Interface { .. } => NodeKind::Interface,
            Node::CircuitTermination(_) => NodeKind::CircuitTermination,
            Node::FrontPort(_) => NodeKind::FrontPort,
            Node::RearPort(_) => NodeKind::RearPort,
        }
    }

    pub const fn id(&self) -> u64 {
        match self {
            Node::ConsolePort { id }
            | Node::ConsoleServerPort { id }
            | Node::PowerPort { id }
            | Node::PowerOutlet { id }
            | Node::PowerFeed { id }
            | Node::Interface { id } => *id,
            Node::CircuitTermination(ct) => ct.id,
            Node::FrontPort(fp) => fp.id,
            Node::RearPort(rp) => rp.id,
        }
    }

    pub const fn node_ref(&self) -> NodeRef {
        NodeRef::new(self.kind(), self.id())
    }

    pub const fn is_endpoint(&self) -> bool {
        self.kind().is_endpoint()
    }
}

impl From<FrontPort> for Node {
    fn from(port: FrontPort) -> Self {
        Node::FrontPort(port)
    }
}

impl From<RearPort> for Node {
    fn from(port: RearPort) -> Self {
        Node::RearPort(port)
    }
}

impl From<CircuitTermination> for Node {
    fn from(termination: CircuitTermination) -> Self {
        Node::CircuitTermination(termination)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.node_ref(), f)
    }
}
